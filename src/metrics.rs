//! Pipeline metrics.
//!
//! Calls are cheap no-ops until a recorder is installed, so library users and
//! tests never need to initialize anything.

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// Install the Prometheus exporter on `addr`. Idempotent; a malformed address
/// is logged and metrics stay disabled.
pub fn init_metrics(addr: &str) {
    INIT.call_once(|| {
        let addr: SocketAddr = match addr.parse() {
            Ok(a) => a,
            Err(e) => {
                warn!("Invalid metrics addr '{}': {}; metrics disabled", addr, e);
                return;
            }
        };
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
        match builder.install() {
            Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
            Err(e) => warn!("Prometheus exporter install failed: {}", e),
        }
    });
}

/// Metrics for one pipeline run, from page fetch to aggregate
pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_run() {
        ::metrics::counter!("runit_pipeline_runs_total").increment(1);
    }

    pub fn record_page_fetched(page: u32, documents: usize, duration_secs: f64) {
        ::metrics::histogram!("runit_page_fetch_duration_seconds", "page" => page.to_string())
            .record(duration_secs);
        ::metrics::counter!("runit_documents_fetched_total").increment(documents as u64);
    }

    pub fn record_page_error(page: u32) {
        ::metrics::counter!("runit_page_fetch_errors_total", "page" => page.to_string())
            .increment(1);
    }

    pub fn record_normalized(field_defaults: &[&'static str]) {
        ::metrics::counter!("runit_events_normalized_total").increment(1);
        for field in field_defaults {
            ::metrics::counter!("runit_fields_defaulted_total", "field" => *field).increment(1);
        }
    }

    pub fn record_duplicates(count: usize) {
        ::metrics::counter!("runit_duplicate_events_total").increment(count as u64);
    }

    pub fn record_run_duration(duration_secs: f64) {
        ::metrics::histogram!("runit_pipeline_duration_seconds").record(duration_secs);
    }
}
