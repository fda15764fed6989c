use crate::constants::FIXED_PAGES;
use crate::domain::Event;
use crate::error::Result;
use crate::filter::{self, FilterState};
use crate::geo::{self, EventGroup};
use crate::metrics::PipelineMetrics;
use crate::normalize::{EventNormalizer, UrlPolicy};
use crate::types::{DocumentSource, RawDocument};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Immutable result of one pipeline run. Views are derived from it on demand.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub run_id: Uuid,
    pub events: Vec<Event>,
    pub regions: Vec<String>,
}

/// Events sharing one fingerprint
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub fingerprint: String,
    pub name: String,
    pub start_date: String,
    pub city: String,
    /// Positions in the aggregate
    pub positions: Vec<usize>,
}

impl Catalog {
    pub fn from_events(run_id: Uuid, events: Vec<Event>) -> Self {
        let regions = regions(&events);
        Self {
            run_id,
            events,
            regions,
        }
    }

    pub fn view(&self, state: &FilterState) -> Vec<&Event> {
        filter::filter(&self.events, state)
    }

    pub fn groups(&self) -> Vec<EventGroup> {
        geo::group(&self.events)
    }

    pub fn duplicates(&self) -> Vec<DuplicateGroup> {
        find_duplicates(&self.events)
    }

    /// A copy keeping only the first occurrence of each fingerprint.
    /// Opt-in; the aggregate itself keeps duplicates.
    pub fn deduplicated(&self) -> Catalog {
        let mut seen = HashSet::new();
        let events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| seen.insert(e.fingerprint()))
            .cloned()
            .collect();
        Catalog {
            run_id: self.run_id,
            regions: regions(&events),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Fetch both fixed pages concurrently, then normalize and aggregate.
    /// If either page fails the run yields nothing.
    #[instrument(skip(source, policy), fields(source = %source.source_name(), run_id = tracing::field::Empty))]
    pub async fn run(source: &dyn DocumentSource, policy: &UrlPolicy) -> Result<Catalog> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        PipelineMetrics::record_run();
        let t_run = Instant::now();

        let [first, second] = FIXED_PAGES;
        let (page1, page2) =
            tokio::try_join!(fetch_timed(source, first), fetch_timed(source, second))
                .inspect_err(|e| error!("Pipeline run aborted: {}", e))?;

        let events = aggregate(&[page1, page2], policy);
        let catalog = Catalog::from_events(run_id, events);

        let duplicates = catalog.duplicates();
        if !duplicates.is_empty() {
            let extra: usize = duplicates.iter().map(|d| d.positions.len() - 1).sum();
            PipelineMetrics::record_duplicates(extra);
            for dup in &duplicates {
                warn!(
                    name = %dup.name,
                    start_date = %dup.start_date,
                    positions = ?dup.positions,
                    "Event listed more than once"
                );
            }
        }

        PipelineMetrics::record_run_duration(t_run.elapsed().as_secs_f64());
        info!(
            "Aggregated {} events across {} regions",
            catalog.events.len(),
            catalog.regions.len()
        );
        Ok(catalog)
    }
}

async fn fetch_timed(source: &dyn DocumentSource, page: u32) -> Result<Vec<RawDocument>> {
    let t0 = Instant::now();
    match source.fetch_page(page).await {
        Ok(documents) => {
            PipelineMetrics::record_page_fetched(page, documents.len(), t0.elapsed().as_secs_f64());
            Ok(documents)
        }
        Err(e) => {
            PipelineMetrics::record_page_error(page);
            Err(e)
        }
    }
}

/// Normalize every page in order, concatenate, and sort by start date.
///
/// The sort is stable. Events whose start date does not parse are placed after
/// every dated event, in input order.
pub fn aggregate(pages: &[Vec<RawDocument>], policy: &UrlPolicy) -> Vec<Event> {
    let normalizer = EventNormalizer::new(policy.clone());
    let mut keyed: Vec<(Option<i64>, Event)> = pages
        .iter()
        .flatten()
        .map(|raw| {
            let event = normalizer.normalize(raw);
            (event.starts_at().map(|dt| dt.timestamp_millis()), event)
        })
        .collect();
    debug!("Normalized {} documents", keyed.len());

    keyed.sort_by_key(|(ts, _)| (ts.is_none(), *ts));
    keyed.into_iter().map(|(_, event)| event).collect()
}

/// Distinct cities in first-occurrence order
pub fn regions(events: &[Event]) -> Vec<String> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| seen.insert(e.venue.city.as_str()))
        .map(|e| e.venue.city.clone())
        .collect()
}

/// Group events listed more than once, in order of first occurrence
pub fn find_duplicates(events: &[Event]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for (pos, event) in events.iter().enumerate() {
        let fp = event.fingerprint();
        match index.get(&fp) {
            Some(&i) => groups[i].positions.push(pos),
            None => {
                index.insert(fp.clone(), groups.len());
                groups.push(DuplicateGroup {
                    fingerprint: fp,
                    name: event.name.clone(),
                    start_date: event.start_date.clone(),
                    city: event.venue.city.clone(),
                    positions: vec![pos],
                });
            }
        }
    }
    groups.retain(|g| g.positions.len() > 1);
    groups
}
