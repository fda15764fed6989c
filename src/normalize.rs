use crate::constants::{
    BOOKING_MARKER, DEFAULT_CITY, DEFAULT_COORDINATE, DEFAULT_LINK_PATH, DEFAULT_NAME,
    DEFAULT_START_DATE,
};
use crate::domain::{Event, Registration, Venue};
use crate::metrics::PipelineMetrics;
use crate::types::RawDocument;
use serde_json::Value;
use tracing::trace;

/// Origins used to resolve registration links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPolicy {
    pub base_url: String,
    pub registration_origin: String,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new(crate::constants::BASE_URL, crate::constants::REGISTRATION_ORIGIN)
    }
}

impl UrlPolicy {
    pub fn new(base_url: &str, registration_origin: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            registration_origin: registration_origin.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a raw registration link. First matching rule wins:
    ///
    /// 1. contains `/book`: base URL + link, bookable
    /// 2. absent or empty: base URL + `/default`, informational
    /// 3. already on the registration origin: unchanged, informational
    /// 4. anything else: prefixed with the base URL unless it already starts
    ///    with it, unavailable
    ///
    /// Prefixing is plain concatenation.
    pub fn resolve(&self, link: Option<&str>) -> Registration {
        match link {
            Some(l) if l.contains(BOOKING_MARKER) => {
                Registration::Bookable(format!("{}{}", self.base_url, l))
            }
            None | Some("") => {
                Registration::Informational(format!("{}{}", self.base_url, DEFAULT_LINK_PATH))
            }
            Some(l) if l.starts_with(&self.registration_origin) => {
                Registration::Informational(l.to_string())
            }
            Some(l) if l.starts_with(&self.base_url) => Registration::Unavailable(l.to_string()),
            Some(l) => Registration::Unavailable(format!("{}{}", self.base_url, l)),
        }
    }
}

/// Maps raw aggregator documents to canonical events. Never fails: anything
/// missing or mistyped is replaced by its sentinel default.
#[derive(Debug, Clone, Default)]
pub struct EventNormalizer {
    policy: UrlPolicy,
}

impl EventNormalizer {
    pub fn new(policy: UrlPolicy) -> Self {
        Self { policy }
    }

    pub fn normalize(&self, raw: &RawDocument) -> Event {
        let mut defaulted: Vec<&'static str> = Vec::new();

        let mut text = |field: &'static str, default: &str| -> String {
            match non_empty_str(raw.get(field)) {
                Some(s) => s.to_string(),
                None => {
                    defaulted.push(field);
                    default.to_string()
                }
            }
        };
        let name = text("eventName", DEFAULT_NAME);
        let start_date = text("editionStartDate", DEFAULT_START_DATE);
        let city = text("city", DEFAULT_CITY);

        let (latitude, longitude) = coordinates(raw.get("coordinates"));
        if raw.get("coordinates").and_then(Value::as_array).is_none() {
            defaulted.push("coordinates");
        }

        let link = non_empty_str(raw.get("Links").and_then(|links| links.get("registration")));
        if link.is_none() {
            defaulted.push("Links.registration");
        }
        let registration = self.policy.resolve(link);

        trace!(name = %name, defaulted = ?defaulted, "Normalized document");
        PipelineMetrics::record_normalized(&defaulted);

        Event {
            name,
            start_date,
            venue: Venue { city },
            latitude,
            longitude,
            registration,
        }
    }
}

/// Normalize with the built-in origins.
pub fn normalize(raw: &RawDocument) -> Event {
    EventNormalizer::default().normalize(raw)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// First element is the latitude, second the longitude, as stored upstream.
/// Each defaults to 0 independently when missing or not a number.
fn coordinates(value: Option<&Value>) -> (f64, f64) {
    let pair = value.and_then(Value::as_array);
    let at = |i: usize| {
        pair.and_then(|p| p.get(i))
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_COORDINATE)
    };
    (at(0), at(1))
}
