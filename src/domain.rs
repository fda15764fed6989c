//! Canonical shapes produced by the normalizer and consumed by the filter and
//! map views.

use crate::constants;
use crate::error::{PipelineError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One race listing. Every field is populated; missing source data is
/// represented by the sentinel defaults in `constants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    pub start_date: String,
    pub venue: Venue,
    pub latitude: f64,
    pub longitude: f64,
    pub registration: Registration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of the registration URL policy. Every variant carries the
/// resolved absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Registration {
    /// Link went through the `/book` branch
    Bookable(String),
    /// Link was missing, or already lives on the registration subdomain
    Informational(String),
    /// Any other link; the action is shown disabled
    Unavailable(String),
}

/// State of the action button rendered next to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Reserve,
    Info,
    NoInfo,
}

impl Registration {
    pub fn url(&self) -> &str {
        match self {
            Registration::Bookable(url)
            | Registration::Informational(url)
            | Registration::Unavailable(url) => url,
        }
    }

    pub fn is_bookable(&self) -> bool {
        matches!(self, Registration::Bookable(_))
    }

    pub fn button_state(&self) -> ButtonState {
        match self {
            Registration::Bookable(_) => ButtonState::Reserve,
            Registration::Informational(_) => ButtonState::Info,
            Registration::Unavailable(_) => ButtonState::NoInfo,
        }
    }

    /// Validate the URL at the moment the user follows it. A failure here is
    /// shown as a dismissable notice and never affects the listing.
    pub fn checked_url(&self) -> Result<reqwest::Url> {
        let raw = self.url();
        let invalid = |reason: String| PipelineError::InvalidLink {
            url: raw.to_string(),
            reason,
        };
        let url = reqwest::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        Ok(url)
    }
}

impl ButtonState {
    pub fn label(self) -> &'static str {
        match self {
            ButtonState::Reserve => constants::LABEL_RESERVE,
            ButtonState::Info => constants::LABEL_INFO,
            ButtonState::NoInfo => constants::LABEL_NO_INFO,
        }
    }

    pub fn is_enabled(self) -> bool {
        !matches!(self, ButtonState::NoInfo)
    }
}

impl Coordinates {
    /// Exact-equality grouping key. `-0.0` and `0.0` map to the same key.
    pub fn key(&self) -> (u64, u64) {
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0.0f64.to_bits()
            } else {
                v.to_bits()
            }
        }
        (bits(self.latitude), bits(self.longitude))
    }

    pub fn is_sentinel(&self) -> bool {
        self.latitude == constants::DEFAULT_COORDINATE
            && self.longitude == constants::DEFAULT_COORDINATE
    }
}

impl Event {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn registration_url(&self) -> &str {
        self.registration.url()
    }

    pub fn is_reservable(&self) -> bool {
        self.registration.is_bookable()
    }

    pub fn button_state(&self) -> ButtonState {
        self.registration.button_state()
    }

    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_start_date(&self.start_date)
    }

    /// Short French date (`dd/mm/YYYY`), or the raw string when it does not parse.
    pub fn display_date(&self) -> String {
        match self.starts_at() {
            Some(dt) => dt.format("%d/%m/%Y").to_string(),
            None => self.start_date.clone(),
        }
    }

    /// Stable content hash over every field, used to spot the same listing
    /// served on more than one page.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.start_date.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.venue.city.as_bytes());
        hasher.update([0u8]);
        let (lat, lon) = self.coordinates().key();
        hasher.update(lat.to_be_bytes());
        hasher.update(lon.to_be_bytes());
        hasher.update(self.registration.url().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Parse an upstream start date. Accepts RFC 3339 timestamps, naive
/// date-times (taken as UTC) and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_start_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_START_DATE;

    fn event(start_date: &str, registration: Registration) -> Event {
        Event {
            name: "Semi de Liège".to_string(),
            start_date: start_date.to_string(),
            venue: Venue {
                city: "Liège".to_string(),
            },
            latitude: 50.63,
            longitude: 5.57,
            registration,
        }
    }

    #[test]
    fn parses_supported_date_shapes() {
        let day = parse_start_date("2024-05-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-05-01T00:00:00+00:00");

        let zulu = parse_start_date("2024-05-01T08:30:00.000Z").unwrap();
        assert_eq!(zulu.timestamp(), day.timestamp() + 8 * 3600 + 30 * 60);

        let offset = parse_start_date("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(offset.timestamp(), day.timestamp() + 8 * 3600);

        assert!(parse_start_date("2024-05-01T09:00:00").is_some());
    }

    #[test]
    fn rejects_sentinel_and_garbage() {
        assert!(parse_start_date(DEFAULT_START_DATE).is_none());
        assert!(parse_start_date("").is_none());
        assert!(parse_start_date("mai 2024").is_none());
        assert!(parse_start_date("2024-13-45").is_none());
    }

    #[test]
    fn display_date_is_french_short_form() {
        let e = event("2024-05-01T09:00:00Z", Registration::Bookable("x".into()));
        assert_eq!(e.display_date(), "01/05/2024");

        let undated = event(DEFAULT_START_DATE, Registration::Bookable("x".into()));
        assert_eq!(undated.display_date(), DEFAULT_START_DATE);
        assert!(undated.starts_at().is_none());
    }

    #[test]
    fn button_state_follows_registration_kind() {
        assert_eq!(
            Registration::Bookable("u".into()).button_state(),
            ButtonState::Reserve
        );
        assert_eq!(
            Registration::Informational("u".into()).button_state(),
            ButtonState::Info
        );
        let no_info = Registration::Unavailable("u".into()).button_state();
        assert_eq!(no_info, ButtonState::NoInfo);
        assert!(!no_info.is_enabled());
        assert_eq!(no_info.label(), "Pas d'infos");
        assert_eq!(ButtonState::Reserve.label(), "Réserver");
    }

    #[test]
    fn checked_url_rejects_malformed_links() {
        let ok = Registration::Bookable("https://www.finishers.com/book/123".into());
        assert_eq!(ok.checked_url().unwrap().path(), "/book/123");

        let glued = Registration::Unavailable("https://www.finishers.comrace/42".into());
        assert!(glued.checked_url().is_ok());

        let bad = Registration::Unavailable("not a url".into());
        assert!(matches!(
            bad.checked_url(),
            Err(PipelineError::InvalidLink { .. })
        ));

        let mailto = Registration::Unavailable("mailto:info@example.org".into());
        assert!(mailto.checked_url().is_err());
    }

    #[test]
    fn negative_zero_shares_the_origin_key() {
        let a = Coordinates {
            latitude: 0.0,
            longitude: -0.0,
        };
        let b = Coordinates {
            latitude: -0.0,
            longitude: 0.0,
        };
        assert_eq!(a.key(), b.key());
        assert!(a.is_sentinel());
    }

    #[test]
    fn fingerprint_depends_on_content_only() {
        let a = event("2024-05-01", Registration::Bookable("u".into()));
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = event("2024-05-02", Registration::Bookable("u".into()));
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn serializes_with_upstream_style_keys() {
        let e = event("2024-05-01", Registration::Informational("https://a/default".into()));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["startDate"], "2024-05-01");
        assert_eq!(json["venue"]["city"], "Liège");
        assert_eq!(json["registration"]["kind"], "informational");
        assert_eq!(json["registration"]["url"], "https://a/default");
    }
}
