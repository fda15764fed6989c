/// Upstream endpoint and origin constants. These are the built-in defaults;
/// `Config` can override all of them.

// Aggregator API serving paginated raw documents
pub const DOCUMENTS_ENDPOINT: &str =
    "https://finishersrewrited-production.up.railway.app/api/documents";

// Public site origin used to resolve relative or missing registration links
pub const BASE_URL: &str = "https://www.finishers.com";

// Dedicated registration subdomain; links already on it are kept as-is
pub const REGISTRATION_ORIGIN: &str = "https://register.finishers.com";

pub const FINISHERS_SOURCE: &str = "finishers";

/// Pages fetched on every run. Both must succeed.
pub const FIXED_PAGES: [u32; 2] = [1, 2];

// Sentinel values substituted for missing document fields
pub const DEFAULT_NAME: &str = "Pas de titre";
pub const DEFAULT_START_DATE: &str = "Pas de date";
pub const DEFAULT_CITY: &str = "Pas de ville";
pub const DEFAULT_COORDINATE: f64 = 0.0;

// URL policy markers
pub const BOOKING_MARKER: &str = "/book";
pub const DEFAULT_LINK_PATH: &str = "/default";

// Button labels shown next to each listed event
pub const LABEL_RESERVE: &str = "Réserver";
pub const LABEL_INFO: &str = "Infos";
pub const LABEL_NO_INFO: &str = "Pas d'infos";

// Initial map region (Brussels)
pub const MAP_CENTER_LATITUDE: f64 = 50.8503;
pub const MAP_CENTER_LONGITUDE: f64 = 4.3517;
pub const MAP_LATITUDE_DELTA: f64 = 2.5;
pub const MAP_LONGITUDE_DELTA: f64 = 2.5;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_LOG_FILTER: &str = "runit_events=info";
