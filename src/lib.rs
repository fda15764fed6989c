//! Road-race event ingestion for RunIt: fetch the aggregator's documents,
//! normalize them into events, then derive the filtered listing and the
//! map markers.

pub mod apis;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod filter;
pub mod geo;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use domain::{ButtonState, Coordinates, Event, Registration, Venue};
pub use error::{PipelineError, Result};
pub use filter::FilterState;
pub use geo::{EventGroup, MapViewport};
pub use normalize::{normalize, EventNormalizer, UrlPolicy};
pub use pipeline::{Catalog, Pipeline};
