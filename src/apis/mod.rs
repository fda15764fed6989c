pub mod finishers;
pub mod static_source;

pub use finishers::FinishersSource;
pub use static_source::StaticSource;
