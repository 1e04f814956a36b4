pub mod cancel;
pub mod error;
pub mod images;
pub mod orchestrator;
pub mod output;
pub mod overpass;
pub mod places_api;
pub mod rate_limit;
pub mod source;
pub mod types;

pub use cancel::CancelFlag;
pub use error::{OutputError, ScrapeError};
pub use images::ImageResolver;
pub use orchestrator::{RunOutcome, RunReport, ScrapeOrchestrator};
pub use output::{OutputBundle, OutputMetadata};
pub use overpass::{OverpassAdapter, RetryPolicy};
pub use places_api::PlacesApiAdapter;
pub use rate_limit::SourceRateLimiter;
pub use source::SourceAdapter;
pub use types::{DataSource, OpeningHours, PlaceRecord, ScrapeJob, UsageStats};
