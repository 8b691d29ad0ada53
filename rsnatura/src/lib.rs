pub mod collect;
pub mod commons;
pub mod config;
pub mod error;
pub mod export;
pub mod geo_core;
pub mod geometric;
pub mod layer;
pub mod logging;
pub mod pipeline;

pub use error::{Result, SiteError};
pub use geo_core::{CoordinateTransformer, CrsId, DefaultTransformer};
pub use layer::{Feature, Layer, SiteLayers};
pub use pipeline::{run_search, SearchOutcome, SearchRequest};
