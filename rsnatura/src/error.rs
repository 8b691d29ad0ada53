use thiserror::Error;

/// Errors raised by the search pipeline.
///
/// Every variant is terminal for the run that produced it: they all come from
/// invalid input or data, never from transient conditions.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Target coordinate system cannot be resolved, or layers disagree and no
    /// target was supplied
    #[error("invalid CRS: {0}")]
    InvalidCrs(String),

    /// Non-positive or non-finite search radius
    #[error("invalid radius: {0} km (must be a positive number of kilometres)")]
    InvalidRadius(f64),

    /// Malformed or un-intersectable geometry
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Legend handles requested with an empty color sequence
    #[error("invalid symbology: {0}")]
    InvalidSymbology(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;
