use thiserror::Error;

/// Errors that reject an evaluation request before any sampling happens.
///
/// A missing regulation profile and a coarse sampling step are not errors:
/// they are reported as [`crate::sim::report::Advisory`] values on a normal report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShadowError {
    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Degenerate massing: {0}")]
    DegenerateMassing(String),

    #[error("Invalid regulation profile: {0}")]
    InvalidRegulationProfile(String),

    #[error("Invalid sampling: {0}")]
    InvalidSampling(String),

    #[error("Invalid check-point grid: {0}")]
    InvalidGrid(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ShadowError>;
