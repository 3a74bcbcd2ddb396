//! Seasonal rainfall estimation

mod archive;
mod season;

pub use archive::OpenMeteoArchive;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RainfallError {
    #[error("weather archive request failed: {0}")]
    RequestFailed(String),

    #[error("weather archive returned HTTP {0}")]
    Status(u16),

    #[error("failed to parse weather archive response: {0}")]
    ParseError(String),

    #[error("weather archive response has no daily precipitation series")]
    MissingSeries,
}
