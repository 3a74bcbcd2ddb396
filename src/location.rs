//! Device position used for rainfall enrichment

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::recommend::PositionResolver;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error("location permission denied")]
    Denied,

    #[error("location unavailable: {0}")]
    Unavailable(String),

    #[error("invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PositionError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(PositionError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Position taken from flags or config. Without one, lookups fail as unavailable.
#[derive(Debug, Clone, Default)]
pub struct FixedPosition {
    position: Option<Position>,
    denied: bool,
}

impl FixedPosition {
    /// Build from optional raw coordinates. Both halves are required.
    pub fn from_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        let position = match (latitude, longitude) {
            (Some(lat), Some(lon)) => match Position::new(lat, lon) {
                Ok(position) => Some(position),
                Err(err) => {
                    warn!(latitude = lat, longitude = lon, "ignoring configured position: {}", err);
                    None
                }
            },
            (Some(_), None) | (None, Some(_)) => {
                warn!("latitude and longitude must be set together, ignoring position");
                None
            }
            (None, None) => None,
        };
        Self {
            position,
            denied: false,
        }
    }

    /// A source that refuses every lookup, for users who don't share location
    pub fn denied() -> Self {
        Self {
            position: None,
            denied: true,
        }
    }
}

#[async_trait]
impl PositionResolver for FixedPosition {
    async fn current_position(&self) -> Result<Position, PositionError> {
        if self.denied {
            return Err(PositionError::Denied);
        }
        self.position.ok_or_else(|| {
            PositionError::Unavailable("no latitude/longitude configured".to_string())
        })
    }
}
