//! Recommendation types and the async seams the client talks through

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use super::error::TransportError;
use crate::location::{Position, PositionError};
use crate::rainfall::RainfallError;

/// One set of soil and climate readings from the field.
///
/// Values are taken as-is. Range checks belong to the caller
/// (see `crate::validation`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub moisture: f64,
    /// Rainfall in millimeters, when the kit has a rain gauge
    pub rainfall: Option<f64>,
}

/// Wire payload for `POST /api/recommend`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub moisture: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
}

impl RecommendationRequest {
    pub fn new(reading: &SensorReading, rainfall: Option<f64>) -> Self {
        Self {
            nitrogen: reading.nitrogen,
            phosphorus: reading.phosphorus,
            potassium: reading.potassium,
            ph: reading.ph,
            temperature: reading.temperature,
            humidity: reading.humidity,
            moisture: reading.moisture,
            rainfall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// A single recommended crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropPick {
    pub crop: String,
    /// Confidence as sent by the server, e.g. "95%"
    pub confidence: String,
    /// Numeric form of `confidence`, 0.0 when it can't be read
    pub confidence_value: f64,
}

/// Where the rainfall value used by the model came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallProvenance {
    pub source: String,
    pub value_used: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub status: ResponseStatus,
    pub recommendations: Vec<CropPick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RainfallProvenance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl RecommendationResult {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Highest-ranked pick, if the server returned any
    pub fn top_pick(&self) -> Option<&CropPick> {
        self.recommendations.first()
    }
}

/// Decoded `GET /` health-check body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: Option<String>,
    pub model_status: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    pub fn model_loaded(&self) -> bool {
        self.model_status.as_deref() == Some("loaded")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single outgoing HTTP call
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Host header to send when `url` addresses the server by IP
    pub virtual_host: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            virtual_host: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            virtual_host: None,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_virtual_host(mut self, host: impl Into<String>) -> Self {
        self.virtual_host = Some(host.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one HTTP request and hands back status and body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Resolves a hostname outside the system resolver
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// `None` means the name has no usable A record, which is not an error
    async fn resolve(&self, hostname: &str) -> Option<Ipv4Addr>;
}

/// Supplies the device position
#[async_trait]
pub trait PositionResolver: Send + Sync {
    async fn current_position(&self) -> Result<Position, PositionError>;
}

/// Produces a seasonal rainfall estimate for a position
#[async_trait]
pub trait RainfallEstimator: Send + Sync {
    async fn estimate_seasonal_rainfall(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, RainfallError>;
}
