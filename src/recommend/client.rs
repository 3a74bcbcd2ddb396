//! Recommendation client: enrichment, primary request and DNS fallback

use reqwest::Url;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{ConnectionError, EnrichmentError};
use super::parser;
use super::types::{
    HealthStatus, HostResolver, HttpRequest, HttpResponse, PositionResolver, RainfallEstimator,
    RecommendationRequest, RecommendationResult, SensorReading, Transport,
};

/// Static settings for one client, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub base_url: String,
    pub path: String,
    pub dns_fallback: bool,
    pub enrich_rainfall: bool,
}

pub struct RecommendationClient {
    settings: ClientSettings,
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn HostResolver>,
    position: Arc<dyn PositionResolver>,
    rainfall: Arc<dyn RainfallEstimator>,
}

impl RecommendationClient {
    pub fn new(
        settings: ClientSettings,
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn HostResolver>,
        position: Arc<dyn PositionResolver>,
        rainfall: Arc<dyn RainfallEstimator>,
    ) -> Self {
        Self {
            settings,
            transport,
            resolver,
            position,
            rainfall,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Ask the service which crops suit `reading`.
    ///
    /// Rainfall comes from `rainfall_override`, then the reading itself, then
    /// a best-effort seasonal estimate. When none is available the field is
    /// left out and the server applies its own default.
    pub async fn get_recommendation(
        &self,
        reading: &SensorReading,
        rainfall_override: Option<f64>,
    ) -> Result<RecommendationResult, ConnectionError> {
        let rainfall = match rainfall_override.or(reading.rainfall) {
            Some(mm) => Some(mm),
            // Enrichment failure never fails the request
            None => match self.estimate_rainfall().await {
                Ok(mm) => {
                    info!(rainfall_mm = mm, "using estimated seasonal rainfall");
                    Some(mm)
                }
                Err(err) => {
                    warn!(error = %err, "rainfall enrichment failed, sending without rainfall");
                    None
                }
            },
        };

        let payload = RecommendationRequest::new(reading, rainfall);
        let body = serde_json::to_value(&payload)
            .map_err(|e| ConnectionError::Request(format!("could not encode request: {}", e)))?;

        let path = self.settings.path.clone();
        self.exchange(
            &path,
            |url| HttpRequest::post_json(url, body.clone()),
            interpret_recommendation,
        )
        .await
    }

    /// Query the service health endpoint (`GET /`)
    pub async fn health(&self) -> Result<HealthStatus, ConnectionError> {
        self.exchange("/", |url| HttpRequest::get(url), interpret_health)
            .await
    }

    async fn estimate_rainfall(&self) -> Result<f64, EnrichmentError> {
        if !self.settings.enrich_rainfall {
            return Err(EnrichmentError::Disabled);
        }
        let position = self.position.current_position().await?;
        let mm = self
            .rainfall
            .estimate_seasonal_rainfall(position.latitude, position.longitude)
            .await?;
        Ok(mm)
    }

    /// Primary attempt, then at most one retry through DoH.
    /// A failed retry always reports the primary error.
    async fn exchange<T, B, I>(&self, path: &str, build: B, interpret: I) -> Result<T, ConnectionError>
    where
        B: Fn(String) -> HttpRequest,
        I: Fn(HttpResponse) -> Result<T, ConnectionError>,
    {
        let url = join_url(&self.settings.base_url, path);
        let original = match self.attempt(build(url.clone()), &interpret).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if original.is_server_verdict() || !self.settings.dns_fallback {
            return Err(original);
        }

        debug!(error = %original, "primary request failed, trying DNS-over-HTTPS fallback");
        match self.retry_via_doh(&url, &build, &interpret).await {
            Some(value) => {
                info!("request succeeded through DNS fallback");
                Ok(value)
            }
            None => Err(original),
        }
    }

    async fn attempt<T, I>(&self, request: HttpRequest, interpret: &I) -> Result<T, ConnectionError>
    where
        I: Fn(HttpResponse) -> Result<T, ConnectionError>,
    {
        let response = self.transport.send(request).await?;
        interpret(response)
    }

    async fn retry_via_doh<T, B, I>(&self, url: &str, build: &B, interpret: &I) -> Option<T>
    where
        B: Fn(String) -> HttpRequest,
        I: Fn(HttpResponse) -> Result<T, ConnectionError>,
    {
        let hostname = fallback_hostname(url)?;
        let address = self.resolver.resolve(&hostname).await?;
        let retry_url = with_ip_host(url, address)?;

        debug!(host = %hostname, %address, "retrying with resolved address");
        match self
            .attempt(build(retry_url).with_virtual_host(hostname), interpret)
            .await
        {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(error = %err, "DNS fallback retry failed");
                None
            }
        }
    }
}

fn interpret_recommendation(response: HttpResponse) -> Result<RecommendationResult, ConnectionError> {
    if response.is_success() {
        return parser::parse_body(&response.body)
            .map_err(|e| ConnectionError::ProtocolError(e.to_string()));
    }
    Err(error_for_status(&response))
}

fn interpret_health(response: HttpResponse) -> Result<HealthStatus, ConnectionError> {
    if response.is_success() {
        return parser::parse_health(&response.body).ok_or_else(|| {
            ConnectionError::ProtocolError("health response is not a JSON object".to_string())
        });
    }
    Err(error_for_status(&response))
}

/// Non-2xx: prefer the server's own message and details when it sent them
fn error_for_status(response: &HttpResponse) -> ConnectionError {
    match parser::parse_body(&response.body) {
        Ok(result) if result.message.is_some() || result.errors.is_some() => {
            ConnectionError::ServerError {
                status: response.status,
                message: result
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", response.status)),
                details: result.errors.unwrap_or_default(),
            }
        }
        _ => ConnectionError::HttpStatus(response.status),
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Hostname worth resolving over DoH; `None` when the URL already uses an IP
fn fallback_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return None;
    }
    Some(host.to_string())
}

fn with_ip_host(url: &str, address: Ipv4Addr) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_ip_host(IpAddr::V4(address)).ok()?;
    Some(parsed.to_string())
}
