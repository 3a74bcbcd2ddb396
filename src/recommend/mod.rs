//! Crop recommendation API client

mod client;
mod error;
mod parser;
mod types;

pub use client::{ClientSettings, RecommendationClient};
pub use error::{ConnectionError, TransportError};
pub use types::*;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::dns::DohResolver;
use crate::http::{ReqwestTransport, TransportSettings};
use crate::location::FixedPosition;
use crate::rainfall::OpenMeteoArchive;

/// Wire a client from configuration
pub fn create_client(config: &Config) -> Result<RecommendationClient> {
    let api = Arc::new(ReqwestTransport::new(TransportSettings {
        connect_timeout: Duration::from_secs(config.api.connect_timeout),
        timeout: Duration::from_secs(config.api.timeout),
        tls: config.tls_policy(),
        resolver: config.network.resolver,
    })?);

    let doh = Arc::new(ReqwestTransport::new(TransportSettings {
        connect_timeout: Duration::from_secs(config.network.doh_timeout),
        timeout: Duration::from_secs(config.network.doh_timeout),
        tls: Default::default(),
        resolver: config.network.resolver,
    })?);

    let weather = Arc::new(ReqwestTransport::new(TransportSettings {
        connect_timeout: Duration::from_secs(config.weather.timeout),
        timeout: Duration::from_secs(config.weather.timeout),
        tls: Default::default(),
        resolver: config.network.resolver,
    })?);

    let settings = ClientSettings {
        base_url: config.api.base_url.clone(),
        path: config.api.path.clone(),
        dns_fallback: config.network.dns_fallback,
        enrich_rainfall: config.weather.enrich,
    };

    let position = if config.location.share {
        FixedPosition::from_coordinates(config.location.latitude, config.location.longitude)
    } else {
        FixedPosition::denied()
    };

    Ok(RecommendationClient::new(
        settings,
        api,
        Arc::new(DohResolver::new(doh, config.network.doh_url.clone())),
        Arc::new(position),
        Arc::new(OpenMeteoArchive::new(weather, config.weather.archive_url.clone())),
    ))
}
