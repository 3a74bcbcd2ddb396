//! Configuration module - handles loading and merging configs

mod defaults;
mod loader;

pub use defaults::*;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::http::{ResolverMode, TlsPolicy};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub location: LocationConfig,
}

/// Recommendation service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_path")]
    pub path: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub deployment: Deployment,
}

/// Deployment kind, which decides how certificates are checked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Deployment {
    #[default]
    Production,
    SelfSigned,
}

impl Deployment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "self-signed" | "self_signed" => Some(Self::SelfSigned),
            _ => None,
        }
    }
}

/// Resolver and DNS fallback settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    #[serde(default)]
    pub resolver: ResolverMode,

    #[serde(default = "default_true")]
    pub dns_fallback: bool,

    #[serde(default = "default_doh_url")]
    pub doh_url: String,

    #[serde(default = "default_doh_timeout")]
    pub doh_timeout: u64,
}

/// Rainfall enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enrich: bool,

    #[serde(default = "default_archive_url")]
    pub archive_url: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout: u64,
}

/// Fixed device position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationConfig {
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// When false, position lookups are refused and rainfall is never estimated
    #[serde(default = "default_true")]
    pub share: bool,
}

// Default value functions
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_doh_url() -> String {
    DEFAULT_DOH_URL.to_string()
}

fn default_archive_url() -> String {
    DEFAULT_ARCHIVE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_doh_timeout() -> u64 {
    DEFAULT_DOH_TIMEOUT
}

fn default_weather_timeout() -> u64 {
    DEFAULT_WEATHER_TIMEOUT
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_api_path(),
            connect_timeout: default_connect_timeout(),
            timeout: default_timeout(),
            deployment: Deployment::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverMode::default(),
            dns_fallback: true,
            doh_url: default_doh_url(),
            doh_timeout: default_doh_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enrich: true,
            archive_url: default_archive_url(),
            timeout: default_weather_timeout(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            share: true,
        }
    }
}

impl Config {
    /// Apply CLI argument overrides
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout = timeout;
        }
        if args.no_enrich {
            self.weather.enrich = false;
        }
        if args.no_fallback {
            self.network.dns_fallback = false;
        }
        if let Some(latitude) = args.latitude {
            self.location.latitude = Some(latitude);
        }
        if let Some(longitude) = args.longitude {
            self.location.longitude = Some(longitude);
        }
        self
    }

    /// Certificate policy for the recommendation service
    pub fn tls_policy(&self) -> TlsPolicy {
        match self.api.deployment {
            Deployment::Production => TlsPolicy::Strict,
            Deployment::SelfSigned => TlsPolicy::TrustSelfSigned,
        }
    }
}
