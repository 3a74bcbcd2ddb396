//! Default configuration values

/// Default recommendation service base URL (the Flask dev server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Recommendation endpoint path
pub const DEFAULT_API_PATH: &str = "/api/recommend";

/// Default DNS-over-HTTPS JSON endpoint
pub const DEFAULT_DOH_URL: &str = "https://dns.google/resolve";

/// Default Open-Meteo historical archive endpoint
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 30;

/// Default timeout for DoH lookups in seconds
pub const DEFAULT_DOH_TIMEOUT: u64 = 10;

/// Default timeout for the weather archive in seconds
pub const DEFAULT_WEATHER_TIMEOUT: u64 = 15;

/// Example config printed by `--make-config`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# agrisense configuration
# Looked up in ./agrisense.toml, ./.agrisense.toml, ~/agrisense.toml
# and <config dir>/agrisense/config.toml (later entries lose).

[api]
base_url = "http://localhost:5000"
path = "/api/recommend"
connect_timeout = 30
timeout = 30
# "production" validates certificates. "self-signed" accepts the
# self-signed certificate of a trusted private deployment.
deployment = "production"

[network]
# "system" or "cloudflare" (hickory-dns against 1.1.1.1)
resolver = "system"
# Retry once through DNS-over-HTTPS when the first request fails
dns_fallback = true
doh_url = "https://dns.google/resolve"
doh_timeout = 10

[weather]
# Estimate seasonal rainfall when no rainfall reading is given
enrich = true
archive_url = "https://archive-api.open-meteo.com/v1/archive"
timeout = 15

[location]
# Set to false to never use the device position
share = true
# latitude = 28.61
# longitude = 77.21
"#;
