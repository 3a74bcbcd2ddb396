//! HTTP transport built on reqwest
//!
//! Optionally swaps in hickory-dns with Cloudflare DNS (1.1.1.1) so requests don't
//! depend on the system resolver, which is often missing or broken on
//! constrained mobile networks (e.g., Termux/Android).

use anyhow::{Context, Result};
use async_trait::async_trait;
use hickory_resolver::{
    config::ResolverConfig,
    name_server::TokioConnectionProvider,
    Resolver,
};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::recommend::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

type TokioResolver = Resolver<TokioConnectionProvider>;

/// Which resolver turns hostnames into addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    #[default]
    System,
    Cloudflare,
}

impl ResolverMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "system" => Some(Self::System),
            "cloudflare" | "hickory" => Some(Self::Cloudflare),
            _ => None,
        }
    }
}

/// Certificate validation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    #[default]
    Strict,
    /// Accept self-signed certificates. Only for known self-signed deployments.
    TrustSelfSigned,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub tls: TlsPolicy,
    pub resolver: ResolverMode,
}

/// Custom DNS resolver that uses Cloudflare DNS (1.1.1.1)
/// Does not depend on /etc/resolv.conf
struct HickoryDnsResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryDnsResolver {
    fn new() -> Self {
        let resolver = Resolver::builder_with_config(
            ResolverConfig::cloudflare(),
            TokioConnectionProvider::default(),
        )
        .build();
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

impl Resolve for HickoryDnsResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.resolver.clone();
        Box::pin(async move {
            let lookup = resolver
                .lookup_ip(name.as_str())
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

            let addrs: Vec<SocketAddr> = lookup
                .iter()
                .map(|ip| SocketAddr::new(ip, 0))
                .collect();

            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

/// Create an HTTP client builder with timeouts, resolver and TLS policy applied
pub fn create_client_builder(settings: &TransportSettings) -> reqwest::ClientBuilder {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.timeout);

    if settings.resolver == ResolverMode::Cloudflare {
        builder = builder.dns_resolver(Arc::new(HickoryDnsResolver::new()));
    }

    if settings.tls == TlsPolicy::TrustSelfSigned {
        warn!("certificate validation is relaxed for a self-signed deployment");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
}

/// `Transport` backed by a reqwest client
pub struct ReqwestTransport {
    client: Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let client = create_client_builder(&settings)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, settings })
    }

    /// Client and URL for a request that addresses the server by IP while
    /// presenting `host` as the virtual host. The returned URL carries the
    /// hostname and the client is pinned to the IP, so SNI and certificate
    /// checks still see the real name.
    fn pinned(&self, url: &Url, host: &str) -> Result<(Client, Url, String), TransportError> {
        let ip: IpAddr = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .and_then(|h| h.parse().ok())
            .ok_or_else(|| {
                TransportError::InvalidRequest(format!("virtual host needs an IP address in {}", url))
            })?;
        let port = url.port_or_known_default().unwrap_or(443);

        let client = create_client_builder(&self.settings)
            .resolve(host, SocketAddr::new(ip, port))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let mut named = url.clone();
        named
            .set_host(Some(host))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let host_header = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok((client, named, host_header))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.url, e)))?;

        let (client, url, host_header) = match request.virtual_host.as_deref() {
            Some(host) => {
                let (client, url, header) = self.pinned(&url, host)?;
                (client, url, Some(header))
            }
            None => (self.client.clone(), url, None),
        };

        let mut builder = match request.method {
            HttpMethod::Get => client.get(url),
            HttpMethod::Post => client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(host) = host_header {
            builder = builder.header(reqwest::header::HOST, host);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse { status, body })
    }
}

/// Map a reqwest failure onto the transport error kinds
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    // The URL may itself contain words like "tls"
    let err = err.without_url();
    let detail = error_chain(&err);
    if is_tls_failure(&err) {
        TransportError::Tls(detail)
    } else if err.is_connect() {
        TransportError::Connect(detail)
    } else if err.is_builder() {
        TransportError::InvalidRequest(detail)
    } else {
        TransportError::Other(detail)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Whether a cause below the top-level error reports a TLS problem.
/// Socket-level refusals stop the search.
fn is_tls_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable
            ) {
                return false;
            }
        }
        if looks_like_tls(&cause.to_string()) {
            return true;
        }
        source = cause.source();
    }
    false
}

fn looks_like_tls(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    ["certificate", "tls", "handshake", "unknownissuer"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(5),
            tls: TlsPolicy::Strict,
            resolver: ResolverMode::System,
        }
    }

    #[derive(Debug)]
    struct Wrapped(&'static str, io::Error);

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.1)
        }
    }

    #[test]
    fn test_error_chain_includes_causes() {
        let err = Wrapped(
            "error sending request",
            io::Error::new(io::ErrorKind::Other, "invalid peer certificate: UnknownIssuer"),
        );
        let chain = error_chain(&err);
        assert_eq!(
            chain,
            "error sending request: invalid peer certificate: UnknownIssuer"
        );
        assert!(is_tls_failure(&err));
    }

    #[test]
    fn test_connection_refused_is_not_tls() {
        assert!(!looks_like_tls("error trying to connect: tcp connect error: Connection refused"));
    }

    #[test]
    fn test_tls_word_in_url_is_not_tls_failure() {
        let err = Wrapped(
            "error sending request for url (https://tls-gw.agrisense.test/api/recommend)",
            io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "tcp connect error: Connection refused",
            ),
        );
        assert!(!is_tls_failure(&err));
    }

    #[test]
    fn test_handshake_cause_is_tls_failure() {
        let err = Wrapped(
            "error sending request",
            io::Error::new(io::ErrorKind::InvalidData, "received fatal alert: HandshakeFailure"),
        );
        assert!(is_tls_failure(&err));
    }

    #[test]
    fn test_resolver_mode_parse() {
        assert_eq!(ResolverMode::parse("system"), Some(ResolverMode::System));
        assert_eq!(ResolverMode::parse("Cloudflare"), Some(ResolverMode::Cloudflare));
        assert_eq!(ResolverMode::parse("quad9"), None);
    }

    #[test]
    fn test_transport_builds_with_self_signed_policy() {
        let transport = ReqwestTransport::new(TransportSettings {
            tls: TlsPolicy::TrustSelfSigned,
            ..settings()
        });
        assert!(transport.is_ok());
    }

    #[test]
    fn test_pinned_rewrites_url_to_virtual_host() {
        let transport = ReqwestTransport::new(settings()).unwrap();
        let url = Url::parse("https://203.0.113.9:8443/api/recommend").unwrap();
        let (_, named, header) = transport.pinned(&url, "api.agrisense.test").unwrap();
        assert_eq!(named.as_str(), "https://api.agrisense.test:8443/api/recommend");
        assert_eq!(header, "api.agrisense.test:8443");
    }

    #[test]
    fn test_pinned_requires_ip_url() {
        let transport = ReqwestTransport::new(settings()).unwrap();
        let url = Url::parse("https://api.agrisense.test/api/recommend").unwrap();
        assert!(matches!(
            transport.pinned(&url, "api.agrisense.test"),
            Err(TransportError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let transport = ReqwestTransport::new(settings()).unwrap();
        let err = transport
            .send(HttpRequest::get("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
