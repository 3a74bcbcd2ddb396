//! DNS-over-HTTPS lookups used when the normal request path fails
//!
//! Talks to a JSON DoH endpoint (`dns.google/resolve`, `cloudflare-dns.com/dns-query`)
//! so a broken or captive local resolver can be bypassed.

use async_trait::async_trait;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::debug;

use crate::recommend::{HostResolver, HttpRequest, Transport};

/// DNS RCODE for a successful lookup
const NOERROR: u32 = 0;

/// Resource record type for IPv4 addresses
const RECORD_TYPE_A: u16 = 1;

#[derive(Debug, Deserialize)]
pub struct DohResponse {
    #[serde(rename = "Status")]
    pub status: u32,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
pub struct DohAnswer {
    #[serde(rename = "type")]
    pub record_type: u16,
    pub data: String,
}

pub struct DohResolver {
    transport: Arc<dyn Transport>,
    endpoint: String,
}

impl DohResolver {
    pub fn new(transport: Arc<dyn Transport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl HostResolver for DohResolver {
    async fn resolve(&self, hostname: &str) -> Option<Ipv4Addr> {
        let url = format!("{}?name={}&type=A", self.endpoint, hostname);
        let request = HttpRequest::get(url).header("Accept", "application/dns-json");

        let response = match self.transport.send(request).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!(status = response.status, "DoH endpoint returned an error status");
                return None;
            }
            Err(err) => {
                debug!(error = %err, "DoH query failed");
                return None;
            }
        };

        let parsed: DohResponse = match serde_json::from_str(&response.body) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "DoH response is not valid JSON");
                return None;
            }
        };

        let address = first_a_record(&parsed);
        debug!(host = hostname, address = ?address, "DoH lookup finished");
        address
    }
}

/// First IPv4 address in a resolved answer, if any
pub fn first_a_record(response: &DohResponse) -> Option<Ipv4Addr> {
    if response.status != NOERROR {
        return None;
    }
    response
        .answer
        .iter()
        .filter(|answer| answer.record_type == RECORD_TYPE_A)
        .find_map(|answer| answer.data.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::{HttpResponse, TransportError};
    use std::sync::Mutex;

    struct CannedTransport {
        response: Result<HttpResponse, TransportError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    fn resolver_with(response: Result<HttpResponse, TransportError>) -> (DohResolver, Arc<CannedTransport>) {
        let transport = Arc::new(CannedTransport {
            response,
            seen: Mutex::new(Vec::new()),
        });
        let resolver = DohResolver::new(transport.clone(), "https://dns.test/resolve");
        (resolver, transport)
    }

    fn parse(body: &str) -> DohResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_first_a_record_skips_cnames() {
        let response = parse(
            r#"{"Status":0,"Answer":[
                {"name":"api.example.com.","type":5,"TTL":300,"data":"edge.example.net."},
                {"name":"edge.example.net.","type":1,"TTL":60,"data":"203.0.113.7"},
                {"name":"edge.example.net.","type":1,"TTL":60,"data":"203.0.113.8"}
            ]}"#,
        );
        assert_eq!(first_a_record(&response), Some(Ipv4Addr::new(203, 0, 113, 7)));
    }

    #[test]
    fn test_nxdomain_yields_none() {
        let response = parse(r#"{"Status":3,"Answer":[{"type":1,"data":"203.0.113.7"}]}"#);
        assert_eq!(first_a_record(&response), None);
    }

    #[test]
    fn test_missing_answer_yields_none() {
        assert_eq!(first_a_record(&parse(r#"{"Status":0}"#)), None);
    }

    #[test]
    fn test_unparseable_data_is_skipped() {
        let response = parse(
            r#"{"Status":0,"Answer":[{"type":1,"data":"not-an-ip"},{"type":1,"data":"198.51.100.2"}]}"#,
        );
        assert_eq!(first_a_record(&response), Some(Ipv4Addr::new(198, 51, 100, 2)));
    }

    #[tokio::test]
    async fn test_resolve_queries_a_record() {
        let (resolver, transport) = resolver_with(Ok(HttpResponse {
            status: 200,
            body: r#"{"Status":0,"Answer":[{"type":1,"data":"192.0.2.10"}]}"#.to_string(),
        }));

        let address = resolver.resolve("api.example.com").await;
        assert_eq!(address, Some(Ipv4Addr::new(192, 0, 2, 10)));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://dns.test/resolve?name=api.example.com&type=A");
        assert!(seen[0]
            .headers
            .contains(&("Accept".to_string(), "application/dns-json".to_string())));
    }

    #[tokio::test]
    async fn test_resolve_swallows_failures() {
        let (resolver, _) = resolver_with(Err(TransportError::Timeout));
        assert_eq!(resolver.resolve("api.example.com").await, None);

        let (resolver, _) = resolver_with(Ok(HttpResponse {
            status: 502,
            body: String::new(),
        }));
        assert_eq!(resolver.resolve("api.example.com").await, None);

        let (resolver, _) = resolver_with(Ok(HttpResponse {
            status: 200,
            body: "<html>".to_string(),
        }));
        assert_eq!(resolver.resolve("api.example.com").await, None);
    }
}
