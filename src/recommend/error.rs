//! Error taxonomy for the recommendation request path

use thiserror::Error;

use crate::location::PositionError;
use crate::rainfall::RainfallError;

/// Low-level failure of a single HTTP exchange
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// Failure surfaced to the caller of `RecommendationClient`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionError {
    #[error("No network connection: {0}")]
    NoConnectivity(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Secure connection failed: {0}")]
    TlsFailure(String),

    #[error("Server error ({status}): {message}")]
    ServerError {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    #[error("Server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Unexpected response from server: {0}")]
    ProtocolError(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl ConnectionError {
    /// Single line suitable for showing to the user as-is
    pub fn user_message(&self) -> String {
        match self {
            Self::NoConnectivity(_) => {
                "Connection Error: Could not reach the server. Check your network connection."
                    .to_string()
            }
            Self::Timeout => "Connection Error: Request timed out. Try again.".to_string(),
            Self::TlsFailure(_) => {
                "Connection Error: Secure connection to the server failed.".to_string()
            }
            Self::ServerError { status, message, .. } => {
                format!("Server Error ({}): {}", status, message)
            }
            Self::HttpStatus(status) => format!(
                "Connection Error: The server returned HTTP {}. Try again later.",
                status
            ),
            Self::ProtocolError(_) => {
                "Connection Error: The server sent a response that could not be read.".to_string()
            }
            Self::Request(reason) => format!("Connection Error: {}", reason),
        }
    }

    /// Detail lines sent by the server alongside its error message
    pub fn details(&self) -> &[String] {
        match self {
            Self::ServerError { details, .. } => details,
            _ => &[],
        }
    }

    /// Whether the server itself answered with a structured error body
    pub fn is_server_verdict(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }
}

impl From<TransportError> for ConnectionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            TransportError::Connect(reason) => Self::NoConnectivity(reason),
            TransportError::Tls(reason) => Self::TlsFailure(reason),
            TransportError::InvalidRequest(reason) | TransportError::Other(reason) => {
                Self::Request(reason)
            }
        }
    }
}

/// Why the rainfall enrichment step produced no value.
///
/// Logged and dropped by the client, never returned to callers.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("position unavailable: {0}")]
    Position(#[from] PositionError),

    #[error("rainfall estimate failed: {0}")]
    Rainfall(#[from] RainfallError),

    #[error("rainfall enrichment disabled")]
    Disabled,
}
