//! Gateway error types

use thiserror::Error;

/// Gateway error with classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Remote { status }, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Decode, message)
    }

    /// Short human-readable description: error class plus message
    pub fn diagnostic(&self) -> String {
        format!("[{}] {}", self.kind.label(), self.message)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::timeout(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            GatewayError::transport(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            GatewayError::decode(format!("Failed to read response: {e}"))
        } else {
            GatewayError::transport(format!("Request failed: {e}"))
        }
    }
}

/// Failure classes seen at the network boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Unreachable host, DNS, connection reset
    Transport,
    /// No answer within the allotted time
    Timeout,
    /// The service answered with a non-2xx status
    Remote { status: u16 },
    /// 2xx with a body that is not the expected JSON
    Decode,
}

impl GatewayErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Transport => "network error",
            Self::Timeout => "timed out",
            Self::Remote { .. } => "service error",
            Self::Decode => "invalid response",
        }
    }

    /// Transport-level failures, as opposed to the service rejecting the call
    pub fn is_transport(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout)
    }
}
