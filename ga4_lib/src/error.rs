//! Error types for the GA4 client.

use thiserror::Error;

/// Everything that can go wrong while building a client or submitting an event.
#[derive(Error, Debug)]
pub enum Error {
    #[error("generate user id failed: {0}")]
    IdentifierGeneration(String),

    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("marshal GA4 request payload failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("request GA4 failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("GA4 response got unexpected status {code}")]
    UnexpectedStatus { code: u16 },

    #[error("read GA4 response body failed: {0}")]
    ResponseRead(#[source] reqwest::Error),

    #[error("unmarshal GA4 response body failed: {0}")]
    ResponseParse(#[source] serde_json::Error),
}

impl Error {
    /// HTTP status code, when the service answered with a failure status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { code } => Some(*code),
            _ => None,
        }
    }
}
