//! Google Analytics 4 Measurement Protocol client library.
//!
//! Sends one analytics event per call to the GA4 collection endpoint, with an
//! optional debug mode that targets the validation endpoint and prints what
//! was sent and what the service answered.

pub mod client;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod event;
pub mod helpers;
pub mod secret;

pub use client::{Client, ClientBuilder};
pub use diagnostics::{DiagnosticSink, StderrSink};
pub use environment::Environment;
pub use error::Error;
pub use event::{Event, Payload, ValidationMessage, ValidationResponse};
pub use helpers::{get_api_secret, parse_param, ApiSecretSource};
pub use secret::SecretBackend;

/// Library version reported in every event's `version` param.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
