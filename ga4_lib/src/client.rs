//! HTTP client for the GA4 Measurement Protocol.

use crate::diagnostics::{DiagnosticSink, StderrSink};
use crate::environment::Environment;
use crate::error::Error;
use crate::event::{Event, Payload, ValidationResponse};
use crate::helpers::{client_id, collect_url};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;
use uuid::{NoContext, Timestamp, Uuid};

/// Production GA4 host; the collect paths are appended to it.
pub const DEFAULT_ENDPOINT: &str = "https://www.google-analytics.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// GA4 Measurement Protocol client.
///
/// Identity (measurement id, API secret, user id, debug flag) is fixed at
/// construction. Each [`Client::submit_event`] call is independent: it builds
/// a fresh payload with its own client id and timestamp and issues exactly one
/// POST. Clones share the HTTP connection pool and random source.
#[derive(Clone)]
pub struct Client {
    measurement_id: String,
    api_secret: String,
    user_id: String,
    debug: bool,
    endpoint: String,
    environment: Environment,
    rng: Arc<Mutex<StdRng>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    http: HttpClient,
}

impl Client {
    /// Create a client with default endpoint, timeout, environment and sink.
    /// An empty `user_id` is replaced by a freshly generated UUIDv7.
    pub fn new(
        measurement_id: impl Into<String>,
        api_secret: impl Into<String>,
        user_id: impl Into<String>,
        debug: bool,
    ) -> Result<Self, Error> {
        Self::builder(measurement_id, api_secret)
            .user_id(user_id)
            .debug(debug)
            .build()
    }

    pub fn builder(
        measurement_id: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder {
            measurement_id: measurement_id.into(),
            api_secret: api_secret.into(),
            user_id: String::new(),
            debug: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            environment: Environment::current(),
            rng_seed: None,
            diagnostics: Arc::new(StderrSink),
        }
    }

    pub fn measurement_id(&self) -> &str {
        &self.measurement_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Send one event.
    ///
    /// The caller's event is left untouched; the outbound copy gets `os`,
    /// `arch` and `version` params, overwriting any caller values under those
    /// keys. Any status >= 300 fails without reading the body. In debug mode
    /// the validation response is read, parsed and printed to the diagnostic
    /// sink, but never returned.
    pub async fn submit_event(&self, event: &Event) -> Result<(), Error> {
        let uri = collect_url(
            &self.endpoint,
            self.debug,
            &self.api_secret,
            &self.measurement_id,
        );
        let now = Utc::now();
        let payload = Payload {
            client_id: self.next_client_id(now.timestamp()),
            user_id: self.user_id.clone(),
            timestamp_micros: now.timestamp_micros(),
            events: vec![self.stamp(event)],
        };
        let body = serde_json::to_vec(&payload).map_err(Error::Serialization)?;

        if self.debug {
            self.diagnostics.emit(&format!(
                "[DEBUG] send GA4 event {} {}",
                uri,
                String::from_utf8_lossy(&body)
            ));
        }
        tracing::debug!(event = %event.name, debug = self.debug, "sending GA4 event");

        let res = self
            .http
            .post(&uri)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        let status = res.status().as_u16();
        if status >= 300 {
            tracing::debug!(status, event = %event.name, "GA4 rejected event");
            return Err(Error::UnexpectedStatus { code: status });
        }

        if !self.debug {
            return Ok(());
        }

        let bytes = res.bytes().await.map_err(Error::ResponseRead)?;
        let validation: ValidationResponse =
            serde_json::from_slice(&bytes).map_err(Error::ResponseParse)?;
        self.diagnostics.emit(&format!(
            "[DEBUG] get GA4 validation response {} {:?}",
            status, validation
        ));
        Ok(())
    }

    /// Outbound copy of `event` carrying the environment params.
    fn stamp(&self, event: &Event) -> Event {
        let mut params = event.params.clone().unwrap_or_default();
        params.insert("os".to_string(), self.environment.os.clone().into());
        params.insert("arch".to_string(), self.environment.arch.clone().into());
        params.insert(
            "version".to_string(),
            self.environment.version.clone().into(),
        );
        Event {
            name: event.name.clone(),
            params: Some(params),
        }
    }

    fn next_client_id(&self, unix_secs: i64) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        client_id(&mut *rng, unix_secs)
    }
}

/// Builder for [`Client`]; every knob has a production default.
pub struct ClientBuilder {
    measurement_id: String,
    api_secret: String,
    user_id: String,
    debug: bool,
    endpoint: String,
    timeout: Duration,
    environment: Environment,
    rng_seed: Option<u64>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ClientBuilder {
    /// Stable user id; empty means "generate one".
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Target the validation endpoint and print diagnostics.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Base URL the collect paths are appended to (scheme + host, optional port/path).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Seed the client-id generator for reproducible ids.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let endpoint = validate_endpoint(&self.endpoint)?;
        let user_id = if self.user_id.is_empty() {
            generate_user_id()?
        } else {
            self.user_id
        };
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(format!("ga4-cli/{}", crate::VERSION))
            .build()
            .map_err(Error::Transport)?;
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Client {
            measurement_id: self.measurement_id,
            api_secret: self.api_secret,
            user_id,
            debug: self.debug,
            endpoint,
            environment: self.environment,
            rng: Arc::new(Mutex::new(rng)),
            diagnostics: self.diagnostics,
            http,
        })
    }
}

/// Time-ordered UUIDv7 from the current system time.
fn generate_user_id() -> Result<String, Error> {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::IdentifierGeneration(e.to_string()))?;
    let ts = Timestamp::from_unix(NoContext, since_epoch.as_secs(), since_epoch.subsec_nanos());
    Ok(Uuid::new_v7(ts).to_string())
}

fn validate_endpoint(endpoint: &str) -> Result<String, Error> {
    let invalid = |reason: &str| Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.query().is_some() {
        return Err(invalid("must not carry a query string"));
    }
    if parsed.fragment().is_some() {
        return Err(invalid("must not carry a fragment"));
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}
