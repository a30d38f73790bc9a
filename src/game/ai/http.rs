//! HTTP engine client
//!
//! Talks to a hosted Stockfish-style service:
//! `GET <endpoint>?fen=<position>&depth=<depth>`. Uses the blocking reqwest
//! client so the polling loop has no async runtime to manage; the request
//! timeout is the only suspension bound.

use super::adapter::{parse_engine_response, EngineAdapter, EngineError, MoveSpec};
use super::resource::EngineSettings;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Default public endpoint
pub const DEFAULT_ENGINE_ENDPOINT: &str = "https://stockfish.online/api/s/v2.php";

/// Blocking HTTP implementation of [`EngineAdapter`]
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

impl HttpEngine {
    pub fn new(endpoint: &str) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        Self::with_client(endpoint, client)
    }

    /// Use a preconfigured client (proxies, TLS roots)
    pub fn with_client(
        endpoint: &str,
        client: reqwest::blocking::Client,
    ) -> Result<Self, EngineError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| EngineError::Connection(format!("bad endpoint '{endpoint}': {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// Full request URL for a position
    pub fn request_url(&self, position: &str, settings: &EngineSettings) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("fen", position)
            .append_pair("depth", &settings.depth.to_string());
        url
    }
}

fn classify(error: reqwest::Error, settings: &EngineSettings) -> EngineError {
    if error.is_timeout() {
        EngineError::Timeout(settings.timeout_ms)
    } else {
        EngineError::Connection(error.to_string())
    }
}

impl EngineAdapter for HttpEngine {
    fn request_move(
        &self,
        position: &str,
        settings: &EngineSettings,
    ) -> Result<MoveSpec, EngineError> {
        let url = self.request_url(position, settings);
        info!(
            "[ENGINE] Requesting move at depth {} for {}",
            settings.depth, position
        );
        debug!("[ENGINE] GET {}", url);

        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .timeout(settings.timeout())
            .send()
            .map_err(|e| classify(e, settings))?;

        let status = response.status();
        if !status.is_success() {
            warn!("[ENGINE] Service answered {}", status);
            return Err(EngineError::Connection(format!("HTTP {status}")));
        }

        let body = response.text().map_err(|e| classify(e, settings))?;
        debug!("[ENGINE] Response body: {}", body);

        let spec = parse_engine_response(&body)?;
        info!(
            "[ENGINE] Best move {} after {:.1}s",
            spec,
            started.elapsed().as_secs_f32()
        );
        Ok(spec)
    }
}
