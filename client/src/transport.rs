//! Executes `HttpRequest` values built by the core.
//!
//! # Design
//! The service client only needs "send this GET, give me status and body",
//! so that is all `Transport` asks for. Non-2xx statuses are returned as
//! data, never as `Err`; status interpretation belongs to the core. Once a
//! status line has arrived the result is always `Ok`: bodies are decoded
//! lossily and a body that cannot be read is handed on as empty, so the
//! core still sees the status first.

use std::time::Duration;

use geoplanet_core::{GeoPlanetError, HttpRequest, HttpResponse};
use tracing::warn;

/// Connect timeout applied to every request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: u32 = 10;

/// Performs one blocking HTTP round trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, GeoPlanetError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .max_redirects(MAX_REDIRECTS)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, GeoPlanetError> {
        let mut builder = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(|e| {
            warn!(error = %e, "GeoPlanet request failed");
            GeoPlanetError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .unwrap_or_else(|e| {
                warn!(status, error = %e, "Failed to read GeoPlanet response body");
                Vec::new()
            });

        Ok(HttpResponse::new(status, String::from_utf8_lossy(&bytes)))
    }
}
