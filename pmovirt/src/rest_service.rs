//! Client HTTP vers l'API de gestion
//!
//! [`RestService`] implements [`Transport`] and [`VersionDiscovery`] on top
//! of a blocking `ureq` agent. The agent never turns 4xx/5xx into errors:
//! fault payloads arrive with 400/409 and must be read.

use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;
use url::Url;

use crate::errors::{Result, VirtError};
use crate::fault;
use crate::transport::{RawResponse, Transport, VersionDiscovery};
use crate::version::ServerVersion;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const XML_CONTENT_TYPE: &str = "application/xml";

/// Connection settings of a [`RestService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestSettings {
    /// API entry point, e.g. `https://engine.example.com/api`.
    pub api_url: String,
    pub timeout: Duration,
}

impl RestSettings {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Post,
    Put,
}

impl Verb {
    fn as_str(&self) -> &'static str {
        match self {
            Verb::Post => "POST",
            Verb::Put => "PUT",
        }
    }
}

/// Blocking HTTP client for the management API.
#[derive(Debug, Clone)]
pub struct RestService {
    api_url: Url,
    agent: Agent,
}

impl RestService {
    pub fn new(settings: RestSettings) -> Result<Self> {
        let api_url = Url::parse(&settings.api_url)
            .map_err(|e| VirtError::Config(anyhow::anyhow!("Invalid API URL '{}': {e}", settings.api_url)))?;

        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(settings.timeout))
            .build();
        let agent: Agent = config.into();

        info!(api_url = %api_url, timeout = ?settings.timeout, "Created REST service");
        Ok(Self { api_url, agent })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Resolves an absolute URL or a resource-relative href
    /// (`/api/vms/...`) against the API entry point.
    pub fn resolve(&self, url: &str) -> Result<String> {
        self.api_url
            .join(url)
            .map(String::from)
            .map_err(|e| VirtError::Transport(format!("Invalid URL '{url}': {e}")))
    }

    fn send(&self, verb: Verb, url: &str, body: &str) -> Result<RawResponse> {
        let url = self.resolve(url)?;
        debug!(method = verb.as_str(), url = %url, bytes = body.len(), "Sending request");

        let request = match verb {
            Verb::Post => self.agent.post(&url),
            Verb::Put => self.agent.put(&url),
        };
        let mut response = request
            .header("Content-Type", XML_CONTENT_TYPE)
            .header("Accept", XML_CONTENT_TYPE)
            .send(body)
            .map_err(|e| VirtError::Transport(format!("{} {url} failed: {e}", verb.as_str())))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| VirtError::Transport(format!("Failed to read response body from {url}: {e}")))?;

        debug!(method = verb.as_str(), url = %url, status, "Received response");
        Ok(RawResponse { status, body })
    }

    fn get(&self, url: &str) -> Result<RawResponse> {
        let url = self.resolve(url)?;
        let mut response = self
            .agent
            .get(&url)
            .header("Accept", XML_CONTENT_TYPE)
            .call()
            .map_err(|e| VirtError::Transport(format!("GET {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| VirtError::Transport(format!("Failed to read response body from {url}: {e}")))?;

        Ok(RawResponse { status, body })
    }
}

impl Transport for RestService {
    fn post(&self, url: &str, body: &str) -> Result<RawResponse> {
        self.send(Verb::Post, url, body)
    }

    fn put(&self, url: &str, body: &str) -> Result<RawResponse> {
        self.send(Verb::Put, url, body)
    }
}

impl VersionDiscovery for RestService {
    /// Reads `product_info/version` from the API entry point. Not cached.
    fn current_version(&self) -> Result<ServerVersion> {
        let response = self.get(self.api_url.as_str())?;
        let resource = fault::interpret(&response)?;
        let version = ServerVersion::from_api_xml(&resource.raw_body)?;
        info!(version = %version, "Discovered API version");
        Ok(version)
    }
}
