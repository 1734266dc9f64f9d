//! Collaborators the dispatcher talks to.

use crate::errors::Result;
use crate::version::ServerVersion;

/// Result of an HTTP call:
/// - HTTP status code
/// - raw body (always, even for 4xx/5xx)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends XML bodies to the API.
///
/// Implementations return `Ok` for every HTTP answer, whatever its status,
/// and fail with [`VirtError::Transport`](crate::VirtError::Transport) only
/// when no answer was obtained. No retry happens at this level.
pub trait Transport {
    fn post(&self, url: &str, body: &str) -> Result<RawResponse>;

    fn put(&self, url: &str, body: &str) -> Result<RawResponse>;
}

/// Reports the server's product version.
///
/// Called once per version-sensitive action; any caching is up to the
/// implementation.
pub trait VersionDiscovery {
    fn current_version(&self) -> Result<ServerVersion>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, url: &str, body: &str) -> Result<RawResponse> {
        (**self).post(url, body)
    }

    fn put(&self, url: &str, body: &str) -> Result<RawResponse> {
        (**self).put(url, body)
    }
}

impl<V: VersionDiscovery + ?Sized> VersionDiscovery for &V {
    fn current_version(&self) -> Result<ServerVersion> {
        (**self).current_version()
    }
}
