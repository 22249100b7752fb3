//! Network fetcher: one blocking GET per lookup.
//!
//! No custom headers, no retry. Failures are reported as [`FetchError`] to
//! the fetcher's own callers; [`fetch_or_empty`] is the degrading entry point
//! the resolver uses.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Transport-level failure of a lookup request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("failed to read response body from {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can retrieve the body behind a URL.
///
/// Implementations must be shareable across worker threads; they are called
/// concurrently and must not keep per-call state.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP(S) fetcher backed by `ureq`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Fetcher whose requests fail with a transport error after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(t) => FetchError::Transport {
                url: url.to_string(),
                message: t.to_string(),
            },
        })?;

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|source| FetchError::Io {
                url: url.to_string(),
                source,
            })?;

        debug!(url, bytes = body.len(), "GeoIP response received");
        Ok(body)
    }
}

/// Fetch `url`, treating any failure as an empty body.
pub fn fetch_or_empty(fetcher: &dyn Fetch, url: &str) -> Vec<u8> {
    match fetcher.fetch(url) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "GeoIP lookup failed, location unknown");
            Vec::new()
        }
    }
}
