//! HTTP transport for the metadata probe and the content download.
//!
//! The module uses a trait-based design so the fetch logic can be exercised
//! without a network:
//! - [`Transport`]: the two requests the rest of the program needs
//! - [`HttpTransport`]: the production implementation over `reqwest`
//!
//! Both requests carry the fixed [`USER_AGENT`](crate::config::USER_AGENT)
//! and their own timeout. Redirects are followed.

use crate::config::{Timeouts, USER_AGENT};
use reqwest::Client;
use reqwest::header::LAST_MODIFIED;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, instrument};

/// The network operations used by the date resolver and the store.
pub trait Transport {
    /// Issue a metadata-only request and return the raw `Last-Modified` value, if any.
    async fn last_modified(&self, url: &str) -> Result<Option<String>, Box<dyn Error>>;

    /// Retrieve the full body. Any non-success status is an error.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Box<dyn Error>>;
}

/// [`Transport`] backed by a single shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeouts: Timeouts,
}

impl HttpTransport {
    /// Build the client with the fixed user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeouts: Timeouts) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, timeouts })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self))]
    async fn last_modified(&self, url: &str) -> Result<Option<String>, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self
            .client
            .head(url)
            .timeout(self.timeouts.probe)
            .send()
            .await?;

        let value = match response.headers().get(LAST_MODIFIED) {
            Some(v) => Some(v.to_str()?.to_string()),
            None => None,
        };
        debug!(
            status = %response.status(),
            last_modified = ?value,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "HEAD complete"
        );
        Ok(value)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(url)
            .timeout(self.timeouts.fetch)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "GET complete"
        );
        Ok(body.to_vec())
    }
}

/// In-memory transport for tests. Counts calls so tests can assert that a
/// skipped resource was never downloaded.
#[cfg(test)]
pub mod fake {
    use super::Transport;
    use std::cell::{Cell, RefCell};
    use std::error::Error;

    #[derive(Debug)]
    pub struct FakeTransport {
        /// `Err` simulates a probe failure such as a timeout.
        pub last_modified: Result<Option<String>, String>,
        /// `Err` simulates a failed download (e.g. "HTTP 404").
        pub body: Result<Vec<u8>, String>,
        pub probes: Cell<usize>,
        pub fetches: Cell<usize>,
        pub fetched_urls: RefCell<Vec<String>>,
    }

    impl Default for FakeTransport {
        fn default() -> Self {
            Self {
                last_modified: Ok(None),
                body: Ok(Vec::new()),
                probes: Cell::new(0),
                fetches: Cell::new(0),
                fetched_urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl FakeTransport {
        pub fn serving(last_modified: Option<&str>, body: &[u8]) -> Self {
            Self {
                last_modified: Ok(last_modified.map(str::to_string)),
                body: Ok(body.to_vec()),
                ..Default::default()
            }
        }

        pub fn failing_fetch(last_modified: Option<&str>, reason: &str) -> Self {
            Self {
                last_modified: Ok(last_modified.map(str::to_string)),
                body: Err(reason.to_string()),
                ..Default::default()
            }
        }

        pub fn failing_probe(reason: &str, body: &[u8]) -> Self {
            Self {
                last_modified: Err(reason.to_string()),
                body: Ok(body.to_vec()),
                ..Default::default()
            }
        }
    }

    impl Transport for FakeTransport {
        async fn last_modified(&self, _url: &str) -> Result<Option<String>, Box<dyn Error>> {
            self.probes.set(self.probes.get() + 1);
            self.last_modified.clone().map_err(Into::into)
        }

        async fn fetch(&self, url: &str) -> Result<Vec<u8>, Box<dyn Error>> {
            self.fetches.set(self.fetches.get() + 1);
            self.fetched_urls.borrow_mut().push(url.to_string());
            self.body.clone().map_err(Into::into)
        }
    }
}
