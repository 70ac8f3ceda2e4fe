//! Fetching the upstream status page.

use std::future::Future;

use fuper_common::Snapshot;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::SourceConfig;
use crate::parser::parse_status_page;

/// Error type for fetch operations.
///
/// Only transport problems are errors; a page that parses badly still
/// yields a (partly zero) snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to status page failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Status page {url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Something that can produce a fresh snapshot.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}

/// Fetches and parses the status page over plain HTTP.
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    /// Create a source for the configured status page.
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.text().await?;
        debug!(url = %self.url, bytes = body.len(), "Fetched status page");

        Ok(parse_status_page(&body))
    }
}
