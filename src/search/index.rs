use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::PostRecord;
use crate::query::QueryError;

/// File name of the generated index, relative to the site root
pub const INDEX_FILE_NAME: &str = "search.json";

/// User agent sent with index requests
const USER_AGENT: &str = concat!("postsearch/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to fetch index: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Index request failed: HTTP {0}")]
    Http(u16),
    #[error("Index is not a list of posts: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to read index file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid keyword pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Where the post index comes from
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Load every post of the index, in index order
    async fn fetch_posts(&self) -> Result<Vec<PostRecord>, SearchError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Fetches `<site-base>/search.json` over HTTP
pub struct HttpIndexSource {
    client: Client,
    endpoint: reqwest::Url,
}

impl HttpIndexSource {
    /// Build a source for the given site base; no timeout unless one is passed
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, SearchError> {
        let endpoint = index_endpoint(base_url)?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

/// Resolve the index URL for a site base such as `https://example.org/blog`
pub fn index_endpoint(base_url: &str) -> Result<reqwest::Url, SearchError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), INDEX_FILE_NAME);
    let parsed = reqwest::Url::parse(&url).map_err(|e| SearchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(SearchError::InvalidUrl(format!(
            "Unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    Ok(parsed)
}

#[async_trait]
impl IndexSource for HttpIndexSource {
    async fn fetch_posts(&self) -> Result<Vec<PostRecord>, SearchError> {
        log::info!("[IndexSource] Fetching {}", self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, "text/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Http(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Content type is only logged; static hosts label JSON inconsistently
        let body = response.bytes().await?;
        log::debug!(
            "[IndexSource] Received {} bytes (content-type: {:?})",
            body.len(),
            content_type
        );

        decode_posts(&body)
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}

/// Reads a generated `search.json` from disk
pub struct FileIndexSource {
    path: PathBuf,
}

impl FileIndexSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl IndexSource for FileIndexSource {
    async fn fetch_posts(&self) -> Result<Vec<PostRecord>, SearchError> {
        log::info!("[IndexSource] Reading {:?}", self.path);
        let body = tokio::fs::read(&self.path).await?;
        decode_posts(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse an index body into posts.
///
/// The body must be a JSON array. Entries that are not post objects are
/// skipped with a warning so one bad record cannot hide the rest.
pub fn decode_posts(body: &[u8]) -> Result<Vec<PostRecord>, SearchError> {
    let entries: Vec<Value> = serde_json::from_slice(body)?;

    let mut posts = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            log::warn!("[IndexSource] Skipping entry {}: not an object", position);
            continue;
        }
        match serde_json::from_value::<PostRecord>(entry) {
            Ok(post) => posts.push(post),
            Err(e) => log::warn!("[IndexSource] Skipping entry {}: {}", position, e),
        }
    }

    {
        let mut seen = HashSet::with_capacity(posts.len());
        for post in &posts {
            if !seen.insert(post.id.as_str()) {
                log::warn!("[IndexSource] Duplicate post id in index: {:?}", post.id);
            }
        }
    }

    log::info!("[IndexSource] Loaded {} posts", posts.len());
    Ok(posts)
}
