// Items endpoint HTTP client
//
// Wraps `reqwest::Client` with the single GET the item list needs,
// status checking, and strict body decoding. No retries, no caching:
// every call is exactly one outbound request.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ItemResponse;
use crate::transport::TransportConfig;

/// Endpoint serving the full item collection.
pub const DEFAULT_ENDPOINT: &str = "https://fetch-hiring.s3.amazonaws.com/hiring.json";

/// Path of the collection relative to a server root (see [`ItemsClient::from_reqwest`]).
const COLLECTION_PATH: &str = "hiring.json";

/// Raw HTTP client for the item list endpoint.
///
/// Stateless apart from the pooled `reqwest::Client`, so a single instance
/// can be shared (e.g. behind an `Arc`) across concurrent fetches.
#[derive(Debug, Clone)]
pub struct ItemsClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ItemsClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `endpoint` is the full URL of the JSON collection, e.g.
    /// [`DEFAULT_ENDPOINT`].
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, endpoint })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Create a client pointing at `{base}/hiring.json`.
    ///
    /// Handy for mock servers, which only hand out a root URI.
    pub fn from_reqwest(base: &str, http: reqwest::Client) -> Result<Self, Error> {
        let root = Url::parse(&format!("{}/", base.trim_end_matches('/')))?;
        let endpoint = root.join(COLLECTION_PATH)?;
        Ok(Self::with_client(http, endpoint))
    }

    /// The collection URL this client fetches.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full item collection.
    ///
    /// `GET {endpoint}` returning a JSON array. Items come back exactly as
    /// served: no deduplication, no name validation.
    pub async fn fetch_all(&self) -> Result<Vec<ItemResponse>, Error> {
        debug!("fetching item collection");
        let items: Vec<ItemResponse> = self.get(self.endpoint.clone()).await?;
        debug!(count = items.len(), "item collection fetched");
        Ok(items)
    }

    /// Look up a single item by id.
    ///
    /// The endpoint has no per-item route, so this fetches the whole
    /// collection and searches it. Returns `None` if no item matches.
    pub async fn find_item(&self, id: i64) -> Result<Option<ItemResponse>, Error> {
        debug!(id, "looking up item");
        let items = self.fetch_all().await?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the body as `T`.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Check the status code, then decode the body strictly.
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
