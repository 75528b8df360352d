//! Client for the itjobs.pt listings API.
//!
//! # Architecture
//!
//! - [`JobListings`]: the three query operations the commands depend on
//! - [`ItJobsClient`]: the HTTP implementation over `reqwest`
//! - [`ListingQuery`]: the optional `limit` / `page` / `offset` / `q` parameters
//!
//! Responses are loosely typed JSON. [`records_from_payload`] accepts the
//! shapes the API is known to return and keeps only object records.
//!
//! Any failure here is fatal to the calling command: there is no other source
//! of listings data, and no retry is attempted.

use crate::config::ListingsConfig;
use crate::error::{AppError, Result};
use crate::models::RawRecord;
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Query parameters shared by the `list` and `search` operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub offset: Option<usize>,
}

impl ListingQuery {
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// The listings operations used by the commands.
///
/// Implemented over HTTP by [`ItJobsClient`] and by in-memory fakes in tests.
pub trait JobListings {
    /// Most recent postings.
    async fn list(&self, query: &ListingQuery) -> Result<Vec<RawRecord>>;

    /// One posting by id.
    async fn get(&self, id: u64) -> Result<RawRecord>;

    /// Full-text search.
    async fn search(&self, query: &ListingQuery) -> Result<Vec<RawRecord>>;
}

/// HTTP client for `api.itjobs.pt`.
pub struct ItJobsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for ItJobsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItJobsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ItJobsClient {
    /// Build a client from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, timeout, user agent and API key
    ///
    /// # Returns
    ///
    /// A client sending `Accept: application/json` and the API key on every
    /// request.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingApiKey`] before any network activity when no usable
    /// credential is configured.
    pub fn new(config: &ListingsConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|source| AppError::Upstream {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    #[instrument(level = "info", skip(self, params))]
    async fn get_json(&self, path: &str, params: Vec<(&'static str, String)>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let t0 = Instant::now();

        let mut params = params;
        params.push(("api_key", self.api_key.clone()));

        let upstream = |source| AppError::Upstream {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, status = status.as_u16(), "Listings API returned an error status");
            return Err(AppError::UpstreamStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(upstream)?;
        info!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Listings API responded"
        );
        serde_json::from_str(&body).map_err(|e| {
            AppError::UnexpectedPayload(format!("{e}: {}", truncate_for_log(&body, 200)))
        })
    }
}

impl JobListings for ItJobsClient {
    async fn list(&self, query: &ListingQuery) -> Result<Vec<RawRecord>> {
        let payload = self.get_json("/job/list.json", query.pairs()).await?;
        Ok(records_from_payload(payload))
    }

    async fn get(&self, id: u64) -> Result<RawRecord> {
        let payload = self
            .get_json("/job/get.json", vec![("id", id.to_string())])
            .await?;
        match payload {
            Value::Object(record) => Ok(record),
            other => Err(AppError::UnexpectedPayload(format!(
                "job {id} is not an object: {}",
                truncate_for_log(&other.to_string(), 200)
            ))),
        }
    }

    async fn search(&self, query: &ListingQuery) -> Result<Vec<RawRecord>> {
        let payload = self.get_json("/job/search.json", query.pairs()).await?;
        Ok(records_from_payload(payload))
    }
}

/// Pull the record list out of a listings response.
///
/// Accepts `{"results": [...]}`, a bare array, and the doubly nested
/// `{"results": {"results": [...]}}`. Non-object elements are dropped.
pub fn records_from_payload(payload: Value) -> Vec<RawRecord> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut outer) => match outer.remove("results") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut inner)) => match inner.remove("results") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    if records.len() != total {
        debug!(total, kept = records.len(), "Dropped non-object records");
    }
    records
}
