//! Quote-snapshot sources.
//!
//! A [`SnapshotSource`] answers with the raw label/value table of a quote
//! page. Whether a failure is worth retrying is decided by the fetcher, not
//! here.

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use reqwest::{Client, StatusCode};

use crate::providers::errors::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://finviz.com/quote.ashx";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one snapshot request that reached the source.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotResponse {
    /// Raw display labels mapped to display values, in page order.
    Table(IndexMap<String, String>),
    /// The source does not know the ticker.
    NotFound,
    /// Any other non-success answer.
    Unavailable { status: u16 },
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Performs a single request. `Err` is a transport-level failure.
    async fn fetch_snapshot(&self, ticker: &str) -> Result<SnapshotResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct FinvizOptions {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for FinvizOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Scrapes the `snapshot-table2` table of a finviz quote page.
pub struct FinvizSource {
    client: Client,
    base_url: String,
    parser: SnapshotTableParser,
}

impl FinvizSource {
    pub fn new(options: FinvizOptions) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.request_timeout)
            .build()?;
        let parser = SnapshotTableParser::new()
            .map_err(|e| ProviderError::Internal(format!("snapshot parser: {e}")))?;

        Ok(Self {
            client,
            base_url: options.base_url,
            parser,
        })
    }
}

#[async_trait]
impl SnapshotSource for FinvizSource {
    async fn fetch_snapshot(&self, ticker: &str) -> Result<SnapshotResponse, ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("t", ticker)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(classify_status(status));
        }

        let body = response.text().await?;
        Ok(SnapshotResponse::Table(self.parser.parse(&body)))
    }
}

/// Maps a non-success HTTP status onto a snapshot outcome.
pub fn classify_status(status: StatusCode) -> SnapshotResponse {
    if status == StatusCode::NOT_FOUND {
        SnapshotResponse::NotFound
    } else {
        SnapshotResponse::Unavailable {
            status: status.as_u16(),
        }
    }
}

/// Pulls the cells of the snapshot table out of a quote page and pairs them
/// up as label, value, label, value...
pub struct SnapshotTableParser {
    table: Regex,
    cell: Regex,
    tag: Regex,
}

impl SnapshotTableParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            table: Regex::new(
                r#"(?is)<table[^>]*class="[^"]*\bsnapshot-table2\b[^"]*"[^>]*>(.*?)</table>"#,
            )?,
            cell: Regex::new(r"(?is)<td[^>]*>(.*?)</td>")?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
        })
    }

    /// Returns an empty table when the page has no snapshot table.
    pub fn parse(&self, html: &str) -> IndexMap<String, String> {
        let Some(body) = self.table.captures(html).and_then(|c| c.get(1)) else {
            return IndexMap::new();
        };

        let cells: Vec<String> = self
            .cell
            .captures_iter(body.as_str())
            .filter_map(|c| c.get(1))
            .map(|m| decode_entities(self.tag.replace_all(m.as_str(), "").trim()))
            .collect();

        cells
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}
