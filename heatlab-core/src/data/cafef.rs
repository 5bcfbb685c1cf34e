//! CafeF price-history provider.
//!
//! Fetches the most recent daily bars for a Vietnamese ticker from CafeF's
//! paged price-history endpoint. Records come back with Vietnamese field
//! names (`Ngay`, `GiaDongCua`, ...) and day-first dates; turning them into a
//! canonical series is the normalizer's job, this module only transports.
//!
//! There are no retries. Each request carries a fixed timeout and its expiry
//! is reported as [`DataError::Timeout`].

use super::provider::{DataError, HistorySource, RawRecord};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://cafef.vn";
pub const DATA_SOURCE_ID: &str = "CAFEF_HISTORY";

/// `{"Data": {"Data": [ ...records... ], "TotalCount": n}, "Success": true}`
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(rename = "Data")]
    data: Option<HistoryPage>,
}

#[derive(Debug, Deserialize)]
struct HistoryPage {
    #[serde(rename = "Data")]
    data: Option<Vec<Value>>,
}

/// CafeF history provider.
pub struct CafefProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Duration,
}

impl CafefProvider {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Point the provider at another host (mirrors, local test servers).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Build the history URL for a symbol and page size. Query values are
    /// form-encoded.
    fn history_url(&self, symbol: &str, count: usize) -> Result<Url, DataError> {
        let endpoint = format!(
            "{}/du-lieu/Ajax/PageNew/DataHistory/PriceHistory.ashx",
            self.base_url
        );
        let page_size = count.to_string();
        Url::parse_with_params(
            &endpoint,
            [
                ("Symbol", symbol),
                ("PageIndex", "1"),
                ("PageSize", page_size.as_str()),
            ],
        )
        .map_err(|e| DataError::Other(format!("invalid history URL {endpoint}: {e}")))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::Timeout { timeout: self.timeout }
        } else {
            DataError::NetworkUnreachable(e.to_string())
        }
    }

    /// Pull the nested record array out of the response body.
    fn parse_response(resp: HistoryResponse) -> Result<Vec<RawRecord>, DataError> {
        let rows = resp
            .data
            .and_then(|page| page.data)
            .ok_or_else(|| DataError::ResponseFormatChanged("missing Data.Data array".into()))?;

        rows.into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Object(record) => Ok(record),
                other => Err(DataError::ResponseFormatChanged(format!(
                    "record {i} is not an object: {other}"
                ))),
            })
            .collect()
    }
}

impl HistorySource for CafefProvider {
    fn name(&self) -> &str {
        DATA_SOURCE_ID
    }

    fn fetch(&self, symbol: &str, count: usize) -> Result<Vec<RawRecord>, DataError> {
        let url = self.history_url(symbol, count)?;
        debug!(%symbol, count, "fetching history");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: HistoryResponse = resp.json().map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(e)
            } else {
                DataError::ResponseFormatChanged(format!("failed to parse response: {e}"))
            }
        })?;

        let records = Self::parse_response(body)?;
        debug!(%symbol, rows = records.len(), "history received");
        Ok(records)
    }
}
