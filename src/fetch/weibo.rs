// HTTP client for the Weibo side-panel hot-search endpoint.
//
// The endpoint is public but rejects requests that don't look like a
// browser coming from the hot-search page, so both User-Agent and Referer
// are set. The response carries ads inline; they are dropped here.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use serde::Deserialize;
use tracing::debug;

use super::HotListSource;

/// Default hot-search endpoint.
pub const DEFAULT_HOT_API_URL: &str = "https://weibo.com/ajax/side/hotSearch";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const HOT_SEARCH_REFERER: &str = "https://weibo.com/hot/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotSearchResponse {
    #[serde(default)]
    pub data: HotSearchData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotSearchData {
    #[serde(default)]
    pub realtime: Vec<HotSearchItem>,
}

/// One entry of the realtime list.
#[derive(Debug, Clone, Deserialize)]
pub struct HotSearchItem {
    #[serde(default)]
    pub word: Option<String>,
    /// Ads are flagged with a number, a bool or a string depending on
    /// the day, so keep the raw value and test it for truthiness.
    #[serde(default)]
    pub is_ad: serde_json::Value,
}

impl HotSearchItem {
    pub fn is_ad(&self) -> bool {
        match &self.is_ad {
            serde_json::Value::Null => false,
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Array(a) => !a.is_empty(),
            serde_json::Value::Object(o) => !o.is_empty(),
        }
    }
}

/// Non-ad titles in list order, trimmed, empties dropped.
///
/// Line breaks inside a title would corrupt the line formats downstream,
/// so they are replaced with spaces.
pub fn titles_from_response(resp: &HotSearchResponse) -> Vec<String> {
    resp.data
        .realtime
        .iter()
        .filter(|item| !item.is_ad())
        .filter_map(|item| item.word.as_deref())
        .map(|w| w.replace(['\r', '\n'], " ").trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// The live Weibo hot-search list.
pub struct WeiboHotSearch {
    client: reqwest::Client,
    url: String,
}

impl WeiboHotSearch {
    pub fn new(url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(HOT_SEARCH_REFERER));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl HotListSource for WeiboHotSearch {
    async fn fetch_titles(&self) -> Result<Vec<String>> {
        debug!(url = %self.url, "Fetching hot-search list");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Hot-search request failed: {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Hot-search endpoint returned {status}: {body}");
        }

        let parsed: HotSearchResponse = response
            .json()
            .await
            .context("Failed to deserialize hot-search response")?;

        let titles = titles_from_response(&parsed);
        debug!(
            items = parsed.data.realtime.len(),
            titles = titles.len(),
            "Parsed hot-search list"
        );
        Ok(titles)
    }
}
