pub mod error;
pub mod types;

pub use error::{Result, XError};
pub use types::{PublicMetrics, RecentSearch, SearchMeta, SearchResponse, Tweet};

use std::time::Duration;

use chrono::SecondsFormat;

const BASE_URL: &str = "https://api.twitter.com/2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const TWEET_FIELDS: &str = "created_at,author_id,public_metrics";

pub struct XClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

impl XClient {
    pub fn new(bearer_token: String) -> Result<Self> {
        Self::with_base_url(bearer_token, BASE_URL)
    }

    pub fn with_base_url(bearer_token: String, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            bearer_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search tweets from the last seven days. Returns a single page.
    pub async fn search_recent(&self, search: &RecentSearch) -> Result<Vec<Tweet>> {
        if search.start_time >= search.end_time {
            return Err(XError::InvalidWindow(format!(
                "start {} is not before end {}",
                search.start_time, search.end_time
            )));
        }

        let url = format!("{}/tweets/search/recent", self.base_url);
        let params = [
            ("query", search.query.clone()),
            ("max_results", search.max_results.clamp(10, 100).to_string()),
            (
                "start_time",
                search.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "end_time",
                search.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("tweet.fields", TWEET_FIELDS.to_string()),
        ];

        tracing::info!(max_results = search.max_results, "X recent search");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(XError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        tracing::info!(count = parsed.meta.result_count, "Fetched tweets");
        Ok(parsed.data)
    }
}
