use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Parameters for `GET /2/tweets/search/recent`.
#[derive(Debug, Clone)]
pub struct RecentSearch {
    pub query: String,
    /// 10..=100 per the API.
    pub max_results: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Engagement counters requested through `tweet.fields=public_metrics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: i64,
    #[serde(default)]
    pub reply_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub quote_count: i64,
}

/// A single tweet from the search response.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub created_at: Option<String>,
    pub author_id: Option<String>,
    pub public_metrics: Option<PublicMetrics>,
}

impl Tweet {
    pub fn like_count(&self) -> i64 {
        self.public_metrics.as_ref().map(|m| m.like_count).unwrap_or(0)
    }

    pub fn retweet_count(&self) -> i64 {
        self.public_metrics
            .as_ref()
            .map(|m| m.retweet_count)
            .unwrap_or(0)
    }

    pub fn url(&self) -> String {
        format!("https://x.com/i/web/status/{}", self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub result_count: u32,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
    pub next_token: Option<String>,
}

/// Search envelope. `data` is omitted entirely when nothing matched.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub meta: SearchMeta,
}
