use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters for the `/v2/everything` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EverythingQuery {
    pub q: String,
    #[serde(serialize_with = "serialize_utc_seconds")]
    pub from: DateTime<Utc>,
    #[serde(serialize_with = "serialize_utc_seconds")]
    pub to: DateTime<Utc>,
    pub language: String,
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

fn serialize_utc_seconds<S: serde::Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Envelope returned by every NewsAPI endpoint. Errors come back as
/// `status: "error"` with `code` and `message` set.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesResponse {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Publisher reference nested inside an Article.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A single article from the `everything` result set.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    /// Kept as text; publishers occasionally send values that are not RFC 3339.
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl Article {
    /// Publisher display name, if the article carried one.
    pub fn source_name(&self) -> Option<&str> {
        self.source.name.as_deref()
    }
}
