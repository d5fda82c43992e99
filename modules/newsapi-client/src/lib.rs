pub mod error;
pub mod types;

pub use error::{NewsApiError, Result};
pub use types::{Article, ArticleSource, ArticlesResponse, EverythingQuery};

use std::time::Duration;

const BASE_URL: &str = "https://newsapi.org/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the client at a different host (proxies, test servers).
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search every indexed article matching `query`.
    pub async fn everything(&self, query: &EverythingQuery) -> Result<Vec<Article>> {
        let url = format!("{}/everything", self.base_url);
        tracing::info!(page_size = query.page_size, "NewsAPI everything search");

        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NewsApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: ArticlesResponse = serde_json::from_str(&body)?;
        if parsed.status != "ok" {
            return Err(NewsApiError::Rejected {
                code: parsed.code.unwrap_or_else(|| "unknown".to_string()),
                message: parsed.message.unwrap_or_default(),
            });
        }

        tracing::info!(
            total = parsed.total_results,
            returned = parsed.articles.len(),
            "Fetched NewsAPI articles"
        );
        Ok(parsed.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = NewsApiClient::with_base_url("key".into(), "http://localhost:9000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }
}
