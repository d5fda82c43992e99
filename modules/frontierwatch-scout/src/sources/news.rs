use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use frontierwatch_common::config::SourcesConfig;
use frontierwatch_common::{RawRecord, Region};
use newsapi_client::{Article, EverythingQuery, NewsApiClient};

use super::{mentions_region, window_start, IncidentSource};

/// NewsAPI `everything` search over the last `hours_back` hours, kept only
/// when an article names a watched region.
pub struct NewsSource {
    client: NewsApiClient,
    query: String,
    hours_back: i64,
    max_records: usize,
}

impl NewsSource {
    pub fn new(api_key: String, sources: &SourcesConfig) -> Result<Self> {
        let client = NewsApiClient::new(api_key).context("Failed to build NewsAPI client")?;
        Ok(Self::with_client(client, sources))
    }

    pub fn with_client(client: NewsApiClient, sources: &SourcesConfig) -> Self {
        Self {
            client,
            query: sources.search_query.clone(),
            hours_back: sources.hours_back,
            max_records: sources.max_records,
        }
    }
}

/// Map one article onto a raw record, or drop it when it names no watched region.
pub fn article_to_record(article: Article) -> Option<RawRecord> {
    let haystack = format!(
        "{} {}",
        article.title.as_deref().unwrap_or_default(),
        article.description.as_deref().unwrap_or_default()
    );
    if !mentions_region(&haystack) {
        return None;
    }

    let mut record = RawRecord::default()
        .with_source("NewsAPI")
        .with_region(Region::detect(&haystack));
    if let Some(publisher) = article.source_name() {
        record = record.with_extra("publisher", publisher);
    }
    if let Some(author) = article.author.filter(|a| !a.is_empty()) {
        record = record.with_extra("author", author);
    }
    record.title = article.title;
    record.description = article.description;
    record.url = article.url;
    record.published = article.published_at;
    Some(record)
}

#[async_trait]
impl IncidentSource for NewsSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn try_fetch(&self) -> Result<Vec<RawRecord>> {
        let to = Utc::now();
        let query = EverythingQuery {
            q: self.query.clone(),
            from: window_start(to, self.hours_back)?,
            to,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: self.max_records.clamp(1, 100) as u32,
        };
        let articles = self.client.everything(&query).await?;
        let fetched = articles.len();

        let records: Vec<RawRecord> = articles
            .into_iter()
            .filter_map(article_to_record)
            .take(self.max_records)
            .collect();

        tracing::debug!(fetched, kept = records.len(), "NewsAPI region filter applied");
        Ok(records)
    }
}
