use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use frontierwatch_common::config::SourcesConfig;
use frontierwatch_common::RawRecord;
use x_client::{RecentSearch, Tweet, XClient};

use super::{window_start, IncidentSource};

/// Appended to the shared query; retweets only repeat what is already collected.
const QUERY_FILTERS: &str = "-is:retweet lang:en";

/// The API rejects an `end_time` too close to now.
const END_TIME_LAG_SECS: i64 = 30;

pub struct SocialSource {
    client: XClient,
    query: String,
    hours_back: i64,
    max_records: usize,
}

impl SocialSource {
    pub fn new(bearer_token: String, sources: &SourcesConfig) -> Result<Self> {
        let client = XClient::new(bearer_token).context("Failed to build X client")?;
        Ok(Self::with_client(client, sources))
    }

    pub fn with_client(client: XClient, sources: &SourcesConfig) -> Self {
        Self {
            client,
            query: format!("{} {QUERY_FILTERS}", sources.search_query),
            hours_back: sources.hours_back,
            max_records: sources.max_records,
        }
    }
}

pub fn tweet_to_record(tweet: Tweet) -> RawRecord {
    let mut record = RawRecord::default()
        .with_source("Twitter")
        .with_url(tweet.url())
        .with_extra("likes", tweet.like_count())
        .with_extra("retweets", tweet.retweet_count());
    if let Some(author) = tweet.author_id {
        record = record.with_extra("author_id", author);
    }
    record.text = Some(tweet.text);
    record.published = tweet.created_at;
    record
}

#[async_trait]
impl IncidentSource for SocialSource {
    fn name(&self) -> &str {
        "Twitter"
    }

    async fn try_fetch(&self) -> Result<Vec<RawRecord>> {
        let end_time = Utc::now() - Duration::seconds(END_TIME_LAG_SECS);
        let search = RecentSearch {
            query: self.query.clone(),
            max_results: self.max_records.clamp(10, 100) as u32,
            start_time: window_start(end_time, self.hours_back)?,
            end_time,
        };
        let tweets = self.client.search_recent(&search).await?;
        Ok(tweets
            .into_iter()
            .take(self.max_records)
            .map(tweet_to_record)
            .collect())
    }
}
