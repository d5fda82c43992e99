use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use frontierwatch_common::config::{FeedConfig, SourcesConfig};
use frontierwatch_common::RawRecord;
use tracing::{info, warn};

use super::{window_start, IncidentSource};

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// The configured RSS/Atom feeds, read one after another.
pub struct RssSource {
    client: reqwest::Client,
    feeds: Vec<FeedConfig>,
    hours_back: i64,
    max_records: usize,
}

impl RssSource {
    pub fn new(sources: &SourcesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .context("Failed to build RSS HTTP client")?;
        Ok(Self {
            client,
            feeds: sources.rss_feeds.clone(),
            hours_back: sources.hours_back,
            max_records: sources.max_records,
        })
    }

    async fn fetch_feed(&self, feed: &FeedConfig, cutoff: DateTime<Utc>) -> Result<Vec<RawRecord>> {
        let resp = self
            .client
            .get(&feed.url)
            .header(reqwest::header::USER_AGENT, "frontierwatch/0.1")
            .send()
            .await
            .context("RSS feed fetch failed")?
            .error_for_status()?;
        let bytes = resp.bytes().await.context("Failed to read RSS feed body")?;
        parse_feed_entries(&bytes, &feed.name, cutoff)
    }
}

/// "india_today" -> "India Today".
pub fn display_name(label: &str) -> String {
    label
        .split(['_', ' ', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parse an RSS/Atom document into raw records. Entries without a publish
/// date, or published before `cutoff`, are skipped.
pub fn parse_feed_entries(bytes: &[u8], label: &str, cutoff: DateTime<Utc>) -> Result<Vec<RawRecord>> {
    let feed = feed_rs::parser::parse(bytes).context("Failed to parse RSS/Atom feed")?;
    let source = display_name(label);

    let records = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let published = entry.published.or(entry.updated)?;
            if published < cutoff {
                return None;
            }
            let mut record = RawRecord::default()
                .with_source(source.clone())
                .with_published(published.to_rfc3339_opts(SecondsFormat::Secs, true));
            record.title = entry.title.map(|t| t.content);
            record.summary = entry.summary.map(|t| t.content);
            record.url = entry.links.first().map(|l| l.href.clone());
            Some(record)
        })
        .collect();

    Ok(records)
}

#[async_trait]
impl IncidentSource for RssSource {
    fn name(&self) -> &str {
        "RSS"
    }

    async fn try_fetch(&self) -> Result<Vec<RawRecord>> {
        let cutoff = window_start(Utc::now(), self.hours_back)?;
        let mut records = Vec::new();

        for feed in &self.feeds {
            match self.fetch_feed(feed, cutoff).await {
                Ok(entries) => {
                    info!(feed = feed.name.as_str(), entries = entries.len(), "Feed parsed");
                    records.extend(entries);
                }
                Err(e) => warn!(feed = feed.name.as_str(), error = %e, "Feed failed, skipping"),
            }
            if records.len() >= self.max_records {
                break;
            }
        }

        records.truncate(self.max_records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>National</title>
    <link>https://example.org</link>
    <description>Top stories</description>
    <item>
      <title>Encounter breaks out in Kupwara</title>
      <link>https://example.org/kupwara</link>
      <description>Security forces launched a cordon and search</description>
      <pubDate>Tue, 02 Jan 2024 15:30:00 +0530</pubDate>
    </item>
    <item>
      <title>Old news from Imphal</title>
      <link>https://example.org/imphal</link>
      <pubDate>Sun, 31 Dec 2023 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Undated brief</title>
      <link>https://example.org/undated</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn recent_dated_entries_only() {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap();
        let records = parse_feed_entries(SAMPLE.as_bytes(), "india_today", cutoff).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title.as_deref(), Some("Encounter breaks out in Kupwara"));
        assert_eq!(
            r.summary.as_deref(),
            Some("Security forces launched a cordon and search")
        );
        assert_eq!(r.url.as_deref(), Some("https://example.org/kupwara"));
        assert_eq!(r.published.as_deref(), Some("2024-01-02T10:00:00Z"));
        assert_eq!(r.source.as_deref(), Some("India Today"));
    }

    #[test]
    fn garbage_is_an_error() {
        let cutoff = Utc::now();
        assert!(parse_feed_entries(b"not xml at all", "hindu", cutoff).is_err());
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(display_name("hindu"), "Hindu");
        assert_eq!(display_name("business_standard"), "Business Standard");
        assert_eq!(display_name("TOI"), "Toi");
    }
}
