//! Source adapters. Each one turns an external feed into raw records.

pub mod news;
pub mod rss;
pub mod social;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use frontierwatch_common::{FrontierError, RawRecord};
use tracing::{info, warn};

pub use news::NewsSource;
pub use rss::RssSource;
pub use social::SocialSource;

/// True when the text names any Jammu & Kashmir or North East place.
pub fn mentions_region(text: &str) -> bool {
    let lower = text.to_lowercase();
    frontierwatch_common::JK_TERMS
        .iter()
        .chain(frontierwatch_common::NE_TERMS)
        .any(|term| lower.contains(term))
}

/// Start of the look-back window ending at `end`. Negative or out-of-range
/// `hours_back` values are rejected instead of wrapping or panicking.
pub fn window_start(end: DateTime<Utc>, hours_back: i64) -> Result<DateTime<Utc>> {
    if hours_back < 0 {
        return Err(anyhow!("hours_back must not be negative, got {hours_back}"));
    }
    Duration::try_hours(hours_back)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(|| anyhow!("hours_back out of range: {hours_back}"))
}

#[async_trait]
pub trait IncidentSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch records, surfacing every failure.
    async fn try_fetch(&self) -> Result<Vec<RawRecord>>;

    /// Fetch records. A failing source contributes nothing; the error is
    /// logged and the run carries on.
    async fn fetch(&self) -> Vec<RawRecord> {
        match self.try_fetch().await {
            Ok(records) => {
                info!(source = self.name(), count = records.len(), "Collected records");
                records
            }
            Err(e) => {
                let err = FrontierError::SourceUnavailable {
                    source_name: self.name().to_string(),
                    reason: format!("{e:#}"),
                };
                warn!(error = %err, "Source failed, continuing without it");
                Vec::new()
            }
        }
    }
}
