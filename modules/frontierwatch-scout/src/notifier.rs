use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use frontierwatch_common::{CanonicalIncident, FrontierError, IncidentType, Region};
use telegram_client::TelegramClient;
use tracing::{info, warn};

use crate::render::RenderedArtifacts;

const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;
const LATEST_TITLES: usize = 5;
const HASHTAGS: &str = "#FrontierWatch #JammuKashmir #NorthEast #SecurityUpdate";

/// Outcome of one notification attempt. Never an error: delivery problems are
/// reported here and the run carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered { documents: usize },
    Failed(String),
    Skipped,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Delivered { documents } => {
                write!(f, "delivered ({documents} documents)")
            }
            DeliveryStatus::Failed(reason) => write!(f, "failed: {reason}"),
            DeliveryStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// What the report message says about a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub by_type: BTreeMap<IncidentType, usize>,
    pub by_region: BTreeMap<Region, usize>,
    pub latest: Vec<String>,
}

impl ReportSummary {
    pub fn from_incidents(incidents: &[CanonicalIncident], generated_at: DateTime<Utc>) -> Self {
        let mut by_type = BTreeMap::new();
        let mut by_region = BTreeMap::new();
        for incident in incidents {
            *by_type.entry(incident.incident_type).or_insert(0) += 1;
            *by_region.entry(incident.region).or_insert(0) += 1;
        }
        Self {
            generated_at,
            count: incidents.len(),
            by_type,
            by_region,
            latest: incidents
                .iter()
                .take(LATEST_TITLES)
                .map(|i| i.title_or_content().to_string())
                .collect(),
        }
    }
}

fn format_ist(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => format!("{} IST", at.with_timezone(&ist).format("%Y-%m-%d %H:%M")),
        None => format!("{} UTC", at.format("%Y-%m-%d %H:%M")),
    }
}

/// Plain-text report: header, IST timestamp, count, covered regions, per-type
/// breakdown, latest headlines and hashtags.
pub fn build_report_message(summary: &ReportSummary) -> String {
    let mut lines = vec![
        "FrontierWatch Security Report".to_string(),
        format!("Time: {}", format_ist(summary.generated_at)),
        format!("Incidents: {}", summary.count),
    ];

    let regions: Vec<&str> = Region::ALL
        .iter()
        .filter(|r| **r != Region::Other && summary.by_region.contains_key(*r))
        .map(|r| r.as_str())
        .collect();
    if regions.is_empty() {
        lines.push("Regions: none".to_string());
    } else {
        lines.push(format!("Regions: {}", regions.join(", ")));
    }

    if summary.count > 0 {
        lines.push(String::new());
        lines.push("By type:".to_string());
        for kind in IncidentType::ALL {
            if let Some(n) = summary.by_type.get(&kind) {
                lines.push(format!("- {kind}: {n}"));
            }
        }
    }

    if !summary.latest.is_empty() {
        lines.push(String::new());
        lines.push("Latest:".to_string());
        for (idx, title) in summary.latest.iter().enumerate() {
            lines.push(format!("{}. {title}", idx + 1));
        }
    }

    lines.push(String::new());
    lines.push(HASHTAGS.to_string());
    lines.join("\n")
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn report(&self, summary: &ReportSummary, artifacts: &RenderedArtifacts) -> DeliveryStatus;
}

/// Notifier used when no bot is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn report(&self, _summary: &ReportSummary, _artifacts: &RenderedArtifacts) -> DeliveryStatus {
        info!("Notifier not configured, skipping report");
        DeliveryStatus::Skipped
    }
}

/// Telegram bot: one text message, then each artifact as a document.
pub struct TelegramNotifier {
    client: TelegramClient,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Result<Self> {
        let client = TelegramClient::new(token).context("Failed to build Telegram client")?;
        Ok(Self::with_client(client, chat_id))
    }

    pub fn with_client(client: TelegramClient, chat_id: String) -> Self {
        Self { client, chat_id }
    }

    async fn send_artifact(&self, path: &Path, caption: &str) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        self.client
            .send_document(&self.chat_id, &file_name, bytes, Some(caption))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn report(&self, summary: &ReportSummary, artifacts: &RenderedArtifacts) -> DeliveryStatus {
        let text = build_report_message(summary);
        if let Err(e) = self.client.send_message(&self.chat_id, &text).await {
            let err = FrontierError::DeliveryFailure(e.to_string());
            warn!(error = %err, "Report message not delivered");
            return DeliveryStatus::Failed(e.to_string());
        }

        let caption = format!("FrontierWatch: {} incidents", summary.count);
        let mut documents = 0;
        for path in artifacts.paths() {
            match self.send_artifact(path, &caption).await {
                Ok(()) => documents += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Artifact not delivered"),
            }
        }

        info!(documents, "Report delivered");
        DeliveryStatus::Delivered { documents }
    }
}
