use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use frontierwatch_common::{CanonicalIncident, Config, FileConfig, FrontierError, RawRecord};
use tracing::{error, info, warn};

use crate::notifier::{NoopNotifier, Notifier, ReportSummary, TelegramNotifier};
use crate::pipeline::{classify_all, geocode_incidents, normalize, Geocoder, NominatimGeocoder, RuleSet, RunStats};
use crate::render::Renderer;
use crate::sources::{IncidentSource, NewsSource, RssSource, SocialSource};
use crate::store;

/// Runs one pass of the pipeline: collect, normalize, classify, geocode,
/// persist, render, notify. Stages run one after another.
pub struct Scout {
    sources: Vec<Box<dyn IncidentSource>>,
    rules: RuleSet,
    geocoder: Option<Box<dyn Geocoder>>,
    geocode_limit: usize,
    renderer: Renderer,
    notifier: Box<dyn Notifier>,
    data_dir: PathBuf,
}

impl Scout {
    /// A scout with no sources, no geocoder and no notifier.
    pub fn new(file: &FileConfig) -> Self {
        Self {
            sources: Vec::new(),
            rules: RuleSet::from_config(&file.keywords),
            geocoder: None,
            geocode_limit: file.geocoder.limit,
            renderer: Renderer::from_config(&file.output),
            notifier: Box::new(NoopNotifier),
            data_dir: file.output.data_dir.clone(),
        }
    }

    /// Wire up every adapter the configuration allows. A missing credential
    /// disables only the adapter that needs it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let file = &config.file;
        let secrets = &config.secrets;
        let mut scout = Self::new(file);

        match &secrets.newsapi_key {
            Some(key) => scout = scout.with_source(NewsSource::new(key.clone(), &file.sources)?),
            None => warn!("NEWSAPI_KEY not set, skipping news search"),
        }

        if file.sources.rss_feeds.is_empty() {
            warn!("No RSS feeds configured");
        } else {
            scout = scout.with_source(RssSource::new(&file.sources)?);
        }

        match &secrets.twitter_bearer {
            Some(bearer) => {
                scout = scout.with_source(SocialSource::new(bearer.clone(), &file.sources)?)
            }
            None => warn!("TWITTER_BEARER not set, skipping social search"),
        }

        if file.geocoder.enabled {
            scout = scout.with_geocoder(NominatimGeocoder::new(&file.geocoder)?);
        } else {
            info!("Geocoding disabled");
        }

        match secrets.telegram() {
            Some((token, chat_id)) => {
                scout = scout.with_notifier(TelegramNotifier::new(
                    token.to_string(),
                    chat_id.to_string(),
                )?)
            }
            None => warn!("TELEGRAM_TOKEN or TELEGRAM_CHAT_ID not set, skipping notifications"),
        }

        info!(sources = scout.sources.len(), "Scout configured");
        Ok(scout)
    }

    pub fn with_source(mut self, source: impl IncidentSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Box::new(geocoder));
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Fetch from every source in turn. A failing source contributes nothing.
    pub async fn collect(&self, stats: &mut RunStats) -> Vec<RawRecord> {
        let mut records = Vec::new();
        for source in &self.sources {
            let batch = source.fetch().await;
            stats
                .by_source
                .insert(source.name().to_string(), batch.len());
            records.extend(batch);
        }
        stats.collected = records.len();
        records
    }

    /// Normalize, deduplicate and classify. Pure over its input.
    pub fn process(&self, records: Vec<RawRecord>) -> Vec<CanonicalIncident> {
        classify_all(normalize(records), &self.rules)
    }

    /// Collect only, and keep the raw records for inspection.
    pub async fn scrape(&self) -> RunStats {
        let mut stats = RunStats::default();
        let records = self.collect(&mut stats).await;

        if records.is_empty() {
            info!("Nothing collected, raw table not written");
            return stats;
        }

        let path = self.data_dir.join(store::RAW_SCRAPE_FILE);
        match store::write_raw(&path, &records) {
            Ok(()) => stats.artifacts.push(path),
            Err(e) => output_failed(e, "Raw table not written"),
        }
        stats
    }

    /// The full pipeline. Only configuration problems are fatal, and those
    /// surface before a scout exists; every stage failure here is contained.
    pub async fn run(&self) -> RunStats {
        let mut stats = RunStats::default();

        let records = self.collect(&mut stats).await;
        let incidents = self.process(records);
        stats.unique = incidents.len();
        stats.duplicates_dropped = stats.collected - stats.unique;

        let incidents = match &self.geocoder {
            Some(geocoder) => {
                geocode_incidents(geocoder.as_ref(), incidents, self.geocode_limit).await
            }
            None => incidents,
        };
        stats.tally(&incidents);

        let table = self.data_dir.join(store::INCIDENTS_FILE);
        match store::write_incidents(&table, &incidents) {
            Ok(()) => stats.artifacts.push(table),
            Err(e) => output_failed(e, "Incident table not written"),
        }

        let artifacts = self.renderer.render(&incidents);
        stats.artifacts.extend(artifacts.paths().cloned());

        let summary = ReportSummary::from_incidents(&incidents, Utc::now());
        stats.notification = Some(self.notifier.report(&summary, &artifacts).await);

        stats
    }
}

fn output_failed(e: anyhow::Error, what: &str) {
    let err = FrontierError::Output(format!("{e:#}"));
    error!(error = %err, "{what}");
}
