//! End-to-end pipeline runs against mock sources, geocoder and notifier.
//!
//! Everything is written under a temp dir; no network access.

use std::path::Path;

use chrono::{TimeZone, Utc};
use frontierwatch_common::{FileConfig, IncidentType, Published, RawRecord, Region};
use frontierwatch_scout::notifier::DeliveryStatus;
use frontierwatch_scout::pipeline::RunStats;
use frontierwatch_scout::render::charts::{REGION_CHART, SOURCE_CHART, TYPE_CHART};
use frontierwatch_scout::render::MAP_FILE;
use frontierwatch_scout::scout::Scout;
use frontierwatch_scout::store::{read_incidents, INCIDENTS_FILE, RAW_SCRAPE_FILE};
use frontierwatch_scout::testing::{MockGeocoder, MockSource, RecordingNotifier, IMPHAL, SRINAGAR};

fn config_in(dir: &Path) -> FileConfig {
    let mut config = FileConfig::default();
    config.output.data_dir = dir.join("data");
    config.output.maps_dir = dir.join("maps");
    config.output.charts_dir = dir.join("charts");
    config
}

fn gunfight(published: &str, source: &str) -> RawRecord {
    RawRecord::default()
        .with_title("Gunfight in Srinagar")
        .with_published(published)
        .with_source(source)
}

#[tokio::test]
async fn duplicate_reports_collapse_to_the_latest() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let scout = Scout::new(&config)
        .with_source(MockSource::new("NewsAPI").with_record(gunfight("2024-01-01T10:00:00Z", "NewsAPI")))
        .with_source(MockSource::new("RSS").with_record(gunfight("2024-01-02T10:00:00Z", "Hindu")));

    let mut stats = RunStats::default();
    let incidents = scout.process(scout.collect(&mut stats).await);

    assert_eq!(incidents.len(), 1);
    let incident = &incidents[0];
    assert_eq!(
        incident.published,
        Published::At(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap())
    );
    assert_eq!(incident.source.as_deref(), Some("Hindu"));
    assert_eq!(incident.region, Region::JammuKashmir);
    assert_eq!(incident.incident_type, IncidentType::Encounter);
}

#[tokio::test]
async fn full_run_writes_table_map_charts_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let notifier = std::sync::Arc::new(RecordingNotifier::new());

    let scout = Scout::new(&config)
        .with_source(MockSource::new("NewsAPI").with_records([
            gunfight("2024-01-01T10:00:00Z", "NewsAPI"),
            RawRecord::default()
                .with_title("IED defused near Imphal, Manipur")
                .with_published("2024-01-02T08:00:00Z")
                .with_source("NewsAPI"),
        ]))
        .with_source(MockSource::new("RSS").with_record(gunfight("2024-01-02T10:00:00Z", "Hindu")))
        .with_source(MockSource::failing("Twitter", "401 Unauthorized"))
        .with_geocoder(
            MockGeocoder::new()
                .on_place("Srinagar", SRINAGAR)
                .on_place("Imphal", IMPHAL),
        )
        .with_notifier(SharedNotifier(notifier.clone()));

    let stats = scout.run().await;

    assert_eq!(stats.collected, 3);
    assert_eq!(stats.unique, 2);
    assert_eq!(stats.duplicates_dropped, 1);
    assert_eq!(stats.by_source.get("Twitter"), Some(&0));
    assert_eq!(stats.geocoded, 2);
    assert_eq!(stats.by_type.get(&IncidentType::Encounter), Some(&1));
    assert_eq!(stats.by_type.get(&IncidentType::Attack), Some(&1));

    let rows = read_incidents(&dir.path().join("data").join(INCIDENTS_FILE)).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title.as_deref(), Some("Gunfight in Srinagar"));
    assert_eq!(rows[0].published, "2024-01-02T10:00:00Z");
    assert_eq!(rows[0].location.as_deref(), Some("Srinagar"));
    assert_eq!(rows[1].region, "North East");

    assert!(dir.path().join("maps").join(MAP_FILE).exists());
    for chart in [REGION_CHART, TYPE_CHART, SOURCE_CHART] {
        assert!(dir.path().join("charts").join(chart).exists());
    }

    let reports = notifier.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0.count, 2);
    assert_eq!(reports[0].1.paths().count(), 4);
    assert_eq!(
        stats.notification,
        Some(DeliveryStatus::Delivered { documents: 4 })
    );
}

#[tokio::test]
async fn empty_run_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let scout = Scout::new(&config_in(dir.path()))
        .with_source(MockSource::failing("NewsAPI", "connection refused"))
        .with_notifier(RecordingNotifier::new());

    let stats = scout.run().await;

    assert_eq!(stats.collected, 0);
    assert_eq!(stats.unique, 0);
    assert!(!dir.path().join("maps").exists());
    assert!(!dir.path().join("charts").exists());
    assert_eq!(
        stats.notification,
        Some(DeliveryStatus::Delivered { documents: 0 })
    );
}

#[tokio::test]
async fn geocoding_respects_limit_and_survives_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.geocoder.limit = 2;

    let geocoder = std::sync::Arc::new(
        MockGeocoder::new()
            .on_place("Imphal", IMPHAL)
            .failing_on("Srinagar"),
    );
    let scout = Scout::new(&config)
        .with_source(MockSource::new("RSS").with_records([
            gunfight("2024-01-03T00:00:00Z", "Hindu"),
            RawRecord::default()
                .with_title("Blast in Imphal")
                .with_published("2024-01-02T00:00:00Z"),
            RawRecord::default()
                .with_title("Ambush near Kohima")
                .with_published("2024-01-01T00:00:00Z"),
        ]))
        .with_geocoder(SharedGeocoder(geocoder.clone()));

    let stats = scout.run().await;

    assert_eq!(geocoder.lookups(), vec!["Srinagar", "Imphal"]);
    assert_eq!(stats.geocoded, 1);
    // Every incident is persisted, geocoded or not.
    let rows = read_incidents(&dir.path().join("data").join(INCIDENTS_FILE)).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].lat.is_none());
    assert!(rows[1].lat.is_some());
    assert!(rows[2].location.is_none());
}

#[tokio::test]
async fn failed_delivery_does_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let scout = Scout::new(&config_in(dir.path()))
        .with_source(MockSource::new("RSS").with_record(gunfight("2024-01-02T10:00:00Z", "Hindu")))
        .with_notifier(RecordingNotifier::failing("chat not found"));

    let stats = scout.run().await;

    assert_eq!(stats.unique, 1);
    assert_eq!(
        stats.notification,
        Some(DeliveryStatus::Failed("chat not found".into()))
    );
    assert!(dir.path().join("data").join(INCIDENTS_FILE).exists());
}

#[tokio::test]
async fn scrape_mode_writes_raw_table_only_when_collected() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let empty = Scout::new(&config).with_source(MockSource::new("RSS"));
    let stats = empty.scrape().await;
    assert_eq!(stats.collected, 0);
    assert!(!dir.path().join("data").join(RAW_SCRAPE_FILE).exists());

    let scout = Scout::new(&config).with_source(
        MockSource::new("RSS").with_records([
            gunfight("2024-01-01T10:00:00Z", "Hindu"),
            gunfight("2024-01-02T10:00:00Z", "Hindu"),
        ]),
    );
    let stats = scout.scrape().await;
    assert_eq!(stats.collected, 2);

    let raw = std::fs::read_to_string(dir.path().join("data").join(RAW_SCRAPE_FILE)).unwrap();
    // Scrape mode keeps duplicates; dedup happens in the full pipeline.
    assert_eq!(raw.lines().count(), 3);
    assert!(!dir.path().join("data").join(INCIDENTS_FILE).exists());
}

// Shared handles so a test can inspect a mock after the scout takes ownership.

struct SharedNotifier(std::sync::Arc<RecordingNotifier>);

#[async_trait::async_trait]
impl frontierwatch_scout::notifier::Notifier for SharedNotifier {
    async fn report(
        &self,
        summary: &frontierwatch_scout::notifier::ReportSummary,
        artifacts: &frontierwatch_scout::render::RenderedArtifacts,
    ) -> DeliveryStatus {
        self.0.report(summary, artifacts).await
    }
}

struct SharedGeocoder(std::sync::Arc<MockGeocoder>);

#[async_trait::async_trait]
impl frontierwatch_scout::pipeline::Geocoder for SharedGeocoder {
    async fn lookup(&self, place: &str) -> anyhow::Result<Option<frontierwatch_common::GeoPoint>> {
        self.0.lookup(place).await
    }
}
