// Test mocks for the pipeline.
//
// Three mocks matching the three network-facing trait boundaries:
// - MockSource (IncidentSource): fixed records, or a forced failure
// - MockGeocoder (Geocoder): HashMap-based place→point, with failing places
// - RecordingNotifier (Notifier): remembers every report it was handed

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use frontierwatch_common::{GeoPoint, RawRecord};

use crate::notifier::{DeliveryStatus, Notifier, ReportSummary};
use crate::pipeline::geocoder::Geocoder;
use crate::render::RenderedArtifacts;
use crate::sources::IncidentSource;

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

pub const SRINAGAR: GeoPoint = GeoPoint {
    lat: 34.0837,
    lng: 74.7973,
};
pub const IMPHAL: GeoPoint = GeoPoint {
    lat: 24.8170,
    lng: 93.9368,
};

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

pub struct MockSource {
    name: String,
    records: Vec<RawRecord>,
    failure: Option<String>,
}

impl MockSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
            failure: None,
        }
    }

    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = RawRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Every fetch fails with `reason`.
    pub fn failing(name: &str, reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new(name)
        }
    }
}

#[async_trait]
impl IncidentSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_fetch(&self) -> Result<Vec<RawRecord>> {
        if let Some(reason) = &self.failure {
            bail!("{reason}");
        }
        Ok(self.records.clone())
    }
}

// ---------------------------------------------------------------------------
// MockGeocoder
// ---------------------------------------------------------------------------

/// Unregistered places are a miss (`Ok(None)`); places marked failing error.
pub struct MockGeocoder {
    places: HashMap<String, GeoPoint>,
    failing: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self {
            places: HashMap::new(),
            failing: HashSet::new(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn on_place(mut self, place: &str, point: GeoPoint) -> Self {
        self.places.insert(place.to_string(), point);
        self
    }

    pub fn failing_on(mut self, place: &str) -> Self {
        self.failing.insert(place.to_string());
        self
    }

    /// Places looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn lookup(&self, place: &str) -> Result<Option<GeoPoint>> {
        self.lookups.lock().unwrap().push(place.to_string());
        if self.failing.contains(place) {
            bail!("lookup timed out for {place}");
        }
        Ok(self.places.get(place).copied())
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

pub struct RecordingNotifier {
    status: DeliveryStatus,
    reports: Mutex<Vec<(ReportSummary, RenderedArtifacts)>>,
}

impl RecordingNotifier {
    /// Reports every call as delivered with one document per artifact.
    pub fn new() -> Self {
        Self {
            status: DeliveryStatus::Delivered { documents: 0 },
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Reports every call as failed.
    pub fn failing(reason: &str) -> Self {
        Self {
            status: DeliveryStatus::Failed(reason.to_string()),
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn reports(&self) -> Vec<(ReportSummary, RenderedArtifacts)> {
        self.reports.lock().unwrap().clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn report(&self, summary: &ReportSummary, artifacts: &RenderedArtifacts) -> DeliveryStatus {
        self.reports
            .lock()
            .unwrap()
            .push((summary.clone(), artifacts.clone()));
        match &self.status {
            DeliveryStatus::Delivered { .. } => DeliveryStatus::Delivered {
                documents: artifacts.paths().count(),
            },
            other => other.clone(),
        }
    }
}
