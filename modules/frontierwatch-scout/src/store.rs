//! Flat-file persistence. Each run overwrites its table.

use std::path::Path;

use anyhow::{Context, Result};
use frontierwatch_common::{CanonicalIncident, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const INCIDENTS_FILE: &str = "incidents.csv";
pub const RAW_SCRAPE_FILE: &str = "raw_scrape.csv";

/// Column order of [`IncidentRow`]. Written explicitly when the table is empty.
const INCIDENT_COLUMNS: &[&str] = &[
    "content_hash",
    "published",
    "incident_type",
    "region",
    "title",
    "description",
    "text",
    "summary",
    "source",
    "url",
    "location",
    "lat",
    "lon",
    "extra",
];

const RAW_COLUMNS: &[&str] = &[
    "title",
    "description",
    "text",
    "summary",
    "published",
    "source",
    "region",
    "url",
    "extra",
];

/// One row of `incidents.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    pub content_hash: String,
    /// RFC 3339, empty when unknown.
    pub published: String,
    pub incident_type: String,
    pub region: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Remaining descriptive fields as a JSON object.
    pub extra: String,
}

impl From<&CanonicalIncident> for IncidentRow {
    fn from(incident: &CanonicalIncident) -> Self {
        Self {
            content_hash: incident.content_hash.clone(),
            published: incident.published.to_column(),
            incident_type: incident.incident_type.to_string(),
            region: incident.region.to_string(),
            title: incident.title.clone(),
            description: incident.description.clone(),
            text: incident.text.clone(),
            summary: incident.summary.clone(),
            source: incident.source.clone(),
            url: incident.url.clone(),
            location: incident.location.clone(),
            lat: incident.coordinates.map(|c| c.lat),
            lon: incident.coordinates.map(|c| c.lng),
            extra: extra_json(&incident.extra),
        }
    }
}

/// One row of `raw_scrape.csv`: records as collected, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub source: Option<String>,
    pub region: Option<String>,
    pub url: Option<String>,
    pub extra: String,
}

impl From<&RawRecord> for RawRow {
    fn from(record: &RawRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            text: record.text.clone(),
            summary: record.summary.clone(),
            published: record.published.clone(),
            source: record.source.clone(),
            region: record.region.clone(),
            url: record.url.clone(),
            extra: extra_json(&record.extra),
        }
    }
}

fn extra_json(extra: &std::collections::BTreeMap<String, serde_json::Value>) -> String {
    if extra.is_empty() {
        return String::new();
    }
    serde_json::to_string(extra).unwrap_or_default()
}

fn write_rows<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    if count == 0 {
        writer.write_record(columns)?;
    }
    writer.flush()?;
    Ok(count)
}

pub fn write_incidents(path: &Path, incidents: &[CanonicalIncident]) -> Result<()> {
    let rows = write_rows(path, INCIDENT_COLUMNS, incidents.iter().map(IncidentRow::from))?;
    info!(path = %path.display(), rows, "Wrote incident table");
    Ok(())
}

pub fn write_raw(path: &Path, records: &[RawRecord]) -> Result<()> {
    let rows = write_rows(path, RAW_COLUMNS, records.iter().map(RawRow::from))?;
    info!(path = %path.display(), rows, "Wrote raw scrape table");
    Ok(())
}

pub fn read_incidents(path: &Path) -> Result<Vec<IncidentRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<IncidentRow>, _>>()
        .context("Malformed incident table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontierwatch_common::{GeoPoint, IncidentType, Region};

    fn sample() -> CanonicalIncident {
        let raw = RawRecord::default()
            .with_title("Gunfight in Srinagar, 2 militants killed")
            .with_description("Operation, \"ongoing\"\nmore to follow")
            .with_published("2024-01-02T10:00:00Z")
            .with_source("NewsAPI")
            .with_extra("likes", 3);
        let mut incident = CanonicalIncident::from_raw(raw);
        incident.incident_type = IncidentType::Encounter;
        incident.region = Region::JammuKashmir;
        incident.location = Some("Srinagar".into());
        incident.coordinates = Some(GeoPoint {
            lat: 34.0837,
            lng: 74.7973,
        });
        incident
    }

    #[test]
    fn incident_table_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(INCIDENTS_FILE);
        let incidents = vec![
            sample(),
            CanonicalIncident::from_raw(RawRecord::default().with_title("untitled")),
        ];

        write_incidents(&path, &incidents).unwrap();
        let rows = read_incidents(&path).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], IncidentRow::from(&incidents[0]));
        assert_eq!(rows[0].published, "2024-01-02T10:00:00Z");
        assert_eq!(rows[0].region, "Jammu & Kashmir");
        assert_eq!(rows[0].lat, Some(34.0837));
        assert_eq!(rows[0].extra, r#"{"likes":3}"#);
        assert_eq!(rows[1].published, "");
        assert_eq!(rows[1].lat, None);
        assert_eq!(rows[1].incident_type, "Other");
    }

    #[test]
    fn empty_incident_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INCIDENTS_FILE);

        write_incidents(&path, &[]).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.trim_end(), INCIDENT_COLUMNS.join(","));
        assert!(read_incidents(&path).unwrap().is_empty());
    }

    #[test]
    fn written_header_matches_column_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INCIDENTS_FILE);

        write_incidents(&path, &[sample()]).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().next(), Some(INCIDENT_COLUMNS.join(",").as_str()));
    }

    #[test]
    fn raw_table_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RAW_SCRAPE_FILE);
        let records = vec![RawRecord::default()
            .with_text("IED found near Imphal")
            .with_source("Twitter")];

        write_raw(&path, &records).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some(RAW_COLUMNS.join(",").as_str()));
        assert_eq!(lines.next(), Some(",,IED found near Imphal,,,Twitter,,,"));
    }
}
