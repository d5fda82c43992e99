//! Presentation layer: a Leaflet incident map and SVG summary charts.

pub mod charts;
pub mod map;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use frontierwatch_common::config::OutputConfig;
use frontierwatch_common::{CanonicalIncident, FrontierError};
use tracing::{error, info};

pub const MAP_FILE: &str = "incidents.html";

/// Files produced by one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedArtifacts {
    /// Absent when no incident had coordinates.
    pub map: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}

impl RenderedArtifacts {
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.map.iter().chain(self.charts.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_none() && self.charts.is_empty()
    }
}

pub struct Renderer {
    maps_dir: PathBuf,
    charts_dir: PathBuf,
}

impl Renderer {
    pub fn new(maps_dir: impl Into<PathBuf>, charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            charts_dir: charts_dir.into(),
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(&output.maps_dir, &output.charts_dir)
    }

    /// Write the map and charts. Each artifact is written on its own, so a
    /// failed write drops only that file and the rest are still returned.
    pub fn render(&self, incidents: &[CanonicalIncident]) -> RenderedArtifacts {
        let mut artifacts = RenderedArtifacts::default();

        match map::render_map(incidents) {
            Some(page) => {
                let path = self.maps_dir.join(MAP_FILE);
                if write_artifact(&path, &page) {
                    artifacts.map = Some(path);
                }
            }
            None => info!("No geocoded incidents, skipping map"),
        }

        for (file_name, svg) in charts::render_charts(incidents) {
            let path = self.charts_dir.join(file_name);
            if write_artifact(&path, &svg) {
                artifacts.charts.push(path);
            }
        }

        info!(
            map = artifacts.map.is_some(),
            charts = artifacts.charts.len(),
            "Rendered artifacts"
        );
        artifacts
    }
}

fn write_artifact(path: &Path, body: &str) -> bool {
    match write_file(path, body) {
        Ok(()) => true,
        Err(e) => {
            let err = FrontierError::Output(format!("{e:#}"));
            error!(path = %path.display(), error = %err, "Artifact not written");
            false
        }
    }
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontierwatch_common::{GeoPoint, IncidentType, RawRecord, Region};

    fn incident(title: &str, coords: Option<GeoPoint>) -> CanonicalIncident {
        let mut i = CanonicalIncident::from_raw(RawRecord::default().with_title(title).with_source("RSS"));
        i.incident_type = IncidentType::Attack;
        i.region = Region::NorthEast;
        i.coordinates = coords;
        i
    }

    #[test]
    fn nothing_to_render_for_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(dir.path().join("maps"), dir.path().join("charts"));
        let artifacts = renderer.render(&[]);
        assert!(artifacts.is_empty());
        assert!(!dir.path().join("maps").exists());
    }

    #[test]
    fn map_skipped_without_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(dir.path().join("maps"), dir.path().join("charts"));
        let artifacts = renderer.render(&[incident("Blast in Imphal", None)]);
        assert!(artifacts.map.is_none());
        assert_eq!(artifacts.charts.len(), 3);
        for path in &artifacts.charts {
            assert!(path.exists());
        }
    }

    #[test]
    fn map_written_when_geocoded() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(dir.path().join("maps"), dir.path().join("charts"));
        let point = GeoPoint {
            lat: 24.817,
            lng: 93.9368,
        };
        let artifacts = renderer.render(&[incident("Blast in Imphal", Some(point))]);
        let map = artifacts.map.clone().unwrap();
        assert_eq!(map, dir.path().join("maps").join(MAP_FILE));
        assert_eq!(artifacts.paths().count(), 4);
    }

    #[test]
    fn failed_chart_dir_keeps_written_map() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the charts directory should be.
        let blocked = dir.path().join("charts");
        std::fs::write(&blocked, "").unwrap();
        let renderer = Renderer::new(dir.path().join("maps"), &blocked);
        let point = GeoPoint {
            lat: 24.817,
            lng: 93.9368,
        };

        let artifacts = renderer.render(&[incident("Blast in Imphal", Some(point))]);

        assert_eq!(artifacts.map, Some(dir.path().join("maps").join(MAP_FILE)));
        assert!(artifacts.charts.is_empty());
        assert_eq!(artifacts.paths().count(), 1);
    }

    #[test]
    fn escape_covers_markup() {
        assert_eq!(html_escape("<a href='x'>&"), "&lt;a href=&#39;x&#39;&gt;&amp;");
    }
}
