use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use frontierwatch_common::config::GeocoderConfig;
use frontierwatch_common::{CanonicalIncident, GeoPoint};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Places the geocoder knows how to look up, checked in this order against
/// the lowercased title and description.
pub const GAZETTEER: &[&str] = &[
    "Jammu", "Srinagar", "Kupwara", "Baramulla", "Anantnag", "Imphal", "Kohima", "Guwahati",
    "Aizawl", "Agartala", "Shillong", "Itanagar", "Manipur", "Nagaland", "Assam",
];

// --- Geocoder trait ---

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service knows no such place.
    async fn lookup(&self, place: &str) -> Result<Option<GeoPoint>>;
}

/// First gazetteer place named in the incident's title or description.
pub fn extract_location(incident: &CanonicalIncident) -> Option<&'static str> {
    let haystack = format!(
        "{} {}",
        incident.title.as_deref().unwrap_or_default(),
        incident.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    GAZETTEER
        .iter()
        .copied()
        .find(|place| haystack.contains(&place.to_lowercase()))
}

/// Coordinates for one incident. Lookup errors are logged and read as a miss.
pub async fn resolve(geocoder: &dyn Geocoder, incident: &CanonicalIncident) -> Option<GeoPoint> {
    let place = extract_location(incident)?;
    match geocoder.lookup(place).await {
        Ok(point) => point,
        Err(e) => {
            warn!(place, error = %e, "Geocoding failed");
            None
        }
    }
}

/// Geocode the first `limit` incidents in order. The rest pass through
/// unresolved; one failed lookup never aborts the batch.
pub async fn geocode_incidents(
    geocoder: &dyn Geocoder,
    mut incidents: Vec<CanonicalIncident>,
    limit: usize,
) -> Vec<CanonicalIncident> {
    let mut resolved = 0usize;

    for incident in incidents.iter_mut().take(limit) {
        let Some(place) = extract_location(incident) else {
            continue;
        };
        incident.location = Some(place.to_string());
        incident.coordinates = resolve(geocoder, incident).await;
        if incident.coordinates.is_some() {
            resolved += 1;
        }
    }

    info!(
        total = incidents.len(),
        limit,
        resolved,
        "Geocoding complete"
    );
    incidents
}

// --- Rate limiting ---

/// Spaces calls at least `min_interval` apart, across tasks.
pub struct RateLimiter {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

// --- Nominatim ---

#[derive(serde::Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim search. Queries "<place>, <country>".
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    country: String,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build geocoder HTTP client")?;
        info!(
            endpoint = config.endpoint.as_str(),
            min_interval_ms = config.min_interval_ms,
            "Using Nominatim geocoder"
        );
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
            country: config.country.clone(),
            limiter: RateLimiter::new(Duration::from_millis(config.min_interval_ms)),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, place: &str) -> Result<Option<GeoPoint>> {
        let query = format!("{place}, {}", self.country);
        self.limiter.wait().await;

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .with_context(|| format!("Nominatim request failed for '{query}'"))?
            .error_for_status()?;

        let results: Vec<NominatimResult> = resp.json().await?;
        let Some(first) = results.into_iter().next() else {
            debug!(query, "No geocoding results");
            return Ok(None);
        };

        let lat: f64 = first.lat.parse().context("Invalid latitude")?;
        let lng: f64 = first.lon.parse().context("Invalid longitude")?;
        Ok(Some(GeoPoint { lat, lng }))
    }
}
