use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::timestamp::Published;

// --- Region gazetteer ---

/// Lowercase place names that put a report in Jammu & Kashmir.
pub const JK_TERMS: &[&str] = &["jammu", "kashmir", "j&k", "srinagar"];

/// Lowercase state names that put a report in the North East.
pub const NE_TERMS: &[&str] = &[
    "manipur",
    "nagaland",
    "assam",
    "mizoram",
    "tripura",
    "meghalaya",
    "arunachal",
];

// --- Enumerations ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncidentType {
    Terror,
    Encounter,
    Attack,
    #[default]
    Other,
}

impl IncidentType {
    pub const ALL: [IncidentType; 4] = [
        IncidentType::Terror,
        IncidentType::Encounter,
        IncidentType::Attack,
        IncidentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terror => "Terror",
            Self::Encounter => "Encounter",
            Self::Attack => "Attack",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Jammu & Kashmir")]
    JammuKashmir,
    #[serde(rename = "North East")]
    NorthEast,
    #[default]
    Other,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::JammuKashmir, Region::NorthEast, Region::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JammuKashmir => "Jammu & Kashmir",
            Self::NorthEast => "North East",
            Self::Other => "Other",
        }
    }

    /// Substring match against the gazetteer. J&K terms win over North East terms.
    pub fn detect(text: &str) -> Region {
        let lower = text.to_lowercase();
        if JK_TERMS.iter().any(|t| lower.contains(t)) {
            Region::JammuKashmir
        } else if NE_TERMS.iter().any(|t| lower.contains(t)) {
            Region::NorthEast
        } else {
            Region::Other
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jammu & kashmir" | "jammu and kashmir" | "j&k" => Ok(Region::JammuKashmir),
            "north east" | "northeast" | "north-east" => Ok(Region::NorthEast),
            "other" => Ok(Region::Other),
            other => Err(format!("unknown region: {other}")),
        }
    }
}

// --- Geo ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

// --- Raw records ---

/// Field names that map onto `RawRecord::published`, in precedence order.
const PUBLISHED_KEYS: &[&str] = &["published", "publishedAt", "created", "created_at"];

/// An incident candidate as handed over by a source adapter.
///
/// Every field is optional. Values are typed once here so nothing downstream
/// has to probe for presence: strings stay strings, numbers and booleans
/// become their string form, and null, arrays and objects read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub summary: Option<String>,
    /// Timestamp text in whatever layout the source used.
    pub published: Option<String>,
    pub source: Option<String>,
    /// Region pre-assigned by the adapter, if any.
    pub region: Option<String>,
    pub url: Option<String>,
    /// Any other descriptive fields (author ids, engagement counts, ...).
    pub extra: BTreeMap<String, Value>,
}

impl RawRecord {
    /// Build a record from an arbitrary JSON value. Never fails: a non-object
    /// yields an empty record.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return RawRecord::default();
        };

        let mut record = RawRecord::default();
        let mut published_candidates: BTreeMap<usize, String> = BTreeMap::new();

        for (key, value) in map {
            if let Some(rank) = PUBLISHED_KEYS.iter().position(|k| *k == key) {
                if let Some(s) = scalar_to_string(&value) {
                    published_candidates.insert(rank, s);
                }
                continue;
            }
            match key.as_str() {
                "title" => record.title = scalar_to_string(&value),
                "description" => record.description = scalar_to_string(&value),
                "text" => record.text = scalar_to_string(&value),
                "summary" => record.summary = scalar_to_string(&value),
                "source" => record.source = source_name(&value),
                "region" => record.region = scalar_to_string(&value),
                "url" => record.url = scalar_to_string(&value),
                _ => {
                    record.extra.insert(key, value);
                }
            }
        }

        record.published = published_candidates.into_values().next();
        record
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The four free-text fields joined in fixed order. See [`compose_content`].
    pub fn content(&self) -> String {
        compose_content([
            self.title.as_deref(),
            self.description.as_deref(),
            self.text.as_deref(),
            self.summary.as_deref(),
        ])
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawRecord::from_value)
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        RawRecord::from_value(value)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// NewsAPI nests the publisher as `{"id": .., "name": ..}`.
fn source_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("name").and_then(scalar_to_string),
        other => scalar_to_string(other),
    }
}

/// Join free-text fields in the given order with a single space. Absent and
/// empty fields are skipped so they add no separator; present values are used
/// verbatim, without trimming.
pub fn compose_content<'a>(fields: impl IntoIterator<Item = Option<&'a str>>) -> String {
    fields
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase hex SHA-256 of `content`. Exact-match identity: one changed
/// character gives a different hash.
pub fn content_hash(content: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(content.as_bytes()))
}

// --- Canonical incidents ---

/// The normalized, deduplicated form every later stage works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalIncident {
    pub content: String,
    pub content_hash: String,
    pub published: Published,
    pub incident_type: IncidentType,
    pub region: Region,

    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub summary: Option<String>,
    /// Timestamp exactly as the source supplied it.
    pub published_raw: Option<String>,
    pub source: Option<String>,
    pub reported_region: Option<String>,
    pub url: Option<String>,
    pub extra: BTreeMap<String, Value>,

    /// Gazetteer place used for the geocoder lookup.
    pub location: Option<String>,
    pub coordinates: Option<GeoPoint>,
}

impl CanonicalIncident {
    /// Type it once: derive content, identity and timestamp from a raw record.
    pub fn from_raw(raw: RawRecord) -> Self {
        let content = raw.content();
        let content_hash = content_hash(&content);
        let published = Published::parse(raw.published.as_deref());

        Self {
            content,
            content_hash,
            published,
            incident_type: IncidentType::Other,
            region: Region::Other,
            title: raw.title,
            description: raw.description,
            text: raw.text,
            summary: raw.summary,
            published_raw: raw.published,
            source: raw.source,
            reported_region: raw.region,
            url: raw.url,
            extra: raw.extra,
            location: None,
            coordinates: None,
        }
    }

    pub fn title_or_content(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.content)
    }

    pub fn source_or_unknown(&self) -> &str {
        self.source
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }
}
