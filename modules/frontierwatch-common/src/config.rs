use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::FrontierError;

/// Secrets and env-specific values. Identity, keywords, feeds and output
/// layout live in the TOML [`FileConfig`].
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub newsapi_key: Option<String>,
    pub twitter_bearer: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Secrets {
    /// Read the four optional credentials. Empty values count as unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            newsapi_key: non_empty_env("NEWSAPI_KEY"),
            twitter_bearer: non_empty_env("TWITTER_BEARER"),
            telegram_token: non_empty_env("TELEGRAM_TOKEN"),
            telegram_chat_id: non_empty_env("TELEGRAM_CHAT_ID"),
        }
    }

    /// Both halves of the bot configuration, or nothing.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        match (&self.telegram_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) => Some((token.as_str(), chat.as_str())),
            _ => None,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// --- File config ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub keywords: KeywordConfig,
    pub sources: SourcesConfig,
    pub geocoder: GeocoderConfig,
    pub output: OutputConfig,
}

/// Incident-type keyword lists, checked in priority order terror → encounter → attack.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub terror: Vec<String>,
    pub encounter: Vec<String>,
    pub attack: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            terror: owned(&[
                "terror",
                "militant",
                "jaish",
                "lashkar",
                "hizbul",
                "infiltration",
                "insurgent",
            ]),
            encounter: owned(&[
                "encounter",
                "gunfight",
                "exchange of fire",
                "cordon and search",
                "neutralised",
                "neutralized",
            ]),
            attack: owned(&[
                "attack",
                "ambush",
                "explosion",
                "blast",
                "ied",
                "grenade",
                "ceasefire violation",
                "firing",
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Look-back window for every source.
    pub hours_back: i64,
    /// Cap on records per source.
    pub max_records: usize,
    /// Shared search expression for the news and social APIs.
    pub search_query: String,
    pub rss_feeds: Vec<FeedConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let feeds = [
            ("hindu", "https://www.thehindu.com/feeder/default.rss"),
            ("toi", "https://timesofindia.indiatimes.com/rssfeedstopstories.cms"),
            ("india_today", "https://www.indiatoday.in/rss/1206578"),
            ("business_standard", "https://www.business-standard.com/rss/home"),
        ];
        Self {
            hours_back: 6,
            max_records: 100,
            search_query: "(terror OR terrorist OR encounter OR militant OR attack OR explosion \
                OR IED OR ambush OR infiltration OR \"ceasefire violation\" OR gunfight) \
                (Jammu OR Kashmir OR Manipur OR Nagaland OR Assam OR Mizoram OR Tripura \
                OR Meghalaya OR Arunachal)"
                .to_string(),
            rss_feeds: feeds
                .iter()
                .map(|(name, url)| FeedConfig {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub user_agent: String,
    /// Only the first `limit` incidents are looked up.
    pub limit: usize,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
    /// Appended to every place name, e.g. "Srinagar, India".
    pub country: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "FrontierWatch/1.0".to_string(),
            limit: 20,
            min_interval_ms: 1_000,
            timeout_secs: 10,
            country: "India".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub maps_dir: PathBuf,
    pub charts_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            maps_dir: PathBuf::from("maps"),
            charts_dir: PathBuf::from("charts"),
        }
    }
}

impl FileConfig {
    /// Load and parse a TOML config file. A missing file falls back to the
    /// built-in defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, FrontierError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using built-in defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            FrontierError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| FrontierError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self, FrontierError> {
        toml::from_str(content)
            .map_err(|e| FrontierError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Everything a run needs: file settings plus environment secrets.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    pub secrets: Secrets,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, FrontierError> {
        let config = Self {
            file: FileConfig::load(path)?,
            secrets: Secrets::from_env(),
        };
        config.log_redacted();
        Ok(config)
    }

    pub fn log_redacted(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let n = v.chars().count().min(4);
                    let head: String = v.chars().take(n).collect();
                    format!("{head}...({} chars)", v.chars().count())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  NEWSAPI_KEY: {}", preview_opt(&self.secrets.newsapi_key));
        tracing::info!("  TWITTER_BEARER: {}", preview_opt(&self.secrets.twitter_bearer));
        tracing::info!("  TELEGRAM_TOKEN: {}", preview_opt(&self.secrets.telegram_token));
        tracing::info!(
            "  TELEGRAM_CHAT_ID: {}",
            preview_opt(&self.secrets.telegram_chat_id)
        );
        tracing::info!(
            terror = self.file.keywords.terror.len(),
            encounter = self.file.keywords.encounter.len(),
            attack = self.file.keywords.attack.len(),
            feeds = self.file.sources.rss_feeds.len(),
            "  keyword lists and feeds"
        );
    }
}
