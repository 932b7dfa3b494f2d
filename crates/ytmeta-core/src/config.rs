//! Configuration management for ytmeta

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub fetch: FetchConfig,
    pub captions: CaptionsConfig,
    pub store: StoreConfig,
    pub batch: BatchConfig,
}

/// Which metadata fields a fetch should populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaField {
    Duration,
    Thumbnail,
    Description,
    Captions,
}

impl MetaField {
    /// Query-string field name on the mirror's video endpoint, if the field
    /// is served by it (captions come from elsewhere).
    pub fn api_field(&self) -> Option<&'static str> {
        match self {
            MetaField::Duration => Some("lengthSeconds"),
            MetaField::Thumbnail => Some("videoThumbnails"),
            MetaField::Description => Some("descriptionHtml"),
            MetaField::Captions => None,
        }
    }
}

/// Thumbnail size tier, mapped onto the mirror's ranked variant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSize {
    Large,
    Medium,
    Small,
}

impl ThumbnailSize {
    /// Index into the `videoThumbnails` array the mirror returns.
    pub fn variant_index(&self) -> usize {
        match self {
            ThumbnailSize::Large => 2,
            ThumbnailSize::Medium => 3,
            ThumbnailSize::Small => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Metadata fields to fetch and cache
    pub fields: Vec<MetaField>,
    /// Thumbnail size tier; unset disables thumbnail selection
    pub thumbnail_size: Option<ThumbnailSize>,
    /// Fixed mirror base URL; bypasses instance discovery when set
    pub invidious_url: Option<String>,
    /// Total request attempts per metadata fetch (initial + retries)
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionsConfig {
    /// Caption language preferences, best first; matched case-insensitively
    /// against track names and language codes
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Persist fetched records to the durable store as they complete
    pub auto_persist: bool,
    /// Store root (defaults to the platform data directory)
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum concurrently in-flight items
    pub max_parallel: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig {
                fields: vec![
                    MetaField::Duration,
                    MetaField::Thumbnail,
                    MetaField::Description,
                    MetaField::Captions,
                ],
                thumbnail_size: Some(ThumbnailSize::Large),
                invidious_url: None,
                max_attempts: 3,
            },
            captions: CaptionsConfig {
                languages: vec![
                    "english".to_string(),
                    "english (auto generated)".to_string(),
                ],
            },
            store: StoreConfig {
                auto_persist: false,
                directory: None,
            },
            batch: BatchConfig { max_parallel: 4 },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("ytmeta/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment
        figment = figment.merge(Env::prefixed("YTMETA_").split("_"));

        figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Store root, falling back to the platform data directory
    pub fn store_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref dir) = self.store.directory {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("ytmeta/records"))
            .ok_or_else(|| {
                ConfigError::InvalidValue("no data directory on this platform".to_string())
            })
    }

    /// Whether any field served by the mirror's video endpoint is requested
    pub fn wants_description(&self) -> bool {
        self.fetch
            .fields
            .iter()
            .any(|f| f.api_field().is_some())
    }

    /// Whether caption fetching is requested and negotiable
    pub fn wants_captions(&self) -> bool {
        self.fetch.fields.contains(&MetaField::Captions) && !self.captions.languages.is_empty()
    }
}

impl FetchConfig {
    /// Comma-joined query fields for the mirror's video endpoint
    pub fn api_fields(&self) -> String {
        let mut fields: Vec<&str> = self.fields.iter().filter_map(MetaField::api_field).collect();
        fields.dedup();
        fields.join(",")
    }
}
