//! Error types for ytmeta-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, YtMetaError>;

#[derive(Error, Debug)]
pub enum YtMetaError {
    #[error("Metadata fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Caption fetch failed: {0}")]
    Caption(#[from] CaptionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the mirror-backed metadata fetch.
///
/// `NoServer` is terminal: with no mirror to talk to there is nothing to
/// retry. Transport and payload failures each consume one retry attempt;
/// once the attempts run out the loop surfaces `Exhausted`.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no usable mirror server (no override configured, discovery returned nothing)")]
    NoServer,

    #[error("request failed: {0}")]
    Request(String),

    #[error("malformed metadata payload: {0}")]
    Payload(String),

    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Failures along the caption path: watch-page scrape, track selection
/// and timed-text retrieval.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned status {status}")]
    Status { status: u16 },

    #[error("caption listing not found in watch page")]
    MarkerNotFound,

    #[error("malformed caption listing: {0}")]
    Listing(String),

    #[error("no caption tracks available")]
    NoTracks,

    #[error("no track matches the configured languages")]
    NoLanguageMatch,

    #[error("malformed timed-text markup: {0}")]
    Markup(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to serialize record: {0}")]
    Serialize(String),

    #[error("failed to parse stored record: {0}")]
    Deserialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
