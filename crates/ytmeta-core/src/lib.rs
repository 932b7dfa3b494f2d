//! ytmeta-core: fetch, normalize and cache supplementary video metadata
//! (duration, thumbnail, description, timed captions) for feed entries.

pub mod cache;
pub mod captions;
pub mod client;
pub mod config;
pub mod description;
pub mod entry;
pub mod error;
pub mod pipeline;
pub mod servers;
pub mod store;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{FailureTag, MetaCache, MetaRecord};
pub use client::HttpClient;
pub use config::Config;
pub use entry::Entry;
pub use error::{Result, YtMetaError};
pub use pipeline::{FetchOutcome, Pipeline};
pub use transcript::Transcript;
