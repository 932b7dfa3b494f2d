//! Per-item orchestration and batch fan-out
//!
//! One item's pipeline: resolve the video ID, reuse or refresh the cached
//! record, fetch the description side and the caption side independently,
//! record partial failures, hand the record to the cache (and the durable
//! store when the policy is on). A batch fans items out concurrently and
//! joins them all; nothing an item does can abort its siblings.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::cache::{FailureTag, MetaCache, MetaRecord};
use crate::captions::{locate_caption_tracks, select_track};
use crate::client::Fetch;
use crate::config::Config;
use crate::description::fetch_description;
use crate::entry::Entry;
use crate::error::{CaptionError, ConfigError};
use crate::servers::ServerDirectory;
use crate::store::{FsStore, Store};
use crate::transcript::{fetch_transcript, Transcript};

/// What happened to one item. The host reads this (or the cache) to render
/// results; failures are tagged per sub-fetch, not raised.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub video_id: String,
    pub title: Option<String>,
    /// Snapshot of the record as it was written back
    pub record: MetaRecord,
}

impl FetchOutcome {
    pub fn failed(&self) -> bool {
        !self.record.errors.is_empty()
    }
}

pub struct Pipeline<C, S = FsStore> {
    client: C,
    servers: ServerDirectory,
    cache: MetaCache,
    store: Option<S>,
    config: Config,
}

impl<C: Fetch> Pipeline<C, FsStore> {
    /// Pipeline with the default filesystem store, created only when the
    /// auto-persist policy asks for one.
    pub fn new(client: C, config: Config) -> Result<Self, ConfigError> {
        let store = if config.store.auto_persist {
            Some(FsStore::new(config.store_dir()?))
        } else {
            None
        };
        Ok(Self::build(client, config, store))
    }
}

impl<C: Fetch, S: Store> Pipeline<C, S> {
    pub fn with_store(client: C, config: Config, store: S) -> Self {
        Self::build(client, config, Some(store))
    }

    fn build(client: C, config: Config, store: Option<S>) -> Self {
        let servers = ServerDirectory::new(config.fetch.invidious_url.clone());
        Self {
            client,
            servers,
            cache: MetaCache::new(),
            store,
            config,
        }
    }

    pub fn cache(&self) -> &MetaCache {
        &self.cache
    }

    /// Fetch metadata for one entry. Returns `None` for entries that do not
    /// identify a video (those are no-ops).
    ///
    /// Already-present fields are not re-fetched unless `force` is set, and
    /// are only ever replaced on success, never cleared. A forced fetch
    /// racing a natural fetch on the same video ID is last-writer-wins.
    pub async fn fetch_one(&self, entry: &Entry, force: bool) -> Option<FetchOutcome> {
        let Some(video_id) = entry.video_id() else {
            debug!("not a video entry: {}", entry.id);
            return None;
        };
        let video_id = video_id.to_string();

        let mut record = self.cache.get(&video_id).unwrap_or_default();
        record.errors.clear();

        if self.config.wants_description() && (force || !record.has_description_content()) {
            match fetch_description(&self.client, &self.servers, &video_id, &self.config.fetch)
                .await
            {
                Ok(data) => {
                    if data.length.is_some() {
                        record.length = data.length;
                    }
                    if data.thumbnail.is_some() {
                        record.thumbnail = data.thumbnail;
                    }
                    if data.description.is_some() {
                        record.description = data.description;
                    }
                }
                Err(e) => {
                    error!("description fetch for {video_id} failed: {e}");
                    record.errors.push(FailureTag::Description);
                }
            }
        }

        // Attempted regardless of how the description side went
        if self.config.wants_captions() && (force || record.caption.is_none()) {
            match self.fetch_captions(&video_id).await {
                Ok(transcript) => record.caption = Some(transcript),
                Err(e) => {
                    error!("caption fetch for {video_id} failed: {e}");
                    record.errors.push(FailureTag::Caption);
                }
            }
        }

        self.cache.put(&video_id, record.clone(), true);

        if let Some(ref store) = self.store {
            if let Err(e) = store.persist(&video_id, &record).await {
                error!("persisting record for {video_id} failed: {e}");
            }
        }

        if record.errors.is_empty() {
            info!("fetched metadata for {video_id}");
        } else {
            info!("fetched metadata for {video_id} with failures: {:?}", record.errors);
        }

        Some(FetchOutcome {
            video_id,
            title: entry.title.clone(),
            record,
        })
    }

    async fn fetch_captions(&self, video_id: &str) -> Result<Transcript, CaptionError> {
        let tracks = locate_caption_tracks(&self.client, video_id).await?;
        if tracks.is_empty() {
            return Err(CaptionError::NoTracks);
        }
        let track = select_track(&tracks, &self.config.captions.languages)
            .ok_or(CaptionError::NoLanguageMatch)?;
        debug!(
            "selected caption track \"{}\" ({}) for {video_id}",
            track.language_name(),
            track.language_code
        );
        fetch_transcript(&self.client, track).await
    }

    /// Fetch a whole batch concurrently and wait for every item.
    ///
    /// Items complete in no particular order; one item's failure never
    /// aborts another. Entries that are not videos produce no outcome.
    pub async fn fetch_batch(&self, entries: &[Entry], force: bool) -> Vec<FetchOutcome> {
        stream::iter(entries)
            .map(|entry| self.fetch_one(entry, force))
            .buffer_unordered(self.config.batch.max_parallel.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}
