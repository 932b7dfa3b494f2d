//! Durable record storage
//!
//! The cache hands completed records to a [`Store`] when the auto-persist
//! policy is on. [`FsStore`] keeps one directory per video: a small JSON
//! index plus the bulky description and transcript payloads as separate
//! blob files, mirroring the host-store contract (duration inline,
//! blobs referenced, a content-type marker when rich markup was written).

use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::MetaRecord;
use crate::error::StoreError;
use crate::transcript::Transcript;

const RECORD_FILE: &str = "record.json";
const DESCRIPTION_BLOB: &str = "description.html";
const TRANSCRIPT_BLOB: &str = "transcript.json";

const RICH_MARKUP: &str = "text/html";

pub trait Store: Send + Sync {
    fn persist(
        &self,
        video_id: &str,
        record: &MetaRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Index entry written next to the blobs.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    length: Option<u64>,
    thumbnail: Option<String>,
    description_blob: Option<String>,
    transcript_blob: Option<String>,
    /// Set to the rich-markup content type when a description was written
    content_type: Option<String>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_dir(&self, video_id: &str) -> PathBuf {
        self.root.join(video_id)
    }

    /// Read a previously persisted record, `None` when the video has none.
    pub async fn load(&self, video_id: &str) -> Result<Option<MetaRecord>, StoreError> {
        let dir = self.record_dir(video_id);
        let index_path = dir.join(RECORD_FILE);
        if !index_path.exists() {
            return Ok(None);
        }

        let index = tokio::fs::read_to_string(&index_path).await?;
        let stored: StoredRecord =
            serde_json::from_str(&index).map_err(|e| StoreError::Deserialize(e.to_string()))?;

        let description = match stored.description_blob {
            Some(ref blob) => Some(tokio::fs::read_to_string(dir.join(blob)).await?),
            None => None,
        };

        let caption = match stored.transcript_blob {
            Some(ref blob) => {
                let raw = tokio::fs::read_to_string(dir.join(blob)).await?;
                let transcript: Transcript = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Deserialize(e.to_string()))?;
                Some(transcript)
            }
            None => None,
        };

        Ok(Some(MetaRecord {
            length: stored.length,
            thumbnail: stored.thumbnail,
            description,
            caption,
            errors: Vec::new(),
        }))
    }
}

impl Store for FsStore {
    async fn persist(&self, video_id: &str, record: &MetaRecord) -> Result<(), StoreError> {
        let dir = self.record_dir(video_id);
        tokio::fs::create_dir_all(&dir).await?;

        if let Some(ref description) = record.description {
            tokio::fs::write(dir.join(DESCRIPTION_BLOB), description).await?;
        }

        if let Some(ref transcript) = record.caption {
            let raw = serde_json::to_string(transcript)
                .map_err(|e| StoreError::Serialize(e.to_string()))?;
            tokio::fs::write(dir.join(TRANSCRIPT_BLOB), raw).await?;
        }

        let stored = StoredRecord {
            length: record.length,
            thumbnail: record.thumbnail.clone(),
            description_blob: record.description.is_some().then(|| DESCRIPTION_BLOB.to_string()),
            transcript_blob: record.caption.is_some().then(|| TRANSCRIPT_BLOB.to_string()),
            content_type: record.description.is_some().then(|| RICH_MARKUP.to_string()),
            fetched_at: Utc::now(),
        };
        let index =
            serde_json::to_string_pretty(&stored).map_err(|e| StoreError::Serialize(e.to_string()))?;
        tokio::fs::write(dir.join(RECORD_FILE), index).await?;

        debug!("persisted record for {video_id} to {}", dir.display());
        Ok(())
    }
}
