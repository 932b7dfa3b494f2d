//! In-memory metadata cache
//!
//! The cache is the unit of "already fetched": one [`MetaRecord`] per video
//! ID, constructed explicitly and passed to its consumers (no process-wide
//! global). It fronts the optional durable store; eviction is the store's
//! problem, records are never deleted here.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;

/// Which sub-fetch failed while populating a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureTag {
    Description,
    Caption,
}

impl FailureTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureTag::Description => "description",
            FailureTag::Caption => "caption",
        }
    }
}

/// Aggregate cached metadata for one video.
///
/// Fields fill independently and monotonically: a present field is only
/// ever replaced, never cleared. `errors` records which sub-fetches failed
/// during the last fetch; it is reset when a fresh fetch begins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Duration in seconds
    pub length: Option<u64>,
    /// Thumbnail URL for the configured size tier
    pub thumbnail: Option<String>,
    /// Sanitized description markup
    pub description: Option<String>,
    /// Segmented transcript
    pub caption: Option<Transcript>,
    /// Failure tags from the last fetch, empty when everything succeeded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FailureTag>,
}

impl MetaRecord {
    /// Whether any description-side field has been populated.
    pub fn has_description_content(&self) -> bool {
        self.length.is_some() || self.thumbnail.is_some() || self.description.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_description_content() && self.caption.is_none()
    }
}

/// Process-wide map from video ID to [`MetaRecord`].
///
/// Writers on *different* keys never contend beyond the map lock; two
/// writers on the *same* key (a forced re-fetch racing a natural one) are
/// last-writer-wins by design.
#[derive(Debug, Default)]
pub struct MetaCache {
    inner: Mutex<HashMap<String, MetaRecord>>,
}

impl MetaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, video_id: &str) -> Option<MetaRecord> {
        self.inner.lock().unwrap().get(video_id).cloned()
    }

    /// Insert `record` under `video_id` unless one is already present;
    /// `force` overwrites. Returns whether the insert happened.
    pub fn put(&self, video_id: &str, record: MetaRecord, force: bool) -> bool {
        let mut map = self.inner.lock().unwrap();
        if force || !map.contains_key(video_id) {
            map.insert(video_id.to_string(), record);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.inner.lock().unwrap().contains_key(video_id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(length: u64) -> MetaRecord {
        MetaRecord {
            length: Some(length),
            ..Default::default()
        }
    }

    #[test]
    fn get_after_put_round_trips() {
        let cache = MetaCache::new();
        let r = record(120);
        assert!(cache.put("abc123", r.clone(), false));
        assert_eq!(cache.get("abc123"), Some(r));
    }

    #[test]
    fn unforced_put_keeps_the_existing_record() {
        let cache = MetaCache::new();
        cache.put("abc123", record(1), false);
        assert!(!cache.put("abc123", record(2), false));
        assert_eq!(cache.get("abc123").unwrap().length, Some(1));
    }

    #[test]
    fn forced_put_replaces() {
        let cache = MetaCache::new();
        cache.put("abc123", record(1), false);
        assert!(cache.put("abc123", record(2), true));
        assert_eq!(cache.get("abc123").unwrap().length, Some(2));
    }

    #[test]
    fn missing_keys_are_absent() {
        let cache = MetaCache::new();
        assert_eq!(cache.get("missing"), None);
        assert!(!cache.contains("missing"));
    }

    #[test]
    fn description_content_check_covers_all_three_fields() {
        assert!(!MetaRecord::default().has_description_content());
        assert!(record(1).has_description_content());
        let r = MetaRecord {
            thumbnail: Some("T".to_string()),
            ..Default::default()
        };
        assert!(r.has_description_content());
    }
}
