//! Feed entry interface and video ID extraction
//!
//! The host application owns its entry records; the pipeline only needs an
//! opaque identifier it can map to a video ID. Feed readers hand us IDs of
//! the form `yt:video:<id>`, users hand us watch URLs or bare IDs.

use std::sync::LazyLock;

use regex::Regex;

/// The slice of a host record the pipeline cares about.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Opaque identifier: a feed entry ID, a watch URL or a bare video ID
    pub id: String,
    /// Display title, if the host has one
    pub title: Option<String>,
}

impl Entry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
        }
    }

    pub fn with_title(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
        }
    }

    /// Extract the canonical video ID, or `None` if this entry does not
    /// identify a video. Extraction is deterministic: the same entry always
    /// maps to the same ID.
    pub fn video_id(&self) -> Option<&str> {
        video_id(&self.id)
    }
}

static FEED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^yt:video:([A-Za-z0-9_-]{11})$").expect("valid regex"));

static URL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|youtu\.be/|/shorts/|/embed/|/v/)([A-Za-z0-9_-]{11})")
        .expect("valid regex")
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"));

/// Video ID from an opaque identifier: `yt:video:` feed tails, the usual
/// URL shapes, or an 11-character bare ID.
pub fn video_id(id: &str) -> Option<&str> {
    if let Some(caps) = FEED_ID.captures(id) {
        return caps.get(1).map(|m| m.as_str());
    }
    if let Some(caps) = URL_ID.captures(id) {
        return caps.get(1).map(|m| m.as_str());
    }
    if BARE_ID.is_match(id) {
        return Some(id);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_feed_entry_ids() {
        assert_eq!(video_id("yt:video:dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn extracts_url_shapes() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            video_id("https://youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn accepts_bare_ids() {
        assert_eq!(video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn rejects_non_video_identifiers() {
        assert_eq!(video_id("https://example.com/feed.xml"), None);
        assert_eq!(video_id("nope"), None);
        assert_eq!(video_id("twelve-chars"), None);
        assert_eq!(video_id("yt:channel:UC1234567890"), None);
    }

    #[test]
    fn extraction_is_deterministic() {
        let entry = Entry::new("yt:video:abcdefghijk");
        assert_eq!(entry.video_id(), entry.video_id());
    }
}
