//! Caption track discovery and language selection
//!
//! The track listing is not served by the mirrors; it is scraped out of the
//! watch page, where the player config embeds a JSON blob between a
//! `"captions":` key and the following `,"videoDetails` key. The marker
//! search is a versioned scrape contract: if the page format drifts, the
//! failure is [`CaptionError::MarkerNotFound`], isolated from transport
//! errors and testable on captured pages.

use serde::Deserialize;
use tracing::debug;

use crate::client::Fetch;
use crate::error::CaptionError;

const WATCH_URL: &str = "https://youtube.com/watch?v=";

const CAPTIONS_MARKER: &str = "\"captions\":";
const DETAILS_MARKER: &str = ",\"videoDetails";

/// One available caption track. Ephemeral: produced by the locator,
/// consumed by the selector, not cached.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "languageCode", default)]
    pub language_code: String,
    #[serde(default)]
    name: Option<TrackName>,
}

#[derive(Debug, Clone, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
}

impl CaptionTrack {
    /// Human-readable language name, empty when the listing omits it.
    pub fn language_name(&self) -> &str {
        self.name
            .as_ref()
            .and_then(|name| name.simple_text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct CaptionsBlob {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// Scrape the watch page for the video's caption track listing.
pub async fn locate_caption_tracks<C: Fetch>(
    client: &C,
    video_id: &str,
) -> Result<Vec<CaptionTrack>, CaptionError> {
    let url = format!("{WATCH_URL}{video_id}");
    let response = client
        .get(&url)
        .await
        .map_err(|e| CaptionError::Request(e.to_string()))?;

    if !response.is_success() {
        return Err(CaptionError::Status {
            status: response.status,
        });
    }

    let tracks = extract_caption_tracks(&response.body)?;
    debug!("found {} caption tracks for {video_id}", tracks.len());
    Ok(tracks)
}

/// Pull the track list out of raw watch-page markup.
pub fn extract_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
    let start = page
        .find(CAPTIONS_MARKER)
        .map(|pos| pos + CAPTIONS_MARKER.len())
        .ok_or(CaptionError::MarkerNotFound)?;
    let end = page[start..]
        .find(DETAILS_MARKER)
        .map(|pos| start + pos)
        .ok_or(CaptionError::MarkerNotFound)?;

    let blob = page[start..end].replace('\n', "");
    let captions: CaptionsBlob =
        serde_json::from_str(&blob).map_err(|e| CaptionError::Listing(e.to_string()))?;

    Ok(captions
        .renderer
        .map(|renderer| renderer.caption_tracks)
        .unwrap_or_default())
}

/// Pick the best track for an ordered language preference list.
///
/// Preferences are tried best-first; within one preference, tracks are
/// scanned in listing order and matched case-insensitively as a substring
/// of the human-readable name or the language code. The first track of the
/// first preference that matches anything wins.
pub fn select_track<'t>(
    tracks: &'t [CaptionTrack],
    preferences: &[String],
) -> Option<&'t CaptionTrack> {
    for preference in preferences {
        let preference = preference.to_lowercase();
        for track in tracks {
            if track.language_name().to_lowercase().contains(&preference)
                || track.language_code.to_lowercase().contains(&preference)
            {
                return Some(track);
            }
        }
    }
    None
}
