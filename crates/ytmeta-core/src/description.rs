//! Video metadata retrieval from mirror servers
//!
//! One fetch is a bounded retry loop: pick a mirror, hit its video endpoint,
//! parse the payload. Transport failures, bad statuses and malformed bodies
//! all consume one attempt and resample a mirror; resampling is uniform and
//! may land on the same mirror again. Having no mirror at all is terminal.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::Fetch;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::servers::ServerDirectory;

/// Normalized description-side metadata for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionData {
    /// Duration in seconds, as reported by the mirror
    pub length: Option<u64>,
    /// Thumbnail URL for the configured size tier
    pub thumbnail: Option<String>,
    /// Description markup, newlines normalized to `<br>`
    pub description: Option<String>,
}

/// Raw shape of the mirror's `/api/v1/videos/<id>` payload.
#[derive(Debug, Deserialize)]
struct VideoPayload {
    #[serde(rename = "lengthSeconds")]
    length_seconds: Option<u64>,
    #[serde(rename = "descriptionHtml")]
    description_html: Option<String>,
    #[serde(rename = "videoThumbnails", default)]
    video_thumbnails: Vec<ThumbnailVariant>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailVariant {
    url: String,
}

/// Fetch and normalize description-side metadata for `video_id`.
///
/// Makes at most `config.max_attempts` requests before giving up with
/// [`FetchError::Exhausted`].
pub async fn fetch_description<C: Fetch>(
    client: &C,
    servers: &ServerDirectory,
    video_id: &str,
    config: &FetchConfig,
) -> Result<DescriptionData, FetchError> {
    let fields = config.api_fields();

    let mut attempts_left = config.max_attempts;
    while attempts_left > 0 {
        let server = servers.pick(client).await.ok_or(FetchError::NoServer)?;
        let url = format!("{server}/api/v1/videos/{video_id}?fields={fields}");
        debug!("fetching metadata: {url}");

        match attempt(client, &url, config).await {
            Ok(data) => return Ok(data),
            // Transport and payload failures alike cost one attempt; the
            // error text is what tells them apart
            Err(e) => warn!("metadata fetch from {server} failed: {e}"),
        }
        attempts_left -= 1;
    }

    Err(FetchError::Exhausted {
        attempts: config.max_attempts,
    })
}

async fn attempt<C: Fetch>(
    client: &C,
    url: &str,
    config: &FetchConfig,
) -> Result<DescriptionData, FetchError> {
    let response = client.get(url).await?;
    if !response.is_success() {
        return Err(FetchError::Request(format!(
            "server returned status {}",
            response.status
        )));
    }
    let payload: VideoPayload =
        serde_json::from_str(&response.body).map_err(|e| FetchError::Payload(e.to_string()))?;
    Ok(normalize(payload, config))
}

fn normalize(payload: VideoPayload, config: &FetchConfig) -> DescriptionData {
    let thumbnail = config.thumbnail_size.and_then(|size| {
        payload
            .video_thumbnails
            .get(size.variant_index())
            .map(|variant| variant.url.clone())
    });

    let description = payload
        .description_html
        .map(|html| html.replace('\n', "<br>"));

    DescriptionData {
        length: payload.length_seconds,
        thumbnail,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ThumbnailSize};
    use crate::testing::MockClient;

    fn fetch_config() -> FetchConfig {
        Config::default().fetch
    }

    fn directory() -> ServerDirectory {
        ServerDirectory::new(Some("https://mirror.example".to_string()))
    }

    #[tokio::test]
    async fn normalizes_the_mirror_payload() {
        let body = r#"{
            "lengthSeconds": 125,
            "descriptionHtml": "line1\nline2",
            "videoThumbnails": [
                {"url": "q0"}, {"url": "q1"}, {"url": "q2"}, {"url": "q3"}, {"url": "T"}
            ]
        }"#;
        let client = MockClient::new().route("/api/v1/videos/abc123", 200, body);
        let mut config = fetch_config();
        config.thumbnail_size = Some(ThumbnailSize::Small);

        let data = fetch_description(&client, &directory(), "abc123", &config)
            .await
            .unwrap();

        assert_eq!(data.length, Some(125));
        assert_eq!(data.description.as_deref(), Some("line1<br>line2"));
        assert_eq!(data.thumbnail.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn requests_only_the_configured_fields() {
        let client = MockClient::new().route("/api/v1/videos/", 200, "{}");
        fetch_description(&client, &directory(), "abc123", &fetch_config())
            .await
            .unwrap();

        let url = client.requests().pop().unwrap();
        assert!(url.ends_with(
            "/api/v1/videos/abc123?fields=lengthSeconds,videoThumbnails,descriptionHtml"
        ));
    }

    #[tokio::test]
    async fn disabled_tier_skips_thumbnail_selection() {
        let body = r#"{"videoThumbnails": [{"url":"a"},{"url":"b"},{"url":"c"}]}"#;
        let client = MockClient::new().route("/api/v1/videos/", 200, body);
        let mut config = fetch_config();
        config.thumbnail_size = None;

        let data = fetch_description(&client, &directory(), "abc123", &config)
            .await
            .unwrap();
        assert_eq!(data.thumbnail, None);
    }

    #[tokio::test]
    async fn short_variant_list_yields_no_thumbnail() {
        let body = r#"{"videoThumbnails": [{"url":"a"},{"url":"b"}]}"#;
        let client = MockClient::new().route("/api/v1/videos/", 200, body);
        let data = fetch_description(&client, &directory(), "abc123", &fetch_config())
            .await
            .unwrap();
        assert_eq!(data.thumbnail, None);
    }

    #[tokio::test]
    async fn persistent_failure_consumes_every_attempt() {
        let client = MockClient::new().route("/api/v1/videos/", 500, "oops");
        let err = fetch_description(&client, &directory(), "abc123", &fetch_config())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 3 }));
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn malformed_payload_consumes_an_attempt() {
        let client = MockClient::new().route("/api/v1/videos/", 200, "not json");
        let err = fetch_description(&client, &directory(), "abc123", &fetch_config())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 3 }));
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn no_mirror_is_terminal_and_unretried() {
        // No override and an empty discovered pool
        let client = MockClient::new().route("instances.json", 200, "[]");
        let servers = ServerDirectory::new(None);
        let err = fetch_description(&client, &servers, "abc123", &fetch_config())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NoServer));
        // Only the discovery request went out
        assert_eq!(client.request_count(), 1);
    }
}
