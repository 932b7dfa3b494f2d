//! Caption retrieval and transcript segmentation
//!
//! The selected track's base URL serves dense timed-text XML with
//! `<text start="S" dur="D">` entries. The body is sanitized, parsed, and
//! the entries grouped into roughly 30-second paragraphs.
//!
//! Paragraph boundaries are detected by a wrap of the entry time's
//! 30-second bucket (`floor(t) % 30` shrinking between consecutive
//! entries), not by exact 30-second marks. Boundaries therefore drift with
//! entry timing, and a jump of a whole bucket goes undetected. That
//! approximation is part of the output contract; do not "fix" it.

use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::captions::CaptionTrack;
use crate::client::Fetch;
use crate::error::CaptionError;

/// Seconds per transcript paragraph bucket.
const PARAGRAPH_SECONDS: i64 = 30;

/// A segmented transcript: ordered paragraphs with no gaps or overlaps in
/// time coverage. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub start: f64,
    pub end: f64,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Literal entry timestamp in seconds, retained for deep-linking
    pub time: f64,
    pub text: String,
}

impl Line {
    /// Display timestamp, `m:ss` or `h:mm:ss`.
    pub fn timestamp(&self) -> String {
        timestamp(self.time)
    }
}

/// One parsed timed-text entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedText {
    pub start: f64,
    pub dur: f64,
    pub text: String,
}

/// Download and segment the transcript behind a caption track.
pub async fn fetch_transcript<C: Fetch>(
    client: &C,
    track: &CaptionTrack,
) -> Result<Transcript, CaptionError> {
    let response = client
        .get(&track.base_url)
        .await
        .map_err(|e| CaptionError::Request(e.to_string()))?;

    if !response.is_success() {
        warn!(
            "caption download returned status {}: {}",
            response.status,
            response.body.chars().take(200).collect::<String>()
        );
        return Err(CaptionError::Status {
            status: response.status,
        });
    }

    let sanitized = sanitize_timed_text(&response.body);
    let entries = parse_timed_text(&sanitized)?;
    Ok(segment_transcript(&entries))
}

static TAG_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));

/// Normalize raw timed-text markup before parsing: decode the
/// double-encoded entities the endpoint emits, collapse newlines to spaces
/// and drop the space runs left between adjacent tags.
pub fn sanitize_timed_text(body: &str) -> String {
    let body = body
        .replace("&amp;#39;", "'")
        .replace("&amp;quot;", "\"")
        .replace('\n', " ");
    TAG_GAP.replace_all(&body, "><").into_owned()
}

/// Parse sanitized markup into `(start, dur, text)` entries.
pub fn parse_timed_text(xml: &str) -> Result<Vec<TimedText>, CaptionError> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<(f64, f64)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                current = Some(timing_attributes(e));
                text.clear();
            }
            Ok(Event::Text(ref e)) => {
                if current.is_some() {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                if let Some((start, dur)) = current.take() {
                    entries.push(TimedText {
                        start,
                        dur,
                        text: std::mem::take(&mut text),
                    });
                }
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"text" => {
                let (start, dur) = timing_attributes(e);
                entries.push(TimedText {
                    start,
                    dur,
                    text: String::new(),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CaptionError::Markup(e.to_string())),
            _ => {}
        }
    }

    Ok(entries)
}

fn timing_attributes(element: &quick_xml::events::BytesStart<'_>) -> (f64, f64) {
    let mut start = 0.0;
    let mut dur = 0.0;
    for attr in element.attributes().flatten() {
        match attr.key.as_ref() {
            b"start" => {
                start = String::from_utf8_lossy(&attr.value)
                    .parse()
                    .unwrap_or(0.0);
            }
            b"dur" => {
                dur = String::from_utf8_lossy(&attr.value).parse().unwrap_or(0.0);
            }
            _ => {}
        }
    }
    (start, dur)
}

/// Group timed entries into paragraphs on 30-second bucket wraps.
///
/// Walks entries in order; when `floor(time) % 30` drops below the previous
/// entry's value the open paragraph is closed at the current time and a new
/// one starts there. The trailing paragraph is always emitted, even when
/// every entry fit a single bucket.
pub fn segment_transcript(entries: &[TimedText]) -> Transcript {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<Line> = Vec::new();
    let mut paragraph_start = 0.0_f64;
    let mut previous_time = 0.0_f64;

    for entry in entries {
        let time = entry.start;
        if bucket_offset(time) < bucket_offset(previous_time) {
            paragraphs.push(Paragraph {
                start: paragraph_start,
                end: time,
                lines: std::mem::take(&mut lines),
            });
            paragraph_start = time;
        }
        lines.push(Line {
            time,
            text: entry.text.replace('\n', " "),
        });
        previous_time = time;
    }

    let end = entries
        .last()
        .map(|entry| entry.start + entry.dur)
        .unwrap_or(paragraph_start);
    paragraphs.push(Paragraph {
        start: paragraph_start,
        end,
        lines,
    });

    Transcript { paragraphs }
}

fn bucket_offset(time: f64) -> i64 {
    (time.floor() as i64).rem_euclid(PARAGRAPH_SECONDS)
}

/// Deep link into a video at a whole-second offset.
pub fn deep_link(video_id: &str, seconds: f64) -> String {
    format!(
        "https://youtube.com/watch?v={video_id}&t={}",
        seconds.floor() as u64
    )
}

/// Display timestamp, `m:ss` below one hour and `h:mm:ss` above.
pub fn timestamp(seconds: f64) -> String {
    let total = seconds.floor() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
