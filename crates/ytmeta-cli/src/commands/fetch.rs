use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::args::FetchOptions;
use crate::commands::apply_options;
use ytmeta_core::{transcript, Config, Entry, FetchOutcome, HttpClient, Pipeline};

pub async fn run(
    videos: &[String],
    options: &FetchOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_options(&mut config, options);

    let client = HttpClient::new()?;
    let pipeline = Pipeline::new(client, config)?;

    let entries: Vec<Entry> = videos.iter().map(Entry::new).collect();
    let skipped: Vec<&Entry> = entries.iter().filter(|e| e.video_id().is_none()).collect();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?.tick_chars("=>-"));
    pb.set_message(format!("Fetching {} video(s)...", entries.len() - skipped.len()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcomes = pipeline.fetch_batch(&entries, options.force).await;
    pb.finish_and_clear();

    for entry in skipped {
        eprintln!("Skipped (not a video): {}", entry.id);
    }

    if options.json {
        let mut map = serde_json::Map::new();
        for outcome in &outcomes {
            map.insert(
                outcome.video_id.clone(),
                serde_json::to_value(&outcome.record)?,
            );
        }
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for outcome in &outcomes {
            print_outcome(outcome);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &FetchOutcome) {
    match outcome.title {
        Some(ref title) => println!("{} ({})", title, outcome.video_id),
        None => println!("{}", outcome.video_id),
    }

    let record = &outcome.record;
    if let Some(length) = record.length {
        println!("  duration:    {}", transcript::timestamp(length as f64));
    }
    if let Some(ref thumbnail) = record.thumbnail {
        println!("  thumbnail:   {thumbnail}");
    }
    if let Some(ref description) = record.description {
        println!("  description: {} chars", description.len());
    }
    if let Some(ref caption) = record.caption {
        let lines: usize = caption.paragraphs.iter().map(|p| p.lines.len()).sum();
        println!(
            "  captions:    {} paragraphs, {} lines",
            caption.paragraphs.len(),
            lines
        );
        if let Some(paragraph) = caption.paragraphs.first() {
            println!(
                "  first line:  {}",
                transcript::deep_link(&outcome.video_id, paragraph.start)
            );
        }
    }
    if !record.errors.is_empty() {
        let tags: Vec<&str> = record.errors.iter().map(|tag| tag.as_str()).collect();
        println!("  failed:      {}", tags.join(", "));
    }
}
