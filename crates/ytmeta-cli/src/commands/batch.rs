use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::fs;

use crate::args::FetchOptions;
use crate::commands::apply_options;
use ytmeta_core::{Config, Entry, FetchOutcome, HttpClient, Pipeline};

pub async fn run(
    input: &Path,
    parallel: Option<usize>,
    options: &FetchOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_options(&mut config, options);
    let parallel = parallel.unwrap_or(config.batch.max_parallel).max(1);

    // Read videos from file
    let content = fs::read_to_string(input)
        .await
        .context("Failed to read input file")?;

    let videos: Vec<String> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect();

    if videos.is_empty() {
        println!("No videos found in input file");
        return Ok(());
    }

    let total_videos = videos.len();
    println!("Fetching {} videos with {} parallel workers\n", total_videos, parallel);

    let client = HttpClient::new()?;
    let pipeline = Pipeline::new(client, config)?;
    let force = options.force;

    let multi = MultiProgress::new();
    let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap()
        .tick_chars("=>-");

    let results: Vec<(String, Option<FetchOutcome>)> = stream::iter(videos.iter().enumerate())
        .map(|(idx, video)| {
            let pipeline = &pipeline;
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(spinner_style.clone());

            async move {
                pb.set_message(format!(
                    "[{}/{}] {}",
                    idx + 1,
                    total_videos,
                    truncate(video, 50)
                ));
                pb.enable_steady_tick(std::time::Duration::from_millis(100));

                let outcome = pipeline.fetch_one(&Entry::new(video.clone()), force).await;

                match &outcome {
                    Some(o) if !o.failed() => {
                        pb.finish_with_message(format!(
                            "[{}/{}] Done: {}",
                            idx + 1,
                            total_videos,
                            o.video_id
                        ));
                    }
                    Some(o) => {
                        let tags: Vec<&str> =
                            o.record.errors.iter().map(|tag| tag.as_str()).collect();
                        pb.finish_with_message(format!(
                            "[{}/{}] Partial: {} (failed: {})",
                            idx + 1,
                            total_videos,
                            o.video_id,
                            tags.join(", ")
                        ));
                    }
                    None => {
                        pb.finish_with_message(format!(
                            "[{}/{}] Skipped (not a video): {}",
                            idx + 1,
                            total_videos,
                            truncate(video, 50)
                        ));
                    }
                }

                (video.clone(), outcome)
            }
        })
        .buffer_unordered(parallel)
        .collect()
        .await;

    // Summary
    let complete: Vec<_> = results
        .iter()
        .filter(|(_, o)| matches!(o, Some(o) if !o.failed()))
        .collect();
    let partial: Vec<_> = results
        .iter()
        .filter(|(_, o)| matches!(o, Some(o) if o.failed()))
        .collect();
    let skipped = results.iter().filter(|(_, o)| o.is_none()).count();

    println!("\n=== Batch Complete ===");
    println!("Complete: {}", complete.len());
    println!("Partial: {}", partial.len());
    println!("Skipped: {}", skipped);

    if !partial.is_empty() {
        println!("\nPartial fetches:");
        for (video, outcome) in &partial {
            if let Some(outcome) = outcome {
                let tags: Vec<&str> = outcome.record.errors.iter().map(|t| t.as_str()).collect();
                println!("  {} - failed: {}", video, tags.join(", "));
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
