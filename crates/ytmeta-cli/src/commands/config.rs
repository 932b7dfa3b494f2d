use anyhow::Result;
use std::path::Path;
use ytmeta_core::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytmeta configuration\n");

    println!("[fetch]");
    let fields: Vec<String> = config
        .fetch
        .fields
        .iter()
        .map(|f| format!("{f:?}").to_lowercase())
        .collect();
    println!("  fields = {:?}", fields);
    match config.fetch.thumbnail_size {
        Some(size) => println!("  thumbnail_size = {:?}", format!("{size:?}").to_lowercase()),
        None => println!("  thumbnail_size = (disabled)"),
    }
    if let Some(ref url) = config.fetch.invidious_url {
        println!("  invidious_url = {:?}", url);
    } else {
        println!("  invidious_url = (discovered)");
    }
    println!("  max_attempts = {}", config.fetch.max_attempts);

    println!("\n[captions]");
    println!("  languages = {:?}", config.captions.languages);

    println!("\n[store]");
    println!("  auto_persist = {}", config.store.auto_persist);
    match config.store_dir() {
        Ok(dir) => println!("  directory = {:?}", dir),
        Err(_) => println!("  directory = (unavailable)"),
    }

    println!("\n[batch]");
    println!("  max_parallel = {}", config.batch.max_parallel);

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(config_dir) = dirs::config_dir() {
        println!("  2. {}/ytmeta/config.toml", config_dir.display());
    }
    println!("  3. Environment variables (YTMETA_*)");

    Ok(())
}
