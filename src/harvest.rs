// src/harvest.rs

use anyhow::{anyhow, Context, Result};
use glob::glob;
use rayon::prelude::*;
use reqwest::Client;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

use crate::{
    config::Settings,
    extract,
    fetch::{self, RetryPolicy},
    record::Record,
    write,
};

/// Outcome of one harvest run.
#[derive(Debug, Default)]
pub struct Harvest {
    pub records: Vec<Record>,
    pub pages_seen: usize,
    /// Pages that were read but produced no record.
    pub pages_skipped: usize,
}

impl Harvest {
    fn from_results(results: Vec<Option<Record>>) -> Self {
        let pages_seen = results.len();
        let records: Vec<Record> = results.into_iter().flatten().collect();
        Self {
            pages_skipped: pages_seen - records.len(),
            records,
            pages_seen,
        }
    }
}

/// `*.html` files directly under `dir`, sorted by path.
pub fn list_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("html directory not found: {:?}", dir));
    }
    let pattern = format!("{}/*.html", dir.display());
    let mut pages: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("skipping unreadable path: {}", e);
                None
            }
        })
        .collect();
    pages.sort();
    Ok(pages)
}

/// Parse every local page under `dir` in parallel. Output keeps file order.
pub fn harvest_local(dir: &Path) -> Result<Harvest> {
    let pages = list_pages(dir)?;
    info!(dir = %dir.display(), pages = pages.len(), "harvesting local pages");

    let results: Vec<Option<Record>> = pages
        .par_iter()
        .map(|path| {
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match fs::read_to_string(path) {
                Ok(html) => extract::parse(&html, &id),
                Err(e) => {
                    error!(source = %id, "reading page failed: {}", e);
                    None
                }
            }
        })
        .collect();

    Ok(Harvest::from_results(results))
}

/// Fetch and parse each configured page code from the live site, one at a time.
pub async fn harvest_live(client: &Client, settings: &Settings) -> Result<Harvest> {
    if settings.live_codes.is_empty() {
        return Err(anyhow!("live mode needs at least one entry in live_codes"));
    }
    let base = settings.base_url()?;
    let policy = RetryPolicy {
        max_retries: settings.max_retries,
        delay: settings.retry_delay(),
    };
    info!(base = %base, pages = settings.live_codes.len(), "harvesting live pages");

    let mut results = Vec::with_capacity(settings.live_codes.len());
    for code in &settings.live_codes {
        let url = fetch::page_url(&base, code)?;
        match fetch::fetch_page(client, &url, policy).await {
            Ok(html) => results.push(extract::parse(&html, url.as_str())),
            Err(e) => {
                error!(source = %url, "fetch failed: {:#}", e);
                results.push(None);
            }
        }
    }
    Ok(Harvest::from_results(results))
}

/// Write `syllabus.json` and `syllabus.csv` into `out_dir`.
pub fn save(records: &[Record], out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {:?}", out_dir))?;
    let json_path = out_dir.join("syllabus.json");
    let csv_path = json_path.with_extension("csv");
    write::write_json(records, &json_path)?;
    write::write_csv(records, &csv_path)?;
    Ok((json_path, csv_path))
}
