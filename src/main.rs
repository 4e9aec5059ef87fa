use anyhow::{anyhow, Context, Result};
use chrono::Local;
use reqwest::Client;
use std::{env, path::PathBuf};
use syllabus_harvester::{config::Settings, harvest};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: syllabus_harvester <local|live> [settings.yaml]";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) args + settings ──────────────────────────────────────────
    let mut args = env::args().skip(1);
    let mode = args.next().context(USAGE)?;
    let settings_path = args.next().map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref())?;

    // ─── 3) harvest ──────────────────────────────────────────────────
    let harvest = match mode.as_str() {
        "local" => {
            let dir = settings.html_dir.clone();
            tokio::task::spawn_blocking(move || harvest::harvest_local(&dir)).await??
        }
        "live" => {
            let client = Client::builder()
                .cookie_store(true)
                .build()
                .context("building HTTP client")?;
            harvest::harvest_live(&client, &settings).await?
        }
        other => return Err(anyhow!("unknown mode {:?}. {}", other, USAGE)),
    };
    info!(
        mode = %mode,
        seen = harvest.pages_seen,
        skipped = harvest.pages_skipped,
        records = harvest.records.len(),
        "harvest finished"
    );

    // ─── 4) write results under output/<date>/ ───────────────────────
    if harvest.records.is_empty() {
        warn!("no subjects were harvested");
        return Ok(());
    }
    let out_dir = settings
        .output_dir
        .join(Local::now().format("%Y-%m-%d").to_string());
    let (json, csv) = harvest::save(&harvest.records, &out_dir)?;
    info!(json = %json.display(), csv = %csv.display(), "all done");
    Ok(())
}
