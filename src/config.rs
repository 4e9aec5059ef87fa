// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://momiji.hiroshima-u.ac.jp/syllabusHtml/";

/// Harvester settings, read from YAML. Every key is optional.
///
/// ```yaml
/// base_url: https://momiji.hiroshima-u.ac.jp/syllabusHtml/
/// html_dir: tests/fixtures/html/small
/// output_dir: output
/// live_codes: [2025_AA_10000100]
/// max_retries: 3
/// retry_delay_ms: 1000
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub html_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Page names (without `.html`) fetched in live mode.
    pub live_codes: Vec<String>,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            html_dir: PathBuf::from("tests/fixtures/html/small"),
            output_dir: PathBuf::from("output"),
            live_codes: Vec::new(),
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl Settings {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            None => Self::default(),
            Some(p) => {
                let text =
                    fs::read_to_string(p).with_context(|| format!("reading settings {:?}", p))?;
                serde_yaml::from_str(&text).with_context(|| format!("parsing settings {:?}", p))?
            }
        };
        settings.base_url()?;
        Ok(settings)
    }

    /// Base URL with a guaranteed trailing slash so page names join under it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("invalid base_url {:?}", self.base_url))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
