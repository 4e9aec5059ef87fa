// src/fetch/mod.rs

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Retry policy for page downloads.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// URL of the syllabus page named `code` (e.g. `2025_AA_10000100`) under `base`.
pub fn page_url(base: &Url, code: &str) -> Result<Url> {
    let name = if code.ends_with(".html") {
        code.to_string()
    } else {
        format!("{}.html", code)
    };
    base.join(&name)
        .with_context(|| format!("joining {} onto {}", name, base))
}

/// GET one page as text, retrying transport errors and non-success statuses.
pub async fn fetch_page(client: &Client, url: &Url, policy: RetryPolicy) -> Result<String> {
    let attempts = policy.max_retries.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!(%url, attempt, "fetching page");

        let failure = match client.get(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(html) => return Ok(html),
                Err(e) => anyhow!(e).context(format!("reading body from {}", url)),
            },
            Ok(resp) => anyhow!("HTTP error {} for {}", resp.status(), url),
            Err(e) => anyhow!(e).context(format!("GET {}", url)),
        };

        if attempt >= attempts {
            return Err(failure);
        }
        warn!(%url, attempt, error = %failure, "fetch failed, retrying");
        sleep(policy.delay).await;
    }
}
