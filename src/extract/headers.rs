// src/extract/headers.rs

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{error, info, warn};

use super::table::header_text;
use crate::schema::{canonicalize, FIELDS};

static DETAIL_HEAD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table > tbody > tr > th.detail-head")
        .expect("detail-head selector should parse")
});

/// Labels of every `th.detail-head` cell on the page, in document order.
pub fn extract_headers(doc: &Html) -> Vec<String> {
    doc.select(&DETAIL_HEAD).map(header_text).collect()
}

/// Page headers include labels we cannot map; the page is not safe to read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unexpected headers: {unexpected:?}")]
pub struct HeaderMismatch {
    pub unexpected: BTreeSet<String>,
    pub missing: BTreeSet<&'static str>,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderReport {
    /// Canonical labels with no observed counterpart.
    pub missing: BTreeSet<&'static str>,
}

impl HeaderReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare observed labels against the canonical set.
///  - anything that does not canonicalize is unexpected → fatal
///  - canonical fields never observed are missing → warning only
pub fn validate_headers(
    observed: &[String],
    source_id: &str,
) -> Result<HeaderReport, HeaderMismatch> {
    let mut unexpected: BTreeSet<String> = BTreeSet::new();
    let mut seen: BTreeSet<&'static str> = BTreeSet::new();
    for label in observed {
        match canonicalize(label) {
            Some(spec) => {
                seen.insert(spec.key);
            }
            None => {
                unexpected.insert(label.clone());
            }
        }
    }
    let missing: BTreeSet<&'static str> = FIELDS
        .iter()
        .filter(|f| !seen.contains(f.key))
        .map(|f| f.label)
        .collect();

    if !unexpected.is_empty() {
        error!(source = %source_id, ?unexpected, "unexpected headers found");
        if !missing.is_empty() {
            warn!(source = %source_id, ?missing, "expected headers missing");
        }
        return Err(HeaderMismatch {
            unexpected,
            missing,
        });
    }
    if missing.is_empty() {
        info!(source = %source_id, "headers validated");
    } else {
        warn!(source = %source_id, ?missing, "expected headers missing");
    }
    Ok(HeaderReport { missing })
}
