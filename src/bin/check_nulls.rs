//! Exit 0 when an exported JSON file holds no nulls, 1 when some record does,
//! 2 on usage or read errors. Empty strings are fine.

use anyhow::{Context, Result};
use serde_json::Value;
use std::{env, fs, path::Path, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const MAX_REPORTED: usize = 10;

fn has_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(has_null),
        Value::Object(map) => map.values().any(has_null),
        _ => false,
    }
}

fn load(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let Some(arg) = env::args().nth(1) else {
        error!("Usage: check_nulls <json-file>");
        return ExitCode::from(2);
    };
    let data = match load(Path::new(&arg)) {
        Ok(v) => v,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    let offenders: Vec<(usize, &Value)> = match &data {
        Value::Array(records) => records
            .iter()
            .enumerate()
            .filter(|(_, rec)| has_null(rec))
            .collect(),
        other if has_null(other) => vec![(0, other)],
        _ => Vec::new(),
    };

    if offenders.is_empty() {
        info!("no nulls found in {}", arg);
        return ExitCode::SUCCESS;
    }
    error!("found {} records containing nulls", offenders.len());
    for (idx, rec) in offenders.iter().take(MAX_REPORTED) {
        error!("record {}: {}", idx, rec);
    }
    ExitCode::from(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_nested_nulls() {
        assert!(has_null(&json!({"a": [1, null]})));
        assert!(has_null(&json!(null)));
        assert!(!has_null(&json!({"a": "", "b": [], "c": 0})));
    }
}
