// src/write.rs

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::{
    fs,
    io::Write,
    path::Path,
};
use tracing::{info, warn};

use crate::record::Record;
use crate::schema::FIELDS;

/// Separator used when a list field is flattened into one CSV cell.
pub const CSV_LIST_SEPARATOR: &str = ", ";

/// Write `bytes` to a hidden temp file next to `path`, then rename over it.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("no file name in {:?}", path))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let result = write_then_rename(&tmp_path, path, bytes);
    if result.is_err() && tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), "could not remove temp file: {}", e);
        }
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp =
        fs::File::create(tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    tmp.write_all(bytes)
        .with_context(|| format!("writing {:?}", tmp_path))?;
    tmp.sync_all()
        .with_context(|| format!("syncing {:?}", tmp_path))?;
    drop(tmp);

    fs::rename(tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))
}

/// Pretty JSON array, non-ASCII kept as-is, trailing newline.
pub fn write_json(records: &[Record], path: &Path) -> Result<()> {
    let mut body = serde_json::to_vec_pretty(records).context("serializing records")?;
    body.push(b'\n');
    write_atomic(path, &body)?;
    info!(path = %path.display(), records = records.len(), "wrote JSON");
    Ok(())
}

/// CSV with one column per field in schema order; list fields are joined.
pub fn write_csv(records: &[Record], path: &Path) -> Result<()> {
    let body = to_csv_bytes(records)?;
    write_atomic(path, &body)?;
    info!(path = %path.display(), records = records.len(), "wrote CSV");
    Ok(())
}

fn to_csv_bytes(records: &[Record]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(FIELDS.iter().map(|f| f.key))
        .context("writing CSV header")?;
    for record in records {
        let row: Vec<String> = record.to_map().into_iter().map(|(_, v)| csv_cell(v)).collect();
        wtr.write_record(&row)
            .with_context(|| format!("writing CSV row for {}", record.lecture_code))?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("flushing CSV: {}", e))
}

fn csv_cell(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(csv_cell)
            .collect::<Vec<_>>()
            .join(CSV_LIST_SEPARATOR),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
