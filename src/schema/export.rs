// src/schema/export.rs

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use super::fields::{FieldKind, SCHEMA_VERSION, FIELDS};
use crate::write::write_atomic;

/// JSON Schema for one exported record. Every property is required and none
/// is nullable.
pub fn json_schema() -> Value {
    let mut props = Map::new();
    for spec in FIELDS {
        let prop = match spec.kind {
            FieldKind::Text => json!({ "type": "string", "title": spec.label }),
            FieldKind::Integer => json!({ "type": "integer", "minimum": 0, "title": spec.label }),
            FieldKind::List => json!({
                "type": "array",
                "items": { "type": "string" },
                "title": spec.label,
            }),
        };
        props.insert(spec.key.to_string(), prop);
    }
    let required: Vec<&str> = FIELDS.iter().map(|f| f.key).collect();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Subject",
        "version": SCHEMA_VERSION,
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false,
    })
}

/// One Markdown table row per field, in schema order.
pub fn markdown_table() -> String {
    let mut out = String::new();
    out.push_str("# Subject JSON Schema\n\n");
    let _ = writeln!(out, "Schema version `{}`. Every field is required and never null.\n", SCHEMA_VERSION);
    out.push_str("| field | header | JSON type |\n");
    out.push_str("|---|---|---|\n");
    for spec in FIELDS {
        let ty = match spec.kind {
            FieldKind::List => "array<string>",
            other => other.json_type(),
        };
        let _ = writeln!(out, "| `{}` | {} | {} |", spec.key, spec.label.replace('\n', " "), ty);
    }
    out
}

/// Write `subject.schema.json` and `SUBJECT_SCHEMA.md` into `out_dir`.
pub fn write_schema_files<P: AsRef<Path>>(out_dir: P) -> Result<(PathBuf, PathBuf)> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).with_context(|| format!("creating {:?}", out_dir))?;

    let json_path = out_dir.join("subject.schema.json");
    let mut body = serde_json::to_vec_pretty(&json_schema()).context("serializing schema")?;
    body.push(b'\n');
    write_atomic(&json_path, &body)?;

    let md_path = out_dir.join("SUBJECT_SCHEMA.md");
    write_atomic(&md_path, markdown_table().as_bytes())?;

    Ok((json_path, md_path))
}
