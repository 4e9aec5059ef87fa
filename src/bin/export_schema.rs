use anyhow::Result;
use std::{env, path::PathBuf};
use syllabus_harvester::schema::{self, FIELDS, SCHEMA_VERSION};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // Output directory defaults to ./schema
    let out_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("schema"));

    let (json_path, md_path) = schema::write_schema_files(&out_dir)?;
    info!(
        version = SCHEMA_VERSION,
        fields = FIELDS.len(),
        json = %json_path.display(),
        markdown = %md_path.display(),
        "schema exported"
    );
    Ok(())
}
