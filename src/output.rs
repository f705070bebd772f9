use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::extractor::Extracted;

/// Where the aggregate is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Replace the file on every run.
    #[default]
    Overwrite,
    /// Write `<stem>-<YYYYMMDDTHHMMSS>.<ext>` next to the configured path.
    Timestamped,
}

pub fn resolve_path(base: &Path, mode: OutputMode, now: DateTime<Utc>) -> PathBuf {
    match mode {
        OutputMode::Overwrite => base.to_path_buf(),
        OutputMode::Timestamped => {
            let stem = base
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "construction_data".to_string());
            let ext = base
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "json".to_string());
            base.with_file_name(format!("{}-{}.{}", stem, now.format("%Y%m%dT%H%M%S"), ext))
        }
    }
}

/// Pretty-printed JSON array; non-ASCII text is kept as-is.
pub fn to_json(entries: &[Extracted]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

/// Write the aggregate to `path`, replacing any previous content.
#[instrument(skip(entries), fields(count = entries.len()))]
pub async fn write_aggregate(path: &Path, entries: &[Extracted]) -> anyhow::Result<String> {
    let json = to_json(entries)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json.as_bytes()).await?;

    info!(path = %path.display(), "wrote construction data");
    Ok(json)
}
