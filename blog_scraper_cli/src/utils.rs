use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pretty-print `data` as JSON into `dir/filename`, creating `dir` if needed.
pub fn save_json<T: Serialize>(data: &T, dir: &Path, filename: &str) -> anyhow::Result<PathBuf> {
    save_text(&serde_json::to_string_pretty(data)?, dir, filename)
}

pub fn save_text(content: &str, dir: &Path, filename: &str) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    info!(path = %path.display(), "written");
    Ok(path)
}
