use anyhow::Context;
use metamorph_core::export::ExportFormat;
use metamorph_core::{parse_history, CommitRecord};
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_history(path: &Path) -> anyhow::Result<Vec<CommitRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read history {}", path.display()))?;
    parse_history(&json).with_context(|| format!("failed to decode history {}", path.display()))
}

/// Writes an export under its default file name in `dir`, replacing any previous one.
pub fn write_artifact(dir: &Path, format: ExportFormat, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(format.file_name());
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
