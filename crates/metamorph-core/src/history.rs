use serde_json::Value;
use thiserror::Error;

use crate::{CommitRecord, FileChange};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("commit history is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("commit history must be a JSON array of commits")]
    NotAnArray,
}

/// Decodes a most-recent-first commit list in the hosting API's shape.
///
/// Only a non-JSON document or a non-array top level is an error. Anything
/// malformed below that is dropped at the smallest enclosing record.
pub fn parse_history(json: &str) -> Result<Vec<CommitRecord>, HistoryError> {
    let doc: Value = serde_json::from_str(json)?;
    let Value::Array(items) = doc else {
        return Err(HistoryError::NotAnArray);
    };
    Ok(items.iter().map(commit_from_value).collect())
}

pub fn commit_from_value(v: &Value) -> CommitRecord {
    let files = match v.get("files").and_then(Value::as_array) {
        Some(files) => files.iter().filter_map(file_from_value).collect(),
        None => Vec::new(),
    };

    CommitRecord {
        sha: str_at(v, &["sha"]),
        author: str_at(v, &["commit", "author", "name"]),
        date: str_at(v, &["commit", "author", "date"]),
        message: str_at(v, &["commit", "message"]),
        files,
    }
}

fn file_from_value(v: &Value) -> Option<FileChange> {
    let filename = v.get("filename")?.as_str()?;
    if filename.is_empty() {
        tracing::debug!("skipping file record with empty filename");
        return None;
    }

    let changes = v.get("changes").and_then(Value::as_u64).or_else(|| {
        let added = v.get("additions")?.as_u64()?;
        let removed = v.get("deletions")?.as_u64()?;
        Some(added.saturating_add(removed))
    });
    let Some(changes) = changes else {
        tracing::debug!(filename, "skipping file record without change count");
        return None;
    };

    Some(FileChange::new(filename, changes))
}

fn str_at(v: &Value, path: &[&str]) -> Option<String> {
    let mut cur = v;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str().map(str::to_string)
}
