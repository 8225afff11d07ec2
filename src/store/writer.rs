//! Merging derived content into store documents.
//!
//! Three write modes exist and nothing else touches the store:
//! - sections keyed by a header marker, inserted only if the marker is absent
//! - full overwrite (reports, rolling summaries)
//! - new timestamped batch files that never replace older ones

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Result of an insert-if-absent merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeOutcome {
    Inserted,
    AlreadyPresent,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn read_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

fn separator_for(existing: &str) -> &'static str {
    if existing.is_empty() || existing.ends_with("\n\n") {
        ""
    } else if existing.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    }
}

fn append(path: &Path, text: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// Append `marker` followed by `body` unless the document already holds `marker`.
pub fn insert_section_if_absent(path: &Path, marker: &str, body: &str) -> Result<MergeOutcome> {
    let existing = read_or_empty(path)?;
    if existing.contains(marker) {
        tracing::debug!("section '{}' already present in {}", marker, path.display());
        return Ok(MergeOutcome::AlreadyPresent);
    }

    let text = format!("{}{}\n{}", separator_for(&existing), marker, body);
    append(path, &text)?;
    tracing::info!("inserted section '{}' into {}", marker, path.display());
    Ok(MergeOutcome::Inserted)
}

/// Merge identified entries under `marker`.
///
/// Inserts `section_body` when the marker is missing; otherwise adds only the
/// entries whose id does not occur in the document yet, at the end of the
/// marker's section (before the next `## ` heading). Returns the number of
/// entries written.
pub fn merge_entries_by_id(
    path: &Path,
    marker: &str,
    section_body: &str,
    entries: &[(String, String)],
) -> Result<usize> {
    let existing = read_or_empty(path)?;
    let Some(marker_at) = existing.find(marker) else {
        insert_section_if_absent(path, marker, section_body)?;
        return Ok(entries.len());
    };

    let fresh: Vec<&str> = entries
        .iter()
        .filter(|(id, _)| !existing.contains(id.as_str()))
        .map(|(_, text)| text.as_str())
        .collect();
    if fresh.is_empty() {
        tracing::debug!("no new entries for '{}' in {}", marker, path.display());
        return Ok(0);
    }

    let body_start = marker_at + marker.len();
    let section_end = existing[body_start..]
        .find("\n## ")
        .map(|i| body_start + i + 1)
        .unwrap_or(existing.len());
    let (head, tail) = existing.split_at(section_end);

    let mut merged = format!("{}{}{}", head, separator_for(head), fresh.concat());
    if !tail.is_empty() {
        merged.push_str(separator_for(&merged));
        merged.push_str(tail);
    }
    overwrite(path, &merged)?;
    tracing::info!("merged {} entries into '{}' in {}", fresh.len(), marker, path.display());
    Ok(fresh.len())
}

/// Replace the document with `content`.
pub fn overwrite(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content)?;
    Ok(())
}

/// Write a new `<prefix>-<timestamp>.<ext>` file in `dir`.
///
/// The name never collides with an earlier batch: a numeric suffix is added
/// when two batches share a timestamp.
pub fn write_batch(
    dir: &Path,
    prefix: &str,
    ext: &str,
    content: &str,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = at.format("%Y%m%d_%H%M%S_%3f").to_string();

    let mut path = dir.join(format!("{}-{}.{}", prefix, stamp, ext));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}-{}-{}.{}", prefix, stamp, n, ext));
        n += 1;
    }

    fs::write(&path, content)?;
    tracing::info!("wrote batch {}", path.display());
    Ok(path)
}

/// Append `content` to a document, creating it with `preamble` first.
pub fn append_with_preamble(path: &Path, preamble: &str, content: &str) -> Result<()> {
    if !path.exists() {
        overwrite(path, preamble)?;
    }
    let existing = read_or_empty(path)?;
    append(path, &format!("{}{}", separator_for(&existing), content))
}
