//! File discovery and scanning

use crate::error::{Result, SpeedshiftError};
use crate::types::{AudioFormat, Job};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Recursively scan `source` for supported audio files and plan one job per file.
///
/// Output paths mirror the relative structure under `dest`. Jobs are sorted by
/// relative path so submission order and progress messages are reproducible.
/// If `dest` already exists inside `source`, it is not descended into.
pub fn scan(source: &Path, dest: &Path) -> Result<Vec<Job>> {
    if !source.exists() {
        return Err(SpeedshiftError::FileNotFound(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(SpeedshiftError::invalid(format!(
            "source must be a directory: {}",
            source.display()
        )));
    }

    let skip_dir = dest.canonicalize().ok();

    let walker = WalkDir::new(source)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_destination(entry, skip_dir.as_deref()));

    let mut jobs = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !AudioFormat::is_supported_path(entry.path()) {
            continue;
        }

        let relative = match entry.path().strip_prefix(source) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                warn!("Skipping {} (outside source root)", entry.path().display());
                continue;
            }
        };

        debug!("Discovered: {}", relative.display());
        jobs.push(Job::new(source, dest, relative));
    }

    jobs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    info!("Discovered {} audio files", jobs.len());

    if jobs.is_empty() {
        warn!("No supported audio files found in {}", source.display());
    }

    Ok(jobs)
}

fn is_destination(entry: &DirEntry, skip_dir: Option<&Path>) -> bool {
    let Some(skip_dir) = skip_dir else {
        return false;
    };
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let is_dest = entry
        .path()
        .canonicalize()
        .map(|p| p == skip_dir)
        .unwrap_or(false);
    if is_dest {
        debug!("Not descending into destination {}", entry.path().display());
    }
    is_dest
}

/// Default destination: a sibling of `source` named `Speedy_<source name>`
///
/// Relative inputs such as `.` or `..` are resolved first so the sibling is
/// taken from the real directory name.
pub fn default_output_dir(source: &Path) -> PathBuf {
    let source = source
        .canonicalize()
        .or_else(|_| std::path::absolute(source))
        .unwrap_or_else(|_| source.to_path_buf());
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("Speedy_{}", name))
}
