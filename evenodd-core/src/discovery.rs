use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::layout::disk_path;

/// Presence scan of the per-disk copies of one logical file.
#[derive(Debug, Clone)]
pub struct DiskScan {
    /// Disk indices whose copy is absent, ascending.
    pub missing: Vec<usize>,
    /// Lowest disk index whose copy is present.
    pub first_ok: Option<usize>,
}

/// Classify `disk_0/<name> .. disk_{count-1}/<name>` as present or absent.
///
/// Callers that do not yet know `p` probe with `MAX_P + 2` slots to find a
/// surviving header, then rescan with the real `p + 2`.
pub fn scan_disks(root: &Path, name: &Path, count: usize) -> DiskScan {
    let mut missing = Vec::new();
    let mut first_ok = None;
    for d in 0..count {
        if disk_path(root, d, name).is_file() {
            if first_ok.is_none() {
                first_ok = Some(d);
            }
        } else {
            missing.push(d);
        }
    }
    DiskScan { missing, first_ok }
}

/// Relative paths of the regular files under one disk directory, sorted.
/// A missing directory yields no files.
pub fn walk_disk(disk_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !disk_dir.is_dir() {
        return Ok(files);
    }
    for ent in WalkDir::new(disk_dir).min_depth(1) {
        let ent = ent?;
        if !ent.file_type().is_file() {
            continue;
        }
        let rel = ent
            .path()
            .strip_prefix(disk_dir)
            .with_context(|| format!("walked path not under {:?}", disk_dir))?;
        files.push(rel.to_path_buf());
    }
    files.sort();
    Ok(files)
}
