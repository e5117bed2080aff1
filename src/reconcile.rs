//! Pruning of stale embeddable units.
//!
//! After the embedding step, `<output>/objs` must contain exactly the
//! objects produced by this run. Anything else was left by an earlier run
//! (a resource dropped from the manifest) or by hand, and would otherwise be
//! linked into the final artifact. Only the immediate directory is scanned;
//! sub-directories are never produced by this tool and are removed whole.

use crate::platform::EmbeddableUnit;
use anyhow::{Context, Result};
use colored::*;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed_files: Vec<String>,
    pub removed_dirs: Vec<String>,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.removed_files.is_empty() && self.removed_dirs.is_empty()
    }
}

pub fn prune_stale_objects(objs_dir: &Path, units: &[EmbeddableUnit]) -> Result<PruneReport> {
    let mut report = PruneReport::default();
    if !objs_dir.exists() {
        return Ok(report);
    }

    let expected: HashSet<&str> = units.iter().filter_map(|u| u.object_file()).collect();

    let mut entries: Vec<_> = fs::read_dir(objs_dir)
        .with_context(|| format!("Failed to read {}", objs_dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            println!("   {} Removing directory: {}", "🗑️".red(), name);
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            report.removed_dirs.push(name);
        } else if !expected.contains(name.as_str()) {
            println!("   {} Removing stale object: {}", "🗑️".red(), name);
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            report.removed_files.push(name);
        }
    }

    Ok(report)
}
