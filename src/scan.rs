//! Resource discovery.
//!
//! Walks the working directory, tests every file against the manifest
//! patterns and derives the identifiers used by every later stage. The
//! returned `Vec<ResourceEntry>` is the single source of ordering for the
//! whole run: numeric IDs, object names and generated arrays all follow it.

use crate::config::{self, ResourceManifest, normalize_path};
use crate::error::BuildError;
use crate::lock::LOCK_FILE;
use crate::pattern::PatternSet;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Path relative to the working directory, `/`-separated
    pub path: String,
    /// Path with every non-alphanumeric byte replaced by `_`
    pub safe_id: String,
    /// Zero-based position in scan order
    pub index: usize,
}

impl ResourceEntry {
    pub fn new(path: &str, index: usize) -> Self {
        Self {
            path: path.to_string(),
            safe_id: safe_identifier(path),
            index,
        }
    }

    /// Enumerator name used in the generated `ResId`.
    pub fn enumerator(&self) -> String {
        self.safe_id.to_uppercase()
    }
}

/// Byte-wise mangling, the same rule objcopy applies when it names the
/// `_binary_*` symbols, so a multi-byte character yields one `_` per byte.
pub fn safe_identifier(path: &str) -> String {
    path.bytes()
        .map(|b| if b.is_ascii_alphanumeric() { b as char } else { '_' })
        .collect()
}

/// Scan `work_dir` for files selected by the manifest.
///
/// The walk is sorted by file name so repeated runs over an unchanged tree
/// produce the same order. The output directory, the lock marker and the
/// manifest itself never qualify as resources.
pub fn scan_resources(work_dir: &Path, manifest: &ResourceManifest) -> Result<Vec<ResourceEntry>> {
    let patterns = PatternSet::new(&manifest.resources)?;
    let output_dir = manifest.output_dir(work_dir);
    let mut entries = Vec::new();

    if patterns.is_empty() {
        return Ok(entries);
    }

    let walker = WalkDir::new(work_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| normalize_path(e.path()) != output_dir);

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", work_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = match entry.path().strip_prefix(work_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let rel_str = to_slash(rel);

        if is_reserved(&rel_str) || !patterns.matches(&rel_str) {
            continue;
        }

        entries.push(ResourceEntry::new(&rel_str, entries.len()));
    }

    validate_identifiers(&entries)?;
    Ok(entries)
}

/// Reject entries whose enumerators collide or are not valid C++ names.
pub fn validate_identifiers(entries: &[ResourceEntry]) -> Result<(), BuildError> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for entry in entries {
        let enumerator = entry.enumerator();
        if enumerator.starts_with(|c: char| c.is_ascii_digit()) || enumerator.is_empty() {
            return Err(BuildError::InvalidIdentifier {
                path: entry.path.clone(),
                identifier: enumerator,
            });
        }
        if let Some(first) = seen.get(&enumerator) {
            return Err(BuildError::IdentifierCollision {
                identifier: enumerator,
                first: first.to_string(),
                second: entry.path.clone(),
            });
        }
        seen.insert(enumerator, &entry.path);
    }
    Ok(())
}

fn is_reserved(rel: &str) -> bool {
    rel == LOCK_FILE || rel == config::JSON_MANIFEST || rel == config::TOML_MANIFEST
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
