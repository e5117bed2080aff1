//! Manifest parsing (`resources.json` / `resources.toml`).
//!
//! ```json
//! {
//!     "resources": ["*.svg", "fonts/*.ttf"],
//!     "output": "build",
//!     "project_name": "badgeres"
//! }
//! ```

use crate::error::BuildError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const JSON_MANIFEST: &str = "resources.json";
pub const TOML_MANIFEST: &str = "resources.toml";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResourceManifest {
    /// Glob patterns selecting resource files, in priority order
    #[serde(default)]
    pub resources: Vec<String>,
    /// Output directory, relative to the working directory unless absolute
    pub output: String,
    pub project_name: String,
    /// C++ namespace of the generated API
    pub namespace: Option<String>,
    /// Directory under `<output>/include` holding `resources.h`
    pub include_dir: Option<String>,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ToolsConfig {
    pub objcopy: Option<String>,
    pub ld: Option<String>,
    pub cc: Option<String>,
    /// BFD output target for objcopy (e.g. `elf64-x86-64`)
    pub elf_target: Option<String>,
    /// BFD architecture for objcopy (e.g. `i386:x86-64`)
    pub elf_arch: Option<String>,
}

impl ResourceManifest {
    pub fn namespace(&self) -> String {
        self.namespace
            .clone()
            .unwrap_or_else(|| format!("{}::resources", self.project_name))
    }

    pub fn include_dir(&self) -> &str {
        self.include_dir.as_deref().unwrap_or(&self.project_name)
    }

    /// Output directory resolved against `work_dir`, `.` and `..` folded.
    pub fn output_dir(&self, work_dir: &Path) -> PathBuf {
        normalize_path(&work_dir.join(&self.output))
    }

    fn validate(&self) -> Result<(), BuildError> {
        if !is_identifier(&self.project_name) {
            return Err(BuildError::InvalidManifest(format!(
                "project_name '{}' must be a C/C++ identifier",
                self.project_name
            )));
        }
        if self.output.trim().is_empty() {
            return Err(BuildError::InvalidManifest(
                "output must not be empty".to_string(),
            ));
        }
        if normalize_path(Path::new(&self.output)).as_os_str().is_empty() {
            return Err(BuildError::InvalidManifest(format!(
                "output '{}' must not be the working directory itself",
                self.output
            )));
        }
        let namespace = self.namespace();
        if !namespace.split("::").all(is_identifier) {
            return Err(BuildError::InvalidManifest(format!(
                "namespace '{}' is not a valid C++ namespace",
                namespace
            )));
        }
        if self.include_dir().is_empty() {
            return Err(BuildError::InvalidManifest(
                "include_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Lexically fold `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Path of the manifest inside `work_dir`, JSON first.
pub fn manifest_path(work_dir: &Path) -> Option<PathBuf> {
    [JSON_MANIFEST, TOML_MANIFEST]
        .iter()
        .map(|name| work_dir.join(name))
        .find(|p| p.is_file())
}

pub fn load_manifest(work_dir: &Path) -> Result<ResourceManifest> {
    if !work_dir.is_dir() {
        return Err(BuildError::MissingWorkDir(work_dir.to_path_buf()).into());
    }
    let path =
        manifest_path(work_dir).ok_or_else(|| BuildError::MissingManifest(work_dir.to_path_buf()))?;

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let manifest: ResourceManifest = if path.extension().is_some_and(|e| e == "toml") {
        toml::from_str(&content)
            .map_err(|e| BuildError::InvalidManifest(format!("{}: {}", path.display(), e)))?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| BuildError::InvalidManifest(format!("{}: {}", path.display(), e)))?
    };

    manifest.validate()?;
    Ok(manifest)
}
