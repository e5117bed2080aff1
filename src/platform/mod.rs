//! Platform embedding strategies.
//!
//! Exactly one strategy is active per run, chosen from the host operating
//! system:
//!
//! - **ELF** (Linux and other Unix): `objcopy` turns each resource into a
//!   relocatable object exposing `_binary_<id>_start` / `_binary_<id>_end`
//! - **Mach-O** (macOS): `ld -r -sectcreate` places each resource in its
//!   own section `_res_sec_<n>` of the `binary` segment
//! - **PE** (Windows): a `win.rc` script with one `RCDATA` line per
//!   resource, compiled later by the consuming build
//!
//! All three take the scanned entry list and return one [`EmbeddableUnit`]
//! per entry, in the same order, so code generation stays platform-agnostic.

pub mod elf;
pub mod macho;
pub mod pe;
pub mod tools;

pub use tools::{SystemRunner, ToolCommand, ToolRunner, Tools};

use crate::scan::ResourceEntry;
use anyhow::Result;
use indicatif::ProgressBar;
use std::fmt;
use std::path::{Path, PathBuf};

/// Subfolder of the output directory holding ELF/Mach-O objects.
pub const OBJS_DIR: &str = "objs";
/// Subfolder for the Mach-O stub source/object.
pub const TEMP_DIR: &str = "temp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Pe,
    Elf,
    MachO,
}

impl Platform {
    /// Strategy for the operating system this tool is running on.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Pe
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::MachO
        } else {
            Platform::Elf
        }
    }

    /// Whether this platform leaves object files in `<output>/objs`.
    pub fn uses_objects(&self) -> bool {
        !matches!(self, Platform::Pe)
    }

    pub fn strategy(&self) -> Box<dyn EmbedStrategy> {
        match self {
            Platform::Pe => Box::new(pe::PeStrategy),
            Platform::Elf => Box::new(elf::ElfStrategy),
            Platform::MachO => Box::new(macho::MachOStrategy),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Pe => write!(f, "PE (resource script)"),
            Platform::Elf => write!(f, "ELF (objcopy)"),
            Platform::MachO => write!(f, "Mach-O (ld -sectcreate)"),
        }
    }
}

/// Platform-specific artifact produced for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddableUnit {
    /// One line of `win.rc`
    Script { name: String, line: String },
    /// objcopy output with its linker symbols
    Object {
        file_name: String,
        start_symbol: String,
        end_symbol: String,
    },
    /// `ld -r` output carrying the bytes in section `section`
    Section { file_name: String, section: String },
}

impl EmbeddableUnit {
    /// File name inside `<output>/objs`, if this unit is an object.
    pub fn object_file(&self) -> Option<&str> {
        match self {
            EmbeddableUnit::Script { .. } => None,
            EmbeddableUnit::Object { file_name, .. } | EmbeddableUnit::Section { file_name, .. } => {
                Some(file_name.as_str())
            }
        }
    }
}

/// Everything a strategy needs besides the entries themselves.
pub struct EmbedContext<'a> {
    /// Working directory; resource paths are relative to it
    pub work_dir: &'a Path,
    /// Output directory as written in the manifest
    pub output: &'a str,
    pub tools: &'a Tools,
    pub runner: &'a mut dyn ToolRunner,
    pub progress: ProgressBar,
}

impl EmbedContext<'_> {
    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join(self.output)
    }

    pub fn objs_dir(&self) -> PathBuf {
        self.output_dir().join(OBJS_DIR)
    }
}

pub trait EmbedStrategy {
    /// Produce one unit per entry. Any tool failure aborts the whole run.
    fn embed(
        &self,
        ctx: &mut EmbedContext<'_>,
        entries: &[ResourceEntry],
    ) -> Result<Vec<EmbeddableUnit>>;
}

pub(crate) fn object_name(entry: &ResourceEntry) -> String {
    format!("{}.o", entry.safe_id)
}
