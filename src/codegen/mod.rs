//! C++ accessor generation.
//!
//! The header and source are first described as a [`model::Item`] list and
//! then rendered by [`emit::CppEmitter`], so syntax can be tested apart from
//! the data gathering.
//!
//! Generated files:
//!
//! - `<output>/include/<include_dir>/resources.h` - `enum class ResId` and
//!   the four accessor declarations
//! - `<output>/src/resources.cpp` - lookup tables for the active platform

pub mod emit;
pub mod header;
pub mod model;
pub mod source;

use crate::config::ResourceManifest;
use crate::platform::{EmbeddableUnit, Platform};
use crate::scan::ResourceEntry;
use emit::CppEmitter;

/// Rendered header and source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub header: String,
    pub source: String,
}

pub fn generate(
    manifest: &ResourceManifest,
    platform: Platform,
    entries: &[ResourceEntry],
    units: &[EmbeddableUnit],
) -> GeneratedCode {
    GeneratedCode {
        header: CppEmitter::render(&header::header_model(manifest, entries)),
        source: CppEmitter::render(&source::source_model(manifest, platform, entries, units)),
    }
}
