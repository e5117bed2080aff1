//! # resbuild - Native Resource Embedding
//!
//! resbuild turns a manifest of arbitrary files into a static library that a
//! C/C++ project can link to read those files at run time, with no
//! filesystem access.
//!
//! ## Quick Start
//!
//! ```bash
//! # assets/resources.json: {"resources": ["*.svg"], "output": "build", "project_name": "icons"}
//! resbuild build assets
//! ```
//!
//! Produces `assets/build/CMakeLists.txt`, `include/icons/resources.h`,
//! `src/resources.cpp` and, depending on the host, `objs/*.o` or `src/win.rc`.
//!
//! ## Module Organization
//!
//! - [`builder`] - The build pipeline
//! - [`config`] - Manifest parsing (`resources.json` / `resources.toml`)
//! - [`lock`] - Cross-process lock over the working directory
//! - [`platform`] - ELF / Mach-O / PE embedding strategies
//! - [`codegen`] - C++ header and source generation

/// Resource build pipeline.
pub mod builder;

/// `CMakeLists.txt` generation.
pub mod cmake;

/// C++ accessor generation.
pub mod codegen;

/// Manifest parsing.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Marker-file lock guarding a working directory.
pub mod lock;

/// Shell-style wildcard patterns.
pub mod pattern;

/// Platform embedding strategies and external tool invocation.
pub mod platform;

/// Stale object pruning.
pub mod reconcile;

/// Resource discovery and identifiers.
pub mod scan;

/// Terminal UI utilities (tables, sizes).
pub mod ui;
