//! The `resbuild build` pipeline.
//!
//! manifest → lock → scan → embed → prune → generate → unlock
//!
//! The scanned entry list is built once and handed to every later stage, so
//! IDs, object names and generated arrays cannot drift apart. The lock guard
//! lives for the whole pipeline and removes the marker on every exit path.

use crate::cmake::{self, CMAKE_FILE};
use crate::codegen::{self, header::HEADER_FILE, source::SOURCE_FILE};
use crate::config::{self, ResourceManifest};
use crate::error::BuildError;
use crate::lock::{self, Acquire, WorkDirLock};
use crate::platform::{EmbedContext, OBJS_DIR, Platform, SystemRunner, ToolRunner, Tools};
use crate::reconcile::{self, PruneReport};
use crate::scan::{self, ResourceEntry};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// How long to wait for another instance holding the lock
    pub timeout: Duration,
    /// Print every external command
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            timeout: lock::DEFAULT_TIMEOUT,
            verbose: false,
        }
    }
}

#[derive(Debug)]
pub enum BuildOutcome {
    /// This invocation produced the output
    Built(BuildSummary),
    /// Another instance held the lock and finished while we waited
    BuiltByOther,
}

#[derive(Debug)]
pub struct BuildSummary {
    pub platform: Platform,
    pub resources: Vec<ResourceEntry>,
    pub pruned: PruneReport,
    pub output_dir: PathBuf,
}

/// Resolve and check the working directory.
pub fn resolve_work_dir(work_dir: &Path) -> Result<PathBuf> {
    if !work_dir.is_dir() {
        return Err(BuildError::MissingWorkDir(work_dir.to_path_buf()).into());
    }
    work_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", work_dir.display()))
}

/// Build for the host platform with the real toolchain.
pub fn build_resources(work_dir: &Path, options: &BuildOptions) -> Result<BuildOutcome> {
    let mut runner = SystemRunner::new(options.verbose);
    build_with(work_dir, Platform::host(), &mut runner, options)
}

pub fn build_with(
    work_dir: &Path,
    platform: Platform,
    runner: &mut dyn ToolRunner,
    options: &BuildOptions,
) -> Result<BuildOutcome> {
    let start_time = Instant::now();
    let work_dir = resolve_work_dir(work_dir)?;
    let manifest = config::load_manifest(&work_dir)?;

    let lock = WorkDirLock::new(&work_dir);
    let guard = match lock.wait_acquire(options.timeout)? {
        Acquire::Acquired(guard) => guard,
        Acquire::ReleasedByOther => {
            println!(
                "{} Files were created by another instance, exiting.",
                "✓".green()
            );
            return Ok(BuildOutcome::BuiltByOther);
        }
    };

    println!(
        "{} Project: {} ({})",
        "🚀".blue(),
        manifest.project_name.bold(),
        platform
    );

    let output_dir = manifest.output_dir(&work_dir);
    prepare_output_dirs(&output_dir, &manifest)?;

    println!("{} Scanning resource files...", "⚡".yellow());
    let resources = scan::scan_resources(&work_dir, &manifest)?;
    for entry in &resources {
        println!("   {} Including resource {}", "+".green(), entry.path);
    }

    println!("{} Creating platform specific files...", "⚙️".cyan());
    let tools = Tools::resolve(&manifest.tools);
    let progress = progress_bar(resources.len(), options.verbose)?;
    let units = {
        let mut ctx = EmbedContext {
            work_dir: &work_dir,
            output: &manifest.output,
            tools: &tools,
            runner,
            progress: progress.clone(),
        };
        platform.strategy().embed(&mut ctx, &resources)
    };
    progress.finish_and_clear();
    let units = units?;

    let pruned = if platform.uses_objects() {
        println!("{} Cleaning up unused platform files...", "🧹".yellow());
        reconcile::prune_stale_objects(&output_dir.join(OBJS_DIR), &units)?
    } else {
        PruneReport::default()
    };

    let code = codegen::generate(&manifest, platform, &resources, &units);
    let header_path = output_dir
        .join("include")
        .join(manifest.include_dir())
        .join(HEADER_FILE);
    write_generated(&header_path, &code.header)?;
    write_generated(&output_dir.join("src").join(SOURCE_FILE), &code.source)?;
    write_generated(
        &output_dir.join(CMAKE_FILE),
        &cmake::generate_cmake(&manifest.project_name, platform, &units),
    )?;

    guard
        .release()
        .with_context(|| format!("Failed to remove {}", lock.marker().display()))?;

    println!(
        "{} {} resources were successfully processed in {:.2}s",
        "✓".green(),
        resources.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(BuildOutcome::Built(BuildSummary {
        platform,
        resources,
        pruned,
        output_dir,
    }))
}

/// Scan without locking or writing anything.
pub fn list_resources(work_dir: &Path) -> Result<(ResourceManifest, Vec<ResourceEntry>)> {
    let work_dir = resolve_work_dir(work_dir)?;
    let manifest = config::load_manifest(&work_dir)?;
    let resources = scan::scan_resources(&work_dir, &manifest)?;
    Ok((manifest, resources))
}

fn prepare_output_dirs(output_dir: &Path, manifest: &ResourceManifest) -> Result<()> {
    for dir in [
        output_dir.join(OBJS_DIR),
        output_dir.join("src"),
        output_dir.join("include").join(manifest.include_dir()),
    ] {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

fn write_generated(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn progress_bar(len: usize, verbose: bool) -> Result<ProgressBar> {
    if verbose || len == 0 || !console::Term::stdout().is_term() {
        return Ok(ProgressBar::hidden());
    }
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
        .progress_chars("#>-");
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    Ok(pb)
}
