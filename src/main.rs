//! # resbuild CLI Entry Point
//!
//! Parses arguments with clap and routes to the library. Running without a
//! subcommand is the same as `resbuild build` in the current directory.
//!
//! ## Exit Codes
//!
//! - `0` - resources built, or another instance built them while we waited
//! - `1` - missing working directory/manifest, lock timeout, tool failure

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use resbuild::builder::{self, BuildOptions, BuildOutcome};
use resbuild::lock::{self, WorkDirLock};
use resbuild::ui;

#[derive(Parser)]
#[command(name = "resbuild")]
#[command(about = "Embed resource files into native static libraries", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed resources and generate the accessor library
    Build {
        /// Directory containing resources.json [default: current directory]
        work_dir: Option<PathBuf>,
        /// Seconds to wait for another running instance
        #[arg(short, long, default_value_t = lock::DEFAULT_TIMEOUT.as_secs_f64())]
        timeout: f64,
        /// Print every external command
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show which files the manifest selects, without building
    List {
        /// Directory containing resources.json [default: current directory]
        work_dir: Option<PathBuf>,
    },
    /// Remove a lock file left behind by a crashed instance
    Unlock {
        /// Directory containing resources.json [default: current directory]
        work_dir: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn work_dir_or_cwd(dir: &Option<PathBuf>) -> PathBuf {
    dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn run_build(work_dir: PathBuf, timeout: f64, verbose: bool) -> Result<()> {
    if !timeout.is_finite() || timeout < 0.0 {
        return Err(anyhow::anyhow!(
            "--timeout must be a non-negative number of seconds"
        ));
    }
    let options = BuildOptions {
        timeout: Duration::from_secs_f64(timeout),
        verbose,
    };

    match builder::build_resources(&work_dir, &options)? {
        BuildOutcome::Built(summary) => {
            let pruned = summary.pruned.removed_files.len() + summary.pruned.removed_dirs.len();
            if pruned > 0 {
                println!("   {} Pruned {} stale entries", "🗑️".red(), pruned);
            }
            println!(
                "   {} Output: {}",
                "📦".blue(),
                summary.output_dir.display()
            );
        }
        BuildOutcome::BuiltByOther => {}
    }
    Ok(())
}

fn run_list(work_dir: PathBuf) -> Result<()> {
    let (manifest, resources) = builder::list_resources(&work_dir)?;
    if resources.is_empty() {
        println!(
            "{} No files match the patterns of '{}'",
            "!".yellow(),
            manifest.project_name
        );
        return Ok(());
    }

    let root = builder::resolve_work_dir(&work_dir)?;
    let mut table = ui::Table::new(&["ID", "Enumerator", "Path", "Size"]);
    for entry in &resources {
        let size = fs::metadata(root.join(&entry.path))
            .map(|m| ui::format_size(m.len()))
            .unwrap_or_else(|_| "?".to_string());
        table.add_row(vec![
            entry.index.to_string(),
            entry.enumerator().green().to_string(),
            entry.path.clone(),
            size,
        ]);
    }
    table.print();
    println!("{} {} resources", "✓".green(), resources.len());
    Ok(())
}

fn run_unlock(work_dir: PathBuf) -> Result<()> {
    let root = builder::resolve_work_dir(&work_dir)?;
    let lock = WorkDirLock::new(&root);
    if lock.force_unlock()? {
        println!("{} Removed {}", "✓".green(), lock.marker().display());
    } else {
        println!("{} No lock file in {}", "!".yellow(), root.display());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => run_build(PathBuf::from("."), lock::DEFAULT_TIMEOUT.as_secs_f64(), false),
        Some(Commands::Build {
            work_dir,
            timeout,
            verbose,
        }) => run_build(work_dir_or_cwd(&work_dir), timeout, verbose),
        Some(Commands::List { work_dir }) => run_list(work_dir_or_cwd(&work_dir)),
        Some(Commands::Unlock { work_dir }) => run_unlock(work_dir_or_cwd(&work_dir)),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}
