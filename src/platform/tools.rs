use crate::config::ToolsConfig;
use crate::error::BuildError;
use colored::*;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ToolCommand {
    pub fn new(program: &str, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external toolchain programs. Calls are synchronous and blocking.
pub trait ToolRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), BuildError>;
}

/// Spawns real processes via `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner {
    pub verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ToolRunner for SystemRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), BuildError> {
        if self.verbose {
            println!("   {} {}", "$".dimmed(), command.to_string().dimmed());
        }

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .status()
            .map_err(|e| BuildError::ToolFailed {
                command: command.to_string(),
                status: format!("could not start '{}': {}", command.program, e),
            })?;

        if !status.success() {
            return Err(BuildError::ToolFailed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// External program names and objcopy target settings for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub objcopy: String,
    pub ld: String,
    pub cc: String,
    /// `(bfd target, bfd architecture)`; `None` when the host architecture
    /// has no known mapping and the manifest does not provide one
    pub elf_target: Option<(String, String)>,
}

impl Tools {
    /// Resolve tool names: manifest `[tools]` first, then the environment
    /// (`OBJCOPY`, `LD`, `CC`), then the plain program name.
    pub fn resolve(config: &ToolsConfig) -> Self {
        Self::resolve_with(config, std::env::consts::ARCH, |key| std::env::var(key).ok())
    }

    pub fn resolve_with(
        config: &ToolsConfig,
        arch: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |configured: &Option<String>, var: &str, default: &str| {
            configured
                .clone()
                .or_else(|| env(var).filter(|v| !v.is_empty()))
                .unwrap_or_else(|| default.to_string())
        };

        let detected = elf_bfd_for_arch(arch);
        let elf_target = match (&config.elf_target, &config.elf_arch) {
            (Some(target), Some(bfd_arch)) => Some((target.clone(), bfd_arch.clone())),
            (Some(target), None) => detected.map(|(_, a)| (target.clone(), a.to_string())),
            (None, Some(bfd_arch)) => detected.map(|(t, _)| (t.to_string(), bfd_arch.clone())),
            (None, None) => detected.map(|(t, a)| (t.to_string(), a.to_string())),
        };

        Self {
            objcopy: pick(&config.objcopy, "OBJCOPY", "objcopy"),
            ld: pick(&config.ld, "LD", "ld"),
            cc: pick(&config.cc, "CC", "cc"),
            elf_target,
        }
    }
}

/// objcopy `-O`/`-B` values for a Rust architecture name.
pub fn elf_bfd_for_arch(arch: &str) -> Option<(&'static str, &'static str)> {
    match arch {
        "x86_64" => Some(("elf64-x86-64", "i386:x86-64")),
        "x86" => Some(("elf32-i386", "i386")),
        "aarch64" => Some(("elf64-littleaarch64", "aarch64")),
        "arm" => Some(("elf32-littlearm", "arm")),
        "riscv64" => Some(("elf64-littleriscv", "riscv")),
        _ => None,
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::fs;

    /// Records every command and creates the `-o`/last-argument output file
    /// so later stages see what a real toolchain would leave behind.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub commands: Vec<ToolCommand>,
        pub fail_on: Option<usize>,
    }

    impl ToolRunner for RecordingRunner {
        fn run(&mut self, command: &ToolCommand) -> Result<(), BuildError> {
            self.commands.push(command.clone());
            if self.fail_on == Some(self.commands.len() - 1) {
                return Err(BuildError::ToolFailed {
                    command: command.to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            let out = match command.args.iter().position(|a| a == "-o") {
                Some(pos) => command.args.get(pos + 1),
                None => command.args.last(),
            };
            if let Some(out) = out {
                fs::write(command.cwd.join(out), b"obj").map_err(BuildError::Io)?;
            }
            Ok(())
        }
    }
}
