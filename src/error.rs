use std::path::PathBuf;
use std::time::Duration;

/// Fatal conditions of a `resbuild` run.
///
/// Every variant is unrecoverable at the point it is detected; the CLI
/// prints it and exits with a non-zero status.
#[derive(Debug)]
pub enum BuildError {
    /// The working directory does not exist
    MissingWorkDir(PathBuf),
    /// Neither `resources.json` nor `resources.toml` was found
    MissingManifest(PathBuf),
    /// The manifest exists but is malformed
    InvalidManifest(String),
    /// Two resource paths normalize to the same enumerator
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },
    /// A derived identifier is not usable as a C++ name
    InvalidIdentifier { path: String, identifier: String },
    /// More resources than Mach-O section names can encode
    TooManyResources(usize),
    /// Another invocation kept the lock marker past the wait bound
    LockTimeout { marker: PathBuf, timeout: Duration },
    /// An external embedding tool could not be run or returned non-zero
    ToolFailed { command: String, status: String },
    /// IO error
    Io(std::io::Error),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingWorkDir(dir) => {
                write!(f, "Working directory {} does not exist", dir.display())
            }
            BuildError::MissingManifest(dir) => write!(
                f,
                "Working directory {} should contain resources.json (or resources.toml)",
                dir.display()
            ),
            BuildError::InvalidManifest(msg) => write!(f, "Invalid manifest: {}", msg),
            BuildError::IdentifierCollision {
                identifier,
                first,
                second,
            } => write!(
                f,
                "Resources '{}' and '{}' both map to identifier {}; rename one of them",
                first, second, identifier
            ),
            BuildError::InvalidIdentifier { path, identifier } => write!(
                f,
                "Resource '{}' maps to identifier {} which is not a valid C++ name",
                path, identifier
            ),
            BuildError::TooManyResources(count) => write!(
                f,
                "{} resources exceed the Mach-O section name budget (max 10000000)",
                count
            ),
            BuildError::LockTimeout { marker, timeout } => write!(
                f,
                "Another instance did not finish within {:.2} seconds.\n\
                If you are sure no other instance is running, delete the lock file {} \
                (or run 'resbuild unlock').\n\
                If resource generation needs more time, pass --timeout <seconds>.",
                timeout.as_secs_f64(),
                marker.display()
            ),
            BuildError::ToolFailed { command, status } => {
                write!(f, "Embedding tool failed ({}): {}", status, command)
            }
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        BuildError::Io(e)
    }
}
