//! Configuration error types shared across the workspace.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Errors raised while loading or validating the solver configuration.
///
/// All variants are fatal at startup: the driver prints the diagnostic
/// on rank 0 and exits non-zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io {
        /// Path that failed to open or read.
        path: PathBuf,
        /// Stringified I/O error.
        reason: String,
    },
    /// The configuration file is not valid TOML or is missing required keys.
    Parse {
        /// Deserializer diagnostic.
        reason: String,
    },
    /// A key deserialized but violates a semantic constraint.
    Invalid {
        /// Dotted key path, e.g. `properties.liquidus`.
        field: String,
        /// What the constraint is and what was found.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => {
                write!(f, "cannot read config {}: {reason}", path.display())
            }
            Self::Parse { reason } => write!(f, "config parse error: {reason}"),
            Self::Invalid { field, reason } => write!(f, "config key '{field}': {reason}"),
        }
    }
}

impl Error for ConfigError {}
