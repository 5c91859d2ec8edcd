//! Scan path error types.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Errors from loading a scan-path file. All are fatal at startup.
#[derive(Debug)]
pub enum PathError {
    /// The file could not be opened or read.
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file contains no segments after the header.
    Empty,
    /// A segment line failed to parse or failed validation.
    Malformed {
        /// 1-based line number in the file.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read scan path {}: {source}", path.display())
            }
            Self::Empty => write!(f, "scan path contains no segments"),
            Self::Malformed { line, reason } => {
                write!(f, "scan path line {line}: {reason}")
            }
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
