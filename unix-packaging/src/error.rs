// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use {crate::generator::Platform, std::path::PathBuf, thiserror::Error};

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("required variable not defined: {0}")]
    MissingVariable(&'static str),

    #[error("variable {key} has invalid value {value:?}: {reason}")]
    InvalidVariable {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown entry type: {0:?}")]
    UnknownEntryType(String),

    #[error("permissions are not an octal mode: {0:?}")]
    InvalidPermissions(String),

    #[error("{step} ({program} exit status: {status:?})")]
    ToolFailed {
        step: &'static str,
        program: String,
        status: Option<i32>,
    },

    #[error("unable to parse output line from {program}: {line:?}")]
    MalformedToolOutput { program: String, line: String },

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("no generator registered for platform {0}")]
    UnregisteredPlatform(Platform),

    #[error("I/O error on {}: {source}", .path.display())]
    IoPath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("glob iteration error: {0}")]
    GlobIteration(#[from] glob::GlobError),

    #[error("directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl PackagingError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io_path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoPath {
            path: path.into(),
            source,
        }
    }
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, PackagingError>;
