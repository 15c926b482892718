use std::path::PathBuf;

use crate::error::{ImportError, PackageError, UnknownExtension};

/// Represents all errors that can occur while loading a session file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read session file '{}': {source}", .path.display())]
    Io {
        /// The path that was requested.
        path:   PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the session schema.
    #[error("Invalid session file: {0}")]
    Toml(#[from] toml::de::Error),
    /// An `extensions` entry is not a known flag.
    #[error(transparent)]
    Extension(#[from] UnknownExtension),
    /// A `packages` entry could not be exposed.
    #[error(transparent)]
    Package(#[from] PackageError),
    /// An `imports` entry could not be added.
    #[error(transparent)]
    Import(#[from] ImportError),
}
