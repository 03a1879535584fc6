//! Error types for cellpane.
//!
//! Only failures a caller can act on are represented here. Malformed input and
//! rejected edits are absorbed where they happen and never reach this type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Writing to or configuring the terminal failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// stdin reached end-of-file; there is no terminal left to drive.
    #[error("input stream closed")]
    InputClosed,

    /// The terminal could not be put into (or out of) the required mode.
    #[error("terminal setup failed: {0}")]
    Terminal(String),

    /// A configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configuration file is not valid TOML for [`crate::Config`].
    #[error("invalid config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
