// src/error.rs

//! Error types for the transform pipeline
//!
//! Every fatal condition maps to a documented process exit status via
//! [`Error::exit_code`]. Library code never terminates the process; the
//! binary does that once the error has propagated to `main`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for autowix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised while producing a manifest
#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not open {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Reading input at line {line}: {message}")]
    ReadInput { line: u64, message: String },

    #[error("Could not open {}: {source}", .path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Writing output: {0}")]
    WriteOutput(String),

    #[error("{}:{line}: malformed input", .path.display())]
    MalformedPersistence { path: PathBuf, line: usize },

    #[error("Reading {}: {source}", .path.display())]
    ReadPersistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: input is not well-formed: {message}")]
    MalformedXml { line: u64, message: String },

    #[error("line {line}: GUID reference {value:?} contains a line break")]
    GuidKeyLineBreak { line: u64, value: String },

    #[error("line {line}: install path {path:?} contains a line break")]
    PathKeyLineBreak { line: u64, path: String },

    #[error("line {line}: <{tag}> must be an empty element")]
    ExpansionNotEmpty { line: u64, tag: &'static str },

    #[error("line {line}: <{tag}> requires a non-empty `from` attribute")]
    ExpansionMissingFrom { line: u64, tag: &'static str },

    #[error("line {line}: {} is neither a file nor a directory", .path.display())]
    MissingPath { line: u64, path: PathBuf },

    #[error("line {line}: file name is not valid UTF-8: {}", .path.display())]
    NonUtf8Name { line: u64, path: PathBuf },

    #[error("line {line}: listing {}: {message}", .path.display())]
    ListDirectory {
        line: u64,
        path: PathBuf,
        message: String,
    },
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::OpenInput { .. } | Self::ReadInput { .. } => 1,
            Self::OpenOutput { .. } | Self::WriteOutput(_) => 2,
            Self::MalformedPersistence { .. } | Self::ReadPersistence { .. } => 3,
            Self::MalformedXml { .. } => 5,
            Self::GuidKeyLineBreak { .. } | Self::PathKeyLineBreak { .. } => 6,
            Self::ExpansionNotEmpty { .. } | Self::ExpansionMissingFrom { .. } => 7,
            Self::MissingPath { .. } | Self::NonUtf8Name { .. } | Self::ListDirectory { .. } => 8,
        }
    }
}
