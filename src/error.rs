//! Error types for maven-feed-auth.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or rewriting Maven configuration files.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read a settings or POM file.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a settings or POM file.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the parent directory of an output file.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XML text could not be converted into a structural document.
    #[error("failed to parse XML: {message}")]
    ParseXml { message: String },

    /// A structural document could not be written as XML.
    #[error("failed to serialize XML: {message}")]
    SerializeXml { message: String },

    /// No settings file location could be determined.
    #[error("settings file location unavailable: {0}")]
    SettingsPathUnavailable(String),

    /// Invalid URL in the build configuration.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Result type alias for maven-feed-auth operations.
pub type Result<T> = std::result::Result<T, Error>;
