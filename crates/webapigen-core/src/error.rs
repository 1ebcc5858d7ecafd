//! Error handling for the webapigen synthesis library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Errors raised while analyzing a
//! single declaration are converted into diagnostics at the declaration
//! boundary (see [`crate::diagnostics`]); only setup failures such as an
//! unreadable contract file or a broken template directory abort a run.
//!
//! # Examples
//!
//! ```
//! use webapigen_core::error::{Error, Result};
//!
//! fn resolve_timeout(raw: &str) -> Result<u64> {
//!     raw.parse()
//!         .map_err(|_| Error::resolution("IUserApi", format!("invalid timeout '{raw}'")))
//! }
//!
//! assert!(resolve_timeout("30").is_ok());
//! assert!(resolve_timeout("soon").is_err());
//! ```

use thiserror::Error;

/// Result type for webapigen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for webapigen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Failure fetching a remote contract document
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed contract document
    #[error("Contract error: {0}")]
    Contract(String),

    /// A member or annotation argument that could not be resolved
    #[error("Cannot resolve {symbol}: {message}")]
    Resolution { symbol: String, message: String },

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while emitting the units of one declaration
    #[error("Generation of {declaration} failed: {message}")]
    Generation {
        declaration: String,
        message: String,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new contract document error
    pub fn contract<S: Into<String>>(msg: S) -> Self {
        Self::Contract(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create a new resolution error for `symbol`
    pub fn resolution<S: Into<String>, M: Into<String>>(symbol: S, message: M) -> Self {
        Self::Resolution {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// Create a new generation error for `declaration`
    pub fn generation<S: Into<String>, M: Into<String>>(declaration: S, message: M) -> Self {
        Self::Generation {
            declaration: declaration.into(),
            message: message.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
