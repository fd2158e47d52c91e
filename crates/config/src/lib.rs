//! Transaction configuration for graphtx.
//!
//! This crate provides the [`AccessMode`] and [`TransactionConfig`] types used
//! to describe how an explicit transaction is opened.

#![warn(missing_docs)]
#![warn(clippy::all)]

use graphtx_core::{Bookmark, Params, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// BEGIN parameter carrying the access mode
pub const MODE_KEY: &str = "mode";

/// Controls whether the transaction may write or is read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Reads and writes (default)
    #[default]
    ReadWrite,
    /// Reads only; sent as `mode: "r"` on BEGIN
    ReadOnly,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML source could not be parsed
    #[error("invalid transaction config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options for opening an explicit transaction.
///
/// Use the builder pattern to configure options:
///
/// ```ignore
/// use graphtx_config::{AccessMode, TransactionConfig};
///
/// let config = TransactionConfig::new()
///     .bookmark("neo4j:bookmark:v1:tx42")
///     .access_mode(AccessMode::ReadOnly);
/// ```
///
/// Or load it from TOML:
///
/// ```toml
/// access_mode = "read_only"
/// bookmark = ["neo4j:bookmark:v1:tx42"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Bookmark the server must reach before the first statement runs
    pub bookmark: Bookmark,
    /// Read-write or read-only
    pub access_mode: AccessMode,
}

impl TransactionConfig {
    /// Config with no bookmark in read-write mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bookmark to wait for
    pub fn bookmark(mut self, bookmark: impl Into<Bookmark>) -> Self {
        self.bookmark = bookmark.into();
        self
    }

    /// Set the access mode
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Parse a config from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Parameters for the BEGIN request
    ///
    /// The bookmark parameters when a bookmark is set, plus `mode: "r"` for
    /// read-only transactions.
    pub fn begin_parameters(&self) -> Params {
        let mut params = self.bookmark.as_begin_parameters();
        if self.access_mode == AccessMode::ReadOnly {
            params.insert(MODE_KEY.to_string(), Value::from("r"));
        }
        params
    }
}
