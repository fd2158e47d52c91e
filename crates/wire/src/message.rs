//! Request statements and response metadata
//!
//! Transaction boundaries travel as ordinary RUN requests whose statement is
//! one of [`BEGIN`], [`COMMIT`] or [`ROLLBACK`], each followed by a PULL_ALL.

use graphtx_core::{Bookmark, Value};
use std::collections::HashMap;

/// Statement that opens an explicit transaction
pub const BEGIN: &str = "BEGIN";

/// Statement that commits the open transaction
pub const COMMIT: &str = "COMMIT";

/// Statement that rolls back the open transaction
pub const ROLLBACK: &str = "ROLLBACK";

/// SUCCESS metadata key carrying the new bookmark after COMMIT
pub const BOOKMARK_METADATA_KEY: &str = "bookmark";

/// SUCCESS metadata key carrying result column names after RUN
pub const FIELDS_METADATA_KEY: &str = "fields";

/// Metadata attached to a SUCCESS reply
pub type Metadata = HashMap<String, Value>;

/// Extract the bookmark from SUCCESS metadata
///
/// Returns the empty bookmark when the key is missing or not a string.
pub fn bookmark_from_metadata(metadata: &Metadata) -> Bookmark {
    match metadata.get(BOOKMARK_METADATA_KEY).and_then(Value::as_str) {
        Some(value) => Bookmark::from(value),
        None => Bookmark::empty(),
    }
}

/// Extract result column names from RUN SUCCESS metadata
///
/// Non-string entries are skipped.
pub fn fields_from_metadata(metadata: &Metadata) -> Vec<String> {
    metadata
        .get(FIELDS_METADATA_KEY)
        .and_then(Value::as_list)
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
