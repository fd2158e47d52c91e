//! Causal-consistency bookmarks
//!
//! A bookmark names a point in the server's transaction log. It is produced by
//! a successful commit and passed to the next BEGIN so that the server catches
//! up to that point before running any statement of the new transaction.
//!
//! A bookmark may carry several values (for example when a session chains
//! bookmarks from more than one earlier transaction). BEGIN receives both the
//! newest value and the full list.

use crate::value::{Params, Value};
use serde::{Deserialize, Serialize};

/// Prefix of bookmark values whose transaction number can be compared
pub const BOOKMARK_PREFIX: &str = "neo4j:bookmark:v1:tx";

/// BEGIN parameter holding the newest bookmark value
pub const BOOKMARK_KEY: &str = "bookmark";

/// BEGIN parameter holding every bookmark value
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// Immutable bookmark value
///
/// The default bookmark is empty. Empty bookmarks never overwrite a known
/// bookmark held by a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmark {
    values: Vec<String>,
}

impl Bookmark {
    /// The empty bookmark
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a bookmark from any number of values
    ///
    /// Empty strings are skipped, so a list of empty strings yields the empty
    /// bookmark.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(Into::into)
                .filter(|v: &String| !v.is_empty())
                .collect(),
        }
    }

    /// True when the bookmark carries no value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in insertion order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The newest value
    ///
    /// Values of the form `neo4j:bookmark:v1:tx<N>` are compared by `N`.
    /// Values that do not parse take no part in the comparison; if none parse
    /// the first value is returned.
    pub fn max_value(&self) -> Option<&str> {
        let newest = self
            .values
            .iter()
            .filter_map(|v| transaction_number(v).map(|n| (n, v)))
            .max_by_key(|(n, _)| *n)
            .map(|(_, v)| v.as_str());

        newest.or_else(|| self.values.first().map(String::as_str))
    }

    /// Parameters for the BEGIN request
    ///
    /// Empty for the empty bookmark, otherwise `bookmark` (newest value) and
    /// `bookmarks` (every value).
    pub fn as_begin_parameters(&self) -> Params {
        let mut params = Params::new();
        if let Some(max) = self.max_value() {
            params.insert(BOOKMARK_KEY.to_string(), Value::from(max));
            params.insert(
                BOOKMARKS_KEY.to_string(),
                Value::List(self.values.iter().cloned().map(Value::String).collect()),
            );
        }
        params
    }
}

impl From<&str> for Bookmark {
    fn from(value: &str) -> Self {
        Self::from_values([value])
    }
}

impl From<String> for Bookmark {
    fn from(value: String) -> Self {
        Self::from_values([value])
    }
}

impl std::fmt::Display for Bookmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bookmark{:?}", self.values)
    }
}

fn transaction_number(value: &str) -> Option<u64> {
    value.strip_prefix(BOOKMARK_PREFIX)?.parse().ok()
}
