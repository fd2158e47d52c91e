//! Identity types
//!
//! - [`TransactionId`]: identifies one explicit transaction to its session

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an explicit transaction
///
/// Assigned locally when the transaction is created; never sent to the server.
/// Sessions use it to forget the transaction once it reports closed, and log
/// lines carry it as `tx_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random TransactionId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use graphtx_core::TransactionId;
    ///
    /// let id1 = TransactionId::new();
    /// let id2 = TransactionId::new();
    /// assert_ne!(id1, id2);
    /// ```
    pub fn new() -> Self {
        TransactionId(Uuid::new_v4())
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx:{}", self.0)
    }
}
