//! Transaction lifecycle state machine
//!
//! ## Transitions
//!
//! ```text
//!                success()            close: commit ok
//!   ACTIVE ─────────────────► MARKED_SUCCESS ─────────────────► COMMITTED
//!     │  \                         │
//!     │   \ failure()              │ failure()
//!     │    ▼                       ▼
//!     │   MARKED_FAILED ◄──────────┘
//!     │        │ close: rollback
//!     │        ▼
//!     └─────► ROLLED_BACK ◄──── FAILED ◄──── (fatal error from any open state)
//! ```
//!
//! COMMITTED and ROLLED_BACK are terminal. The transition functions on
//! [`TransactionState`] are pure; [`AtomicState`] applies them atomically so
//! application threads and reply callbacks never observe a torn state.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of an explicit transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionState {
    /// Open, no disposition chosen
    Active = 0,
    /// Caller intends to commit
    MarkedSuccess = 1,
    /// Caller intends to roll back
    MarkedFailed = 2,
    /// Unrecoverable error; no more requests are sent for this transaction
    Failed = 3,
    /// Commit succeeded
    Committed = 4,
    /// Rolled back, explicitly or as the resolution of a failure
    RolledBack = 5,
}

impl TransactionState {
    /// All states, in declaration order
    pub const ALL: [TransactionState; 6] = [
        TransactionState::Active,
        TransactionState::MarkedSuccess,
        TransactionState::MarkedFailed,
        TransactionState::Failed,
        TransactionState::Committed,
        TransactionState::RolledBack,
    ];

    /// True unless the transaction committed or rolled back
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }

    /// True for COMMITTED and ROLLED_BACK
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::RolledBack
        )
    }

    /// Only ACTIVE and MARKED_SUCCESS accept new statements
    pub fn accepts_statements(self) -> bool {
        matches!(
            self,
            TransactionState::Active | TransactionState::MarkedSuccess
        )
    }

    /// State after `success()`
    pub fn mark_success(self) -> Self {
        match self {
            TransactionState::Active => TransactionState::MarkedSuccess,
            other => other,
        }
    }

    /// State after `failure()`
    pub fn mark_failure(self) -> Self {
        match self {
            TransactionState::Active | TransactionState::MarkedSuccess => {
                TransactionState::MarkedFailed
            }
            other => other,
        }
    }

    /// State after an unrecoverable error
    pub fn mark_failed(self) -> Self {
        if self.is_terminal() {
            self
        } else {
            TransactionState::Failed
        }
    }

    /// Upper-case protocol-style name
    pub fn name(self) -> &'static str {
        match self {
            TransactionState::Active => "ACTIVE",
            TransactionState::MarkedSuccess => "MARKED_SUCCESS",
            TransactionState::MarkedFailed => "MARKED_FAILED",
            TransactionState::Failed => "FAILED",
            TransactionState::Committed => "COMMITTED",
            TransactionState::RolledBack => "ROLLED_BACK",
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => TransactionState::Active,
            1 => TransactionState::MarkedSuccess,
            2 => TransactionState::MarkedFailed,
            3 => TransactionState::Failed,
            4 => TransactionState::Committed,
            5 => TransactionState::RolledBack,
            _ => unreachable!("invalid transaction state {}", raw),
        }
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, lock-free holder of the current [`TransactionState`]
///
/// # Thread Safety
///
/// Every read-modify-write is a single compare-and-swap, so a `failure()` from
/// application code racing with a reply callback resolves to one of the two
/// orders, never a mix. No lock is held across protocol exchanges.
#[derive(Debug)]
pub struct AtomicState(AtomicU8);

impl AtomicState {
    /// Create a cell holding `state`
    pub fn new(state: TransactionState) -> Self {
        AtomicState(AtomicU8::new(state as u8))
    }

    /// Current state
    pub fn load(&self) -> TransactionState {
        TransactionState::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Atomically apply a pure transition
    ///
    /// Returns `(previous, current)`.
    pub fn update<F>(&self, transition: F) -> (TransactionState, TransactionState)
    where
        F: Fn(TransactionState) -> TransactionState,
    {
        let raw = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                Some(transition(TransactionState::from_raw(raw)) as u8)
            })
            .unwrap_or_else(|raw| raw);
        let previous = TransactionState::from_raw(raw);
        (previous, transition(previous))
    }

    /// Move to a terminal state unless one was already reached
    ///
    /// Returns `Ok(previous)` when this call made the transition, or
    /// `Err(current)` when the transaction was already terminal.
    pub fn finalize(
        &self,
        terminal: TransactionState,
    ) -> std::result::Result<TransactionState, TransactionState> {
        debug_assert!(terminal.is_terminal());
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                if TransactionState::from_raw(raw).is_terminal() {
                    None
                } else {
                    Some(terminal as u8)
                }
            })
            .map(TransactionState::from_raw)
            .map_err(TransactionState::from_raw)
    }
}

impl Default for AtomicState {
    fn default() -> Self {
        Self::new(TransactionState::Active)
    }
}
