//! Convenient imports for graphtx.
//!
//! ```ignore
//! use graphtx::prelude::*;
//! ```

// Transactions
pub use graphtx_engine::{AsyncExplicitTransaction, ExplicitTransaction, TransactionState};

// Results
pub use graphtx_engine::{PendingOp, Record, ResultCursor, StatementResult};

// Owners and connections
pub use graphtx_engine::{NoOpResourcesHandler, ResourcesHandler};
pub use graphtx_wire::{AsyncConnection, Connection};

// Configuration
pub use graphtx_config::{AccessMode, TransactionConfig};

// Core types
pub use graphtx_core::{Bookmark, Error, Params, Result, Value};
