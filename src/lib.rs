//! # graphtx
//!
//! Client-side explicit transactions for graph database protocol drivers.
//!
//! A transaction is opened with BEGIN on one connection, runs statements,
//! and ends with COMMIT or ROLLBACK. This crate tracks its lifecycle, sends
//! the closing exchange, falls back to ROLLBACK when COMMIT fails, and gives
//! the connection back to its owner exactly once.
//!
//! ## Quick Start
//!
//! ```ignore
//! use graphtx::prelude::*;
//!
//! let config = TransactionConfig::new().bookmark(last_bookmark);
//! let tx = ExplicitTransaction::begin(connection, session, &config)?;
//!
//! let result = tx.run("MATCH (n:Person) RETURN n.name AS name", Params::new())?;
//! for record in result.records()? {
//!     println!("{:?}", record.get("name"));
//! }
//!
//! tx.success();
//! tx.close()?;
//! ```
//!
//! The non-blocking flavor has the same shape:
//!
//! ```ignore
//! let tx = AsyncExplicitTransaction::begin(connection, session, &config).await?;
//! let cursor = tx.run_async("CREATE (n:Person)", Params::new())?;
//! cursor.consume().await?;
//! tx.commit_async().await?;
//! ```
//!
//! ## Crates
//!
//! - [`graphtx_core`]: values, bookmarks, errors
//! - [`graphtx_wire`]: connection facades and response handlers
//! - [`graphtx_concurrency`]: state machine and completion primitives
//! - [`graphtx_config`]: transaction configuration
//! - [`graphtx_engine`]: the transactions themselves

#![warn(missing_docs)]

pub mod prelude;


pub use graphtx_config::{AccessMode, TransactionConfig};
pub use graphtx_core::{Bookmark, Error, Params, Result, TransactionId, Value};
pub use graphtx_engine::{
    AsyncExplicitTransaction, ExplicitTransaction, NoOpResourcesHandler, PendingOp, Record,
    ResourcesHandler, ResultCursor, StatementResult, TransactionState,
};
