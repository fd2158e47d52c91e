//! Protocol facades for graphtx
//!
//! This crate describes the boundary between the transaction layer and the
//! network. Encoding, pooling and I/O live behind it.
//!
//! - [`message`]: request statements and response metadata keys
//! - [`handler`]: the [`ResponseHandler`] callback contract
//! - [`connection`]: blocking [`Connection`] and non-blocking [`AsyncConnection`]
//!
//! ## Exchange Shape
//!
//! | Operation | Requests | Reply observed by |
//! |-----------|----------|-------------------|
//! | begin | `RUN "BEGIN" {bookmark}` + `PULL_ALL` | begin handler (only awaited with a bookmark) |
//! | statement | `RUN <text> {params}` + `PULL_ALL` | run handler, pull-all handler |
//! | commit | `RUN "COMMIT"` + `PULL_ALL` | bookmark-capturing commit handler |
//! | rollback | `RUN "ROLLBACK"` + `PULL_ALL` | rollback handler |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod handler;
pub mod message;

pub use connection::{AsyncConnection, Connection};
pub use handler::{NoOpResponseHandler, ResponseHandler};
pub use message::{bookmark_from_metadata, fields_from_metadata, Metadata, BEGIN, COMMIT, ROLLBACK};
