//! Core types for graphtx
//!
//! This crate defines the value types shared by every other crate:
//! - [`Value`] / [`Params`]: statement parameters and response metadata
//! - [`Bookmark`]: causal-consistency token returned by a commit
//! - [`TransactionId`]: identity of one explicit transaction
//! - [`Error`] / [`Result`]: the error taxonomy and its recoverability classifier

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bookmark;
pub mod error;
pub mod types;
pub mod value;

pub use bookmark::Bookmark;
pub use error::{Error, Result, ServerErrorClass};
pub use types::TransactionId;
pub use value::{Params, Value};
