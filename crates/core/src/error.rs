//! Error types for graphtx
//!
//! Every fallible operation returns [`Result`]. Errors fall into two groups
//! that decide what happens to a transaction when a statement fails:
//!
//! | Group | Variants | Effect on the transaction |
//! |-------|----------|---------------------------|
//! | Recoverable | `Server` with a client or transient code | marked for rollback, still closable over the wire |
//! | Fatal | `Connection`, `Protocol`, other `Server` codes | failed, close skips the network |
//!
//! `Usage` and `Canceled` never originate from a statement; they are fatal
//! when they do reach the classifier.

use thiserror::Error;

/// All graphtx errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller used the API illegally (e.g. run on a terminated transaction)
    #[error("{0}")]
    Usage(String),

    /// The server answered a request with a FAILURE reply
    #[error("server error {code}: {message}")]
    Server {
        /// Status code, e.g. `Neo.ClientError.Statement.SyntaxError`
        code: String,
        /// Human-readable message from the server
        message: String,
    },

    /// Transport-level fault (I/O error, closed socket)
    #[error("connection error: {0}")]
    Connection(String),

    /// The peer violated the protocol
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A pending operation's completer was dropped before completing it
    #[error("operation canceled: {0}")]
    Canceled(String),
}

/// Result type for graphtx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification segment of a server status code
///
/// Status codes have the shape `<Namespace>.<Classification>.<Category>.<Title>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorClass {
    /// The request was wrong; the session is still usable
    Client,
    /// Temporary condition; retrying may succeed
    Transient,
    /// The database failed; the session can no longer be trusted
    Database,
    /// Anything else
    Unknown,
}

impl ServerErrorClass {
    /// Parse the classification out of a status code
    pub fn of(code: &str) -> Self {
        match code.split('.').nth(1) {
            Some("ClientError") => ServerErrorClass::Client,
            Some("TransientError") => ServerErrorClass::Transient,
            Some("DatabaseError") => ServerErrorClass::Database,
            _ => ServerErrorClass::Unknown,
        }
    }
}

impl Error {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    /// Create a server error
    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Server {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Error::Connection(message.into())
    }

    /// Check if the connection is still usable after this error
    ///
    /// Only client and transient server errors qualify, and not the request
    /// format errors which mean client and server disagree on the protocol.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Server { code, .. } => {
                !is_protocol_violation(code)
                    && matches!(
                        ServerErrorClass::of(code),
                        ServerErrorClass::Client | ServerErrorClass::Transient
                    )
            }
            _ => false,
        }
    }

    /// Check if this is a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }

    /// Server status code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Server { code, .. } => Some(code),
            _ => None,
        }
    }
}

fn is_protocol_violation(code: &str) -> bool {
    let mut parts = code.split('.').skip(1);
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some("ClientError"), Some("Request"), Some("Invalid" | "InvalidFormat"))
    )
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Connection(e.to_string())
    }
}
