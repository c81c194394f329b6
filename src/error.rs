//! Unified error type.

use std::fmt;
use std::net::SocketAddr;

/// The error type returned by perch's fallible operations.
///
/// Routing outcomes (404, 405, 304, …) are responses, not errors, and the
/// header algorithms are total. What is left is binding the listener; a
/// failed `accept` is logged and the loop carries on.
#[derive(Debug)]
pub enum Error {
    /// The listening socket could not be bound.
    Bind { addr: SocketAddr, source: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "bind {addr}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
        }
    }
}
