//! # Error Types
//!
//! Error handling for the agent protocol engine.
//!
//! This module defines the flat error namespace shared by every layer of the
//! protocol, from wire-level framing failures up to handshake authentication.
//!
//! ## Error Categories
//! - **Caller-contract violations**: invalid arguments, undersized payloads
//! - **Transport failures**: stream read/write errors, surfaced verbatim
//! - **Authenticity failures**: MAC, type-tag, or size-ceiling violations
//! - **Crypto-primitive failures**: suite-internal errors
//!
//! Authenticity failures (`UnauthorizedPacket`) are the security-critical
//! path and are never downgraded to a generic error kind.

use std::io;
use thiserror::Error;

/// Primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("stream read failed: {0}")]
    ReadFailure(#[source] io::Error),

    #[error("stream write failed: {0}")]
    WriteFailure(#[source] io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("unexpected data type: {0:#010x}")]
    UnexpectedDataType(u32),

    #[error("unexpected data size: {0} bytes")]
    UnexpectedDataSize(usize),

    #[error("unexpected payload size: need {expected} bytes, have {actual}")]
    UnexpectedPayloadSize { expected: usize, actual: usize },

    #[error("unexpected value")]
    UnexpectedValue,

    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error("unauthorized packet")]
    UnauthorizedPacket,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

impl ProtocolError {
    /// Classify an I/O error raised while reading from the stream.
    ///
    /// An EOF in the middle of a fixed-length read means the peer went away;
    /// everything else is a transport failure.
    pub(crate) fn from_read(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::ReadFailure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_maps_to_connection_closed() {
        let e = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(
            ProtocolError::from_read(e),
            ProtocolError::ConnectionClosed
        ));
    }

    #[test]
    fn other_read_errors_stay_read_failures() {
        let e = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(
            ProtocolError::from_read(e),
            ProtocolError::ReadFailure(_)
        ));
    }
}
