//! # Protocol Layer
//!
//! Message serialization, the client handshake, and session orchestration.

pub mod handshake;
pub mod message;
pub mod session;
