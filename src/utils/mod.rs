//! # Utility Modules
//!
//! Supporting utilities used throughout the protocol implementation.

pub mod logging;
