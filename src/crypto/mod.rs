//! # Crypto Suite Capability
//!
//! The protocol engine never implements cryptographic primitives itself; it
//! consumes them through the [`suite::CipherSuite`] value defined here. The
//! suite is constructed once at startup and passed by reference into every
//! call that needs crypto capabilities — there is no global registry.

pub mod suite;

pub use suite::{
    CipherSuite, EncryptionKeyPair, SessionKey, AUTH_MAC_SIZE, KEY_SIZE, NONCE_SIZE,
    PACKET_MAC_SIZE, PUBLIC_KEY_SIZE,
};
