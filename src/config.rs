//! # Configuration
//!
//! Protocol constants and session configuration.
//!
//! The constants here are part of the wire contract and must match the agent
//! service exactly; `SessionConfig` covers the knobs a deployment may tune
//! (packet ceiling, protocol version advertisement).
//!
//! ## Configuration Sources
//! - TOML files via `SessionConfig::from_toml()`
//! - Direct instantiation with defaults

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};

/// Current supported protocol version, advertised in the handshake request.
pub const PROTOCOL_VERSION: u32 = 1;

/// Identifier of the only cipher suite this engine speaks
/// (x25519 agreement, ChaCha20 stream cipher, HMAC-SHA-256/512).
pub const CRYPTO_SUITE_V1: u32 = 1;

/// Hard ceiling on a decrypted packet payload (250 MiB).
///
/// Enforced in the packet codec before any payload allocation; a declared
/// size above this is treated as an unauthorized packet.
pub const MAX_PACKET_PAYLOAD: usize = 250 * 1024 * 1024;

/// First IV used for client-to-server authenticated packets.
pub const CLIENT_IV_INITIAL: u64 = 0x0000_0000_0000_0001;

/// First IV used for server-to-client authenticated packets.
///
/// The high-bit split keeps the two directions from ever keying the stream
/// cipher with the same IV under the shared secret.
pub const SERVER_IV_INITIAL: u64 = 0x8000_0000_0000_0001;

/// Per-session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Maximum decrypted payload size accepted from the peer.
    pub max_payload_size: usize,

    /// Protocol version advertised during the handshake.
    pub protocol_version: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PACKET_PAYLOAD,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_payload_size == 0 {
            errors.push("max payload size cannot be 0".to_string());
        } else if self.max_payload_size > MAX_PACKET_PAYLOAD {
            errors.push(format!(
                "max payload size too large: {} bytes (protocol ceiling: {} bytes)",
                self.max_payload_size, MAX_PACKET_PAYLOAD
            ));
        }

        if self.protocol_version != PROTOCOL_VERSION {
            errors.push(format!(
                "unsupported protocol version: {} (supported: {})",
                self.protocol_version, PROTOCOL_VERSION
            ));
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::Config(format!(
                "configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}
