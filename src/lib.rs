//! # agentwire
//!
//! Authenticated client protocol engine for a blockchain agent service.
//!
//! This crate establishes an encrypted, mutually authenticated session over
//! any async byte stream, then frames and serializes the request/response
//! messages the agent's remote API speaks.
//!
//! ## Layers
//! - [`core::wire`] — big-endian primitive codec (integers, UUIDs, blobs)
//! - [`core::packet`] — encrypt-then-MAC packet framing with per-direction
//!   64-bit IVs and a 250 MiB payload ceiling
//! - [`protocol::message`] — typed codecs for every protocol verb
//! - [`protocol::handshake`] — x25519 key agreement plus challenge-response
//!   authentication
//! - [`protocol::session`] — send/receive orchestration and IV bookkeeping
//!
//! ## Example
//! ```ignore
//! use agentwire::config::SessionConfig;
//! use agentwire::crypto::CipherSuite;
//! use agentwire::protocol::handshake::handshake;
//! use agentwire::protocol::message::{decode_response_header, response, STATUS_OK};
//!
//! let stream = tokio::net::TcpStream::connect("agent:4931").await?;
//! let (mut session, identity) = handshake(
//!     stream,
//!     CipherSuite::v1(),
//!     SessionConfig::default(),
//!     client_id,
//!     cert.private_encryption_key(),
//! )
//! .await?;
//!
//! // Required: authenticate the server against a pinned key before use.
//! if !identity.matches_pinned_key(&pinned_server_key) {
//!     return Err(agentwire::error::ProtocolError::UnauthorizedPacket.into());
//! }
//!
//! session.send_latest_block_id_get(1).await?;
//! let payload = session.recv().await?;
//! let header = decode_response_header(&payload)?;
//! assert_eq!(header.status, STATUS_OK);
//! let resp = response::LatestBlockIdGetResponse::decode(&payload)?;
//! println!("latest block: {}", resp.block_id);
//! ```
//!
//! ## Security
//! - MAC verification always precedes payload decryption
//! - session keys, nonces, and decrypted payloads are zeroed on drop,
//!   including every error path
//! - the server's public key must be pinned by the caller; see
//!   [`protocol::handshake::ServerIdentity`]

pub mod cert;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::handshake::{handshake, ServerIdentity};
pub use crate::protocol::session::Session;
