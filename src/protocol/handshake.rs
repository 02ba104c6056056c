//! Client-side handshake: key agreement plus mutual challenge-response
//! authentication.
//!
//! The flow is linear, with no back-edges:
//!
//! 1. generate single-use key and challenge nonces, send the handshake
//!    request as a plain packet;
//! 2. read the handshake response, derive the session key from our private
//!    key, the server's public key, and both key nonces, then verify the
//!    server's `cr_hmac` over the response bytes and our challenge nonce;
//! 3. prove we derived the same key by sending the short-MAC digest of the
//!    server's challenge nonce as the first authenticated packet.
//!
//! ## Caller obligation
//!
//! MAC verification alone does not stop a man-in-the-middle that holds a
//! valid keypair. The caller MUST compare [`ServerIdentity::public_key`]
//! against a previously pinned value (see
//! [`ServerIdentity::matches_pinned_key`]) before trusting the session.
//! This engine holds no pinned-key store of its own.

use crate::config::{SessionConfig, CLIENT_IV_INITIAL, SERVER_IV_INITIAL};
use crate::core::packet::{read_plain_packet, write_authed_packet, write_plain_packet};
use crate::crypto::{CipherSuite, EncryptionKeyPair, KEY_SIZE, PUBLIC_KEY_SIZE};
use crate::error::{ProtocolError, Result};
use crate::protocol::message::request::{HandshakeAck, HandshakeRequest};
use crate::protocol::message::response::{HandshakeResponse, HANDSHAKE_RESPONSE_HMAC_COVERED};
use crate::protocol::message::STATUS_OK;
use crate::protocol::session::Session;
use subtle::ConstantTimeEq;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Identity the server presented during the handshake.
///
/// The public key here is exactly what arrived on the wire. It is
/// authenticated against the derived session key, but not against any prior
/// knowledge of the server; pinning is the caller's job.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub server_id: Uuid,
    pub public_key: [u8; PUBLIC_KEY_SIZE],
}

impl ServerIdentity {
    /// Constant-time comparison against a pinned server public key.
    pub fn matches_pinned_key(&self, pinned: &[u8; PUBLIC_KEY_SIZE]) -> bool {
        self.public_key[..].ct_eq(&pinned[..]).into()
    }
}

/// Run the client handshake over `stream`, returning a live [`Session`] and
/// the server's wire identity.
///
/// `client_private_key` is the private encryption key from the client's
/// entity certificate; `client_id` is the entity id the server knows the
/// matching public key under.
///
/// # Errors
/// - [`ProtocolError::UnauthorizedPacket`] if `cr_hmac` verification fails;
///   all derived key material is zeroed before returning.
/// - [`ProtocolError::UnexpectedValue`] if the server refuses the handshake
///   (nonzero embedded status) or answers with a different protocol version
///   or cipher suite.
#[instrument(skip(stream, suite, config, client_private_key), fields(client_id = %client_id))]
pub async fn handshake<S>(
    mut stream: S,
    suite: CipherSuite,
    config: SessionConfig,
    client_id: Uuid,
    client_private_key: &[u8; KEY_SIZE],
) -> Result<(Session<S>, ServerIdentity)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key_nonce = suite.random_nonce();
    let challenge_nonce = suite.random_nonce();

    let request = HandshakeRequest {
        offset: 0,
        protocol_version: config.protocol_version,
        crypto_suite: suite.id(),
        entity_id: client_id,
        key_nonce,
        challenge_nonce,
    };
    write_plain_packet(&mut stream, &request.encode(), config.max_payload_size).await?;
    debug!("handshake request sent");

    let payload = read_plain_packet(&mut stream, config.max_payload_size).await?;
    let response = HandshakeResponse::decode(&payload)?;

    // Two signals: the decode succeeding means the exchange completed; the
    // embedded status says whether the server accepted the request.
    if response.status != STATUS_OK {
        return Err(ProtocolError::UnexpectedValue);
    }
    if response.protocol_version != config.protocol_version
        || response.crypto_suite != suite.id()
    {
        return Err(ProtocolError::UnexpectedValue);
    }

    let client_keypair = EncryptionKeyPair::from_secret_bytes(*client_private_key);
    let key = suite.derive_session_key(
        client_keypair.secret(),
        &response.server_public_key,
        &response.server_key_nonce,
        &key_nonce,
    );

    // cr_hmac covers the response bytes up to the MAC field, then our
    // challenge nonce, keyed by the derived session key.
    let mut mac = suite.auth_mac(&key)?;
    mac.update(&payload[..HANDSHAKE_RESPONSE_HMAC_COVERED]);
    mac.update(&challenge_nonce);
    if !mac.verify(&response.cr_hmac) {
        return Err(ProtocolError::UnauthorizedPacket);
    }
    debug!(server_id = %response.server_id, "server authenticated");

    // Prove we derived the same key: short-MAC digest of the server's
    // challenge nonce, sent as the first authenticated packet.
    let mut ack_mac = suite.packet_mac(&key)?;
    ack_mac.update(&response.server_challenge_nonce);
    let ack = HandshakeAck {
        digest: ack_mac.finalize(),
    };
    write_authed_packet(
        &mut stream,
        &suite,
        &key,
        CLIENT_IV_INITIAL,
        &ack.encode(),
        config.max_payload_size,
    )
    .await?;
    debug!("handshake acknowledge sent");

    let identity = ServerIdentity {
        server_id: response.server_id,
        public_key: response.server_public_key,
    };
    let session = Session::from_parts(
        stream,
        suite,
        config,
        key,
        CLIENT_IV_INITIAL.wrapping_add(1),
        SERVER_IV_INITIAL,
    );
    Ok((session, identity))
}
