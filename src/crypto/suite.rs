//! Concrete cipher suite: x25519 key agreement, ChaCha20 stream cipher with
//! a resumable keystream offset, and HMAC-SHA-256/512 message authentication.
//!
//! Two MAC widths exist on purpose and never mix within one layer: the
//! packet codec always uses the 32-byte short MAC, while the handshake
//! response's `cr_hmac` field uses the 64-byte long MAC.

use crate::config::CRYPTO_SUITE_V1;
use crate::error::{ProtocolError, Result};
use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20::ChaCha20Legacy;
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Size of the derived session key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of key and challenge nonces in bytes.
pub const NONCE_SIZE: usize = 32;

/// Size of an x25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of the short MAC protecting authenticated packets.
pub const PACKET_MAC_SIZE: usize = 32;

/// Size of the long MAC carried as `cr_hmac` in the handshake response.
pub const AUTH_MAC_SIZE: usize = 64;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Symmetric session key derived once per connection via key agreement.
///
/// Keys both the stream cipher and the MACs for all authenticated packets.
/// Zeroed on drop.
pub struct SessionKey(Zeroizing<[u8; KEY_SIZE]>);

impl SessionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Constant-time key comparison.
    pub fn ct_eq(&self, other: &SessionKey) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

/// An x25519 keypair used for session key agreement.
///
/// The secret half is zeroized on drop by the underlying implementation.
pub struct EncryptionKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EncryptionKeyPair {
    /// Reconstruct a keypair from raw secret key bytes, e.g. the private
    /// encryption key held in an entity's private certificate.
    pub fn from_secret_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public.to_bytes()
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}

/// Explicit cipher-suite value, passed by reference wherever crypto
/// capabilities are needed.
#[derive(Debug, Clone, Copy)]
pub struct CipherSuite {
    id: u32,
}

impl CipherSuite {
    /// The version-1 suite: x25519 / ChaCha20 / HMAC-SHA-256/512.
    pub fn v1() -> Self {
        Self { id: CRYPTO_SUITE_V1 }
    }

    /// Suite identifier advertised in the handshake request.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Draw a fresh nonce from the OS CSPRNG.
    ///
    /// Nonces are single-use per handshake and must never be replayed.
    pub fn random_nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    /// Generate a fresh key-agreement keypair.
    pub fn generate_keypair(&self) -> EncryptionKeyPair {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        EncryptionKeyPair { secret, public }
    }

    /// Derive the short-term session key from our private key, the peer's
    /// public key, and both key nonces.
    ///
    /// Both sides compute the same value: the raw DH output is hashed
    /// together with the two nonces under fixed domain labels, so a replayed
    /// public key still yields a fresh session key per handshake.
    pub fn derive_session_key(
        &self,
        private: &StaticSecret,
        peer_public: &[u8; PUBLIC_KEY_SIZE],
        server_key_nonce: &[u8; NONCE_SIZE],
        client_key_nonce: &[u8; NONCE_SIZE],
    ) -> SessionKey {
        let dh = private.diffie_hellman(&PublicKey::from(*peer_public));

        let mut hasher = Sha256::new();
        hasher.update(dh.as_bytes());
        hasher.update(b"server_key_nonce");
        hasher.update(server_key_nonce);
        hasher.update(b"client_key_nonce");
        hasher.update(client_key_nonce);

        SessionKey(Zeroizing::new(hasher.finalize().into()))
    }

    /// Stream cipher keyed by `(key, IV)` with a resumable keystream offset.
    pub fn packet_cipher(&self, key: &SessionKey, iv: u64) -> Result<PacketCipher> {
        let iv_bytes = iv.to_be_bytes();
        let cipher = ChaCha20Legacy::new_from_slices(key.as_bytes(), &iv_bytes)
            .map_err(|e| ProtocolError::Crypto(format!("stream cipher init: {e}")))?;
        Ok(PacketCipher(cipher))
    }

    /// Short MAC used by the authenticated packet codec.
    pub fn packet_mac(&self, key: &SessionKey) -> Result<PacketMac> {
        let mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| ProtocolError::Crypto(format!("short mac init: {e}")))?;
        Ok(PacketMac(mac))
    }

    /// Long MAC used for the handshake challenge-response (`cr_hmac`).
    pub fn auth_mac(&self, key: &SessionKey) -> Result<AuthMac> {
        let mac = HmacSha512::new_from_slice(key.as_bytes())
            .map_err(|e| ProtocolError::Crypto(format!("long mac init: {e}")))?;
        Ok(AuthMac(mac))
    }
}

/// Stream cipher instance for one packet.
///
/// The 8-byte type/size prefix and the variable-length body share one
/// continuous keystream, so decryption of the body resumes at the offset
/// where prefix decryption stopped.
pub struct PacketCipher(ChaCha20Legacy);

impl PacketCipher {
    /// Encrypt or decrypt `buf` in place, advancing the keystream offset.
    pub fn apply(&mut self, buf: &mut [u8]) {
        self.0.apply_keystream(buf);
    }

    /// Current keystream offset in bytes.
    pub fn pos(&self) -> u64 {
        self.0.current_pos()
    }

    /// Reposition the keystream offset.
    pub fn seek(&mut self, pos: u64) {
        self.0.seek(pos);
    }
}

/// Incremental short MAC (32-byte tag).
pub struct PacketMac(HmacSha256);

impl PacketMac {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> [u8; PACKET_MAC_SIZE] {
        self.0.finalize().into_bytes().into()
    }

    /// Constant-time tag verification.
    pub fn verify(self, tag: &[u8]) -> bool {
        self.0.verify_slice(tag).is_ok()
    }
}

/// Incremental long MAC (64-byte tag).
pub struct AuthMac(HmacSha512);

impl AuthMac {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> [u8; AUTH_MAC_SIZE] {
        self.0.finalize().into_bytes().into()
    }

    /// Constant-time tag verification.
    pub fn verify(self, tag: &[u8]) -> bool {
        self.0.verify_slice(tag).is_ok()
    }
}
