//! Packet framing over an async byte stream.
//!
//! Two frame families share the `[type:u32][size:u32]` prefix:
//!
//! - **Plain packets** carry the two handshake messages exchanged before a
//!   session key exists: `[PLAIN][size][payload]`, no crypto.
//! - **Authenticated packets** carry everything else:
//!   `[AUTHED][size][ciphertext][mac]`, where type, size, and payload are
//!   encrypted as one continuous keystream under `(key, IV)` and the 32-byte
//!   MAC covers the encrypted bytes (encrypt-then-MAC).
//!
//! On receive, the MAC is verified over the still-encrypted body *before*
//! any byte of it is decrypted; the type tag and declared size are validated
//! before the body is even read. Short reads and writes are hard failures.

use crate::crypto::{CipherSuite, SessionKey, PACKET_MAC_SIZE};
use crate::error::{ProtocolError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};
use zeroize::Zeroizing;

/// Type tag of an unencrypted (handshake-phase) packet.
pub const PACKET_TYPE_PLAIN: u32 = 0x20;

/// Type tag of an encrypted, MAC-protected packet.
pub const PACKET_TYPE_AUTHED: u32 = 0x30;

/// Size of the type + size prefix.
pub const PACKET_HEADER_SIZE: usize = 4 + 4;

/// Raw bytes read up front for an authenticated packet: encrypted prefix
/// plus trailing MAC.
const RAW_AUTHED_HEADER_SIZE: usize = PACKET_HEADER_SIZE + PACKET_MAC_SIZE;

fn check_payload_len(len: usize, max: usize) -> Result<u32> {
    if len > max || u32::try_from(len).is_err() {
        return Err(ProtocolError::InvalidArgument(
            "payload exceeds maximum packet size",
        ));
    }
    Ok(len as u32)
}

/// Write an unencrypted packet: `[PLAIN][size][payload]`.
pub async fn write_plain_packet<S>(stream: &mut S, payload: &[u8], max: usize) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let size = check_payload_len(payload.len(), max)?;

    let mut buf = Vec::with_capacity(PACKET_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&PACKET_TYPE_PLAIN.to_be_bytes());
    buf.extend_from_slice(&size.to_be_bytes());
    buf.extend_from_slice(payload);

    stream
        .write_all(&buf)
        .await
        .map_err(ProtocolError::WriteFailure)?;
    stream.flush().await.map_err(ProtocolError::WriteFailure)?;

    debug!(bytes = payload.len(), "plain packet written");
    Ok(())
}

/// Read an unencrypted packet, enforcing the type tag and size ceiling
/// before the payload is read.
pub async fn read_plain_packet<S>(stream: &mut S, max: usize) -> Result<Zeroizing<Vec<u8>>>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; PACKET_HEADER_SIZE];
    stream
        .read_exact(&mut header)
        .await
        .map_err(ProtocolError::from_read)?;

    let packet_type = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    if packet_type != PACKET_TYPE_PLAIN {
        return Err(ProtocolError::UnexpectedDataType(packet_type));
    }

    let size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if size > max {
        return Err(ProtocolError::UnexpectedDataSize(size));
    }

    let mut payload = Zeroizing::new(vec![0u8; size]);
    stream
        .read_exact(&mut payload)
        .await
        .map_err(ProtocolError::from_read)?;

    debug!(bytes = size, "plain packet read");
    Ok(payload)
}

/// Frame, encrypt, MAC, and send one authenticated packet.
///
/// The type/size prefix and the payload are encrypted as one continuous
/// keystream under `(key, iv)`; the MAC is computed over the encrypted
/// bytes and appended.
#[instrument(skip(stream, suite, key, plaintext), fields(bytes = plaintext.len()))]
pub async fn write_authed_packet<S>(
    stream: &mut S,
    suite: &CipherSuite,
    key: &SessionKey,
    iv: u64,
    plaintext: &[u8],
    max: usize,
) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let size = check_payload_len(plaintext.len(), max)?;

    // Holds plaintext until apply() below, so wipe it on every exit path.
    let mut buf = Zeroizing::new(Vec::with_capacity(
        RAW_AUTHED_HEADER_SIZE + plaintext.len(),
    ));
    buf.extend_from_slice(&PACKET_TYPE_AUTHED.to_be_bytes());
    buf.extend_from_slice(&size.to_be_bytes());
    buf.extend_from_slice(plaintext);

    let mut cipher = suite.packet_cipher(key, iv)?;
    cipher.apply(&mut buf);

    let mut mac = suite.packet_mac(key)?;
    mac.update(&buf);
    let tag = mac.finalize();
    buf.extend_from_slice(&tag);

    stream
        .write_all(&buf)
        .await
        .map_err(ProtocolError::WriteFailure)?;
    stream.flush().await.map_err(ProtocolError::WriteFailure)?;

    debug!("authenticated packet written");
    Ok(())
}

/// Receive, verify, and decrypt one authenticated packet, returning the
/// plaintext payload.
///
/// The declared size is unknown until the prefix is decrypted, so the read
/// happens in two steps: first a fixed `PACKET_HEADER_SIZE + PACKET_MAC_SIZE`
/// bytes (the smallest any frame can be), then the remaining `size` bytes.
/// The ciphertext and trailing MAC are sliced out of the two reads combined.
///
/// Validation order is load-bearing:
/// 1. decrypt only the 8-byte prefix, tracking the keystream offset;
/// 2. reject a wrong type tag or a declared size above the ceiling before
///    reading the rest of the frame;
/// 3. verify the MAC over the encrypted prefix and encrypted body, in
///    constant time;
/// 4. only then resume the keystream and decrypt the body.
///
/// Any failure zeroizes every intermediate buffer before propagating.
#[instrument(skip(stream, suite, key), fields(iv = iv))]
pub async fn read_authed_packet<S>(
    stream: &mut S,
    suite: &CipherSuite,
    key: &SessionKey,
    iv: u64,
    max: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    S: AsyncRead + Unpin,
{
    let mut raw_header = [0u8; RAW_AUTHED_HEADER_SIZE];
    stream
        .read_exact(&mut raw_header)
        .await
        .map_err(ProtocolError::from_read)?;

    let mut cipher = suite.packet_cipher(key, iv)?;
    let mut prefix = Zeroizing::new([0u8; PACKET_HEADER_SIZE]);
    prefix.copy_from_slice(&raw_header[..PACKET_HEADER_SIZE]);
    cipher.apply(&mut *prefix);

    let packet_type = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    if packet_type != PACKET_TYPE_AUTHED {
        return Err(ProtocolError::UnauthorizedPacket);
    }

    let size = u32::from_be_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]) as usize;
    if size > max {
        return Err(ProtocolError::UnauthorizedPacket);
    }

    // Everything after the prefix: the tail of the first read plus `size`
    // more bytes, holding `ciphertext[size] || mac[PACKET_MAC_SIZE]`.
    let mut body = Zeroizing::new(vec![0u8; size + PACKET_MAC_SIZE]);
    body[..PACKET_MAC_SIZE].copy_from_slice(&raw_header[PACKET_HEADER_SIZE..]);
    stream
        .read_exact(&mut body[PACKET_MAC_SIZE..])
        .await
        .map_err(ProtocolError::from_read)?;

    // Authenticate before decrypting: the MAC covers the encrypted prefix
    // and the encrypted body exactly as they appeared on the wire.
    let mut mac = suite.packet_mac(key)?;
    mac.update(&raw_header[..PACKET_HEADER_SIZE]);
    mac.update(&body[..size]);
    if !mac.verify(&body[size..]) {
        return Err(ProtocolError::UnauthorizedPacket);
    }

    // The cipher's keystream offset is still where prefix decryption left
    // it, so the body decrypts in place as a continuation.
    body.truncate(size);
    cipher.apply(&mut body);

    debug!(bytes = size, "authenticated packet read");
    Ok(body)
}
