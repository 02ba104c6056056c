#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Full handshake exchanges against a scripted in-process server.

use agentwire::config::{SessionConfig, CLIENT_IV_INITIAL, SERVER_IV_INITIAL};
use agentwire::core::packet::{
    read_authed_packet, read_plain_packet, write_authed_packet, write_plain_packet,
};
use agentwire::crypto::{CipherSuite, EncryptionKeyPair, KEY_SIZE, PUBLIC_KEY_SIZE};
use agentwire::error::ProtocolError;
use agentwire::protocol::handshake::handshake;
use agentwire::protocol::message::request::{HandshakeAck, HandshakeRequest};
use agentwire::protocol::message::response::{
    HandshakeResponse, StatusGetResponse, HANDSHAKE_RESPONSE_HMAC_COVERED,
};
use agentwire::protocol::message::STATUS_OK;
use tokio::io::{duplex, DuplexStream};
use uuid::Uuid;
use x25519_dalek::StaticSecret;

const CLIENT_SECRET: [u8; KEY_SIZE] = [0x21; KEY_SIZE];
const SERVER_SECRET: [u8; KEY_SIZE] = [0x43; KEY_SIZE];

fn client_id() -> Uuid {
    Uuid::from_bytes([0xC1; 16])
}

fn server_id() -> Uuid {
    Uuid::from_bytes([0x5E; 16])
}

/// Ways the scripted server can deviate from the honest flow.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Script {
    Honest,
    /// Flip one byte of the computed `cr_hmac`.
    CorruptHmac,
    /// Answer with a nonzero embedded status.
    Refuse,
    /// Answer with an unknown protocol version.
    WrongVersion,
    /// Derive the challenge MAC under a key the client cannot reach (the
    /// key nonces swapped).
    WrongKey,
}

/// Server half of the handshake, scripted per `script`. On the honest path
/// it verifies the client's acknowledge digest and then sends one
/// status response so the caller can exercise the established session.
async fn serve(mut stream: DuplexStream, script: Script) {
    let suite = CipherSuite::v1();
    let config = SessionConfig::default();
    let server_pair = EncryptionKeyPair::from_secret_bytes(SERVER_SECRET);
    let client_public = EncryptionKeyPair::from_secret_bytes(CLIENT_SECRET).public_bytes();

    let payload = read_plain_packet(&mut stream, config.max_payload_size)
        .await
        .expect("read handshake request");
    let request = HandshakeRequest::decode(&payload).expect("decode handshake request");
    assert_eq!(request.entity_id, client_id());
    assert_eq!(request.protocol_version, config.protocol_version);
    assert_eq!(request.crypto_suite, suite.id());

    let server_key_nonce = suite.random_nonce();
    let server_challenge_nonce = suite.random_nonce();

    let secret = StaticSecret::from(SERVER_SECRET);
    let key = match script {
        Script::WrongKey => {
            suite.derive_session_key(&secret, &client_public, &request.key_nonce, &server_key_nonce)
        }
        _ => suite.derive_session_key(
            &secret,
            &client_public,
            &server_key_nonce,
            &request.key_nonce,
        ),
    };

    let mut response = HandshakeResponse {
        offset: request.offset,
        status: if script == Script::Refuse { 5 } else { STATUS_OK },
        protocol_version: if script == Script::WrongVersion {
            99
        } else {
            config.protocol_version
        },
        crypto_suite: suite.id(),
        server_id: server_id(),
        server_public_key: server_pair.public_bytes(),
        server_key_nonce,
        server_challenge_nonce,
        cr_hmac: [0; 64],
    };
    let encoded = response.encode();
    let mut mac = suite.auth_mac(&key).unwrap();
    mac.update(&encoded[..HANDSHAKE_RESPONSE_HMAC_COVERED]);
    mac.update(&request.challenge_nonce);
    response.cr_hmac = mac.finalize();
    if script == Script::CorruptHmac {
        response.cr_hmac[17] ^= 0x40;
    }
    write_plain_packet(&mut stream, &response.encode(), config.max_payload_size)
        .await
        .expect("write handshake response");

    if script != Script::Honest {
        return;
    }

    let ack_payload =
        read_authed_packet(&mut stream, &suite, &key, CLIENT_IV_INITIAL, config.max_payload_size)
            .await
            .expect("read handshake acknowledge");
    let ack = HandshakeAck::decode(&ack_payload).expect("decode handshake acknowledge");
    let mut mac = suite.packet_mac(&key).unwrap();
    mac.update(&server_challenge_nonce);
    assert!(mac.verify(&ack.digest), "acknowledge digest mismatch");

    let status = StatusGetResponse {
        offset: 1,
        status: STATUS_OK,
    };
    write_authed_packet(
        &mut stream,
        &suite,
        &key,
        SERVER_IV_INITIAL,
        &status.encode(),
        config.max_payload_size,
    )
    .await
    .expect("write status response");
}

#[tokio::test]
async fn honest_handshake_establishes_a_session() {
    let (client_end, server_end) = duplex(64 * 1024);
    let server = tokio::spawn(serve(server_end, Script::Honest));

    let (mut session, identity) = handshake(
        client_end,
        CipherSuite::v1(),
        SessionConfig::default(),
        client_id(),
        &CLIENT_SECRET,
    )
    .await
    .expect("handshake");

    assert_eq!(identity.server_id, server_id());
    let pinned: [u8; PUBLIC_KEY_SIZE] =
        EncryptionKeyPair::from_secret_bytes(SERVER_SECRET).public_bytes();
    assert!(identity.matches_pinned_key(&pinned));

    // The acknowledge consumed the first client IV; nothing received yet.
    assert_eq!(session.client_iv(), CLIENT_IV_INITIAL + 1);
    assert_eq!(session.server_iv(), SERVER_IV_INITIAL);

    // The session key is live: the server's first response decrypts.
    let payload = session.recv().await.expect("recv status response");
    let status = StatusGetResponse::decode(&payload).expect("decode status response");
    assert_eq!(status.status, STATUS_OK);
    assert_eq!(session.server_iv(), SERVER_IV_INITIAL + 1);

    server.await.unwrap();
}

#[tokio::test]
async fn corrupted_challenge_mac_is_unauthorized() {
    let (client_end, server_end) = duplex(64 * 1024);
    tokio::spawn(serve(server_end, Script::CorruptHmac));

    let err = handshake(
        client_end,
        CipherSuite::v1(),
        SessionConfig::default(),
        client_id(),
        &CLIENT_SECRET,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ProtocolError::UnauthorizedPacket));
}

#[tokio::test]
async fn mismatched_key_derivation_is_unauthorized() {
    let (client_end, server_end) = duplex(64 * 1024);
    tokio::spawn(serve(server_end, Script::WrongKey));

    let err = handshake(
        client_end,
        CipherSuite::v1(),
        SessionConfig::default(),
        client_id(),
        &CLIENT_SECRET,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ProtocolError::UnauthorizedPacket));
}

#[tokio::test]
async fn refused_handshake_is_reported() {
    let (client_end, server_end) = duplex(64 * 1024);
    tokio::spawn(serve(server_end, Script::Refuse));

    let err = handshake(
        client_end,
        CipherSuite::v1(),
        SessionConfig::default(),
        client_id(),
        &CLIENT_SECRET,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ProtocolError::UnexpectedValue));
}

#[tokio::test]
async fn protocol_version_mismatch_is_rejected() {
    let (client_end, server_end) = duplex(64 * 1024);
    tokio::spawn(serve(server_end, Script::WrongVersion));

    let err = handshake(
        client_end,
        CipherSuite::v1(),
        SessionConfig::default(),
        client_id(),
        &CLIENT_SECRET,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ProtocolError::UnexpectedValue));
}

#[tokio::test]
async fn dropped_server_is_connection_closed() {
    let (client_end, mut server_end) = duplex(64 * 1024);
    // Server reads the request and goes away without answering.
    tokio::spawn(async move {
        let config = SessionConfig::default();
        let _ = read_plain_packet(&mut server_end, config.max_payload_size)
            .await
            .expect("read handshake request");
    });

    let err = handshake(
        client_end,
        CipherSuite::v1(),
        SessionConfig::default(),
        client_id(),
        &CLIENT_SECRET,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}
