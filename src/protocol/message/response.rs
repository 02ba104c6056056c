//! Response message codecs (agent to client).
//!
//! Per-message encoders exist alongside the decoders so that scripted
//! servers and round-trip tests can produce bit-exact response payloads;
//! they all funnel through [`super::encode_generic_response`].

use super::{
    check_request_id, encode_generic_response, header_only_response, request_id, uuid_response,
};
use crate::core::wire::{put_blob, put_uuid, Reader};
use crate::crypto::{AUTH_MAC_SIZE, NONCE_SIZE, PUBLIC_KEY_SIZE};
use crate::error::Result;
use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// Total encoded size of a handshake response.
pub const HANDSHAKE_RESPONSE_SIZE: usize =
    12 + 4 + 4 + 16 + PUBLIC_KEY_SIZE + 2 * NONCE_SIZE + AUTH_MAC_SIZE;

/// Number of leading bytes of the handshake response covered by `cr_hmac`
/// (everything up to, but excluding, the MAC field itself).
pub const HANDSHAKE_RESPONSE_HMAC_COVERED: usize = HANDSHAKE_RESPONSE_SIZE - AUTH_MAC_SIZE;

/// Server's answer to the handshake request.
///
/// `cr_hmac` is the long MAC, keyed by the derived session key, over the
/// encoded response up to the MAC field followed by the client's challenge
/// nonce. Verifying it authenticates the server to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    pub offset: u32,
    pub status: u32,
    pub protocol_version: u32,
    pub crypto_suite: u32,
    pub server_id: Uuid,
    pub server_public_key: [u8; PUBLIC_KEY_SIZE],
    pub server_key_nonce: [u8; NONCE_SIZE],
    pub server_challenge_nonce: [u8; NONCE_SIZE],
    pub cr_hmac: [u8; AUTH_MAC_SIZE],
}

impl HandshakeResponse {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HANDSHAKE_RESPONSE_SIZE);
        buf.put_u32(request_id::HANDSHAKE_INITIATE);
        buf.put_u32(self.status);
        buf.put_u32(self.offset);
        buf.put_u32(self.protocol_version);
        buf.put_u32(self.crypto_suite);
        put_uuid(&mut buf, &self.server_id);
        buf.put_slice(&self.server_public_key);
        buf.put_slice(&self.server_key_nonce);
        buf.put_slice(&self.server_challenge_nonce);
        buf.put_slice(&self.cr_hmac);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::HANDSHAKE_INITIATE)?;
        let status = r.read_u32()?;
        let offset = r.read_u32()?;
        let protocol_version = r.read_u32()?;
        let crypto_suite = r.read_u32()?;
        let server_id = r.read_uuid()?;
        let server_public_key = r.read_array()?;
        let server_key_nonce = r.read_array()?;
        let server_challenge_nonce = r.read_array()?;
        let cr_hmac = r.read_array()?;
        r.finish()?;
        Ok(Self {
            offset,
            status,
            protocol_version,
            crypto_suite,
            server_id,
            server_public_key,
            server_key_nonce,
            server_challenge_nonce,
            cr_hmac,
        })
    }
}

uuid_response!(
    /// Carries the id of the latest block in the chain.
    LatestBlockIdGetResponse,
    request_id::LATEST_BLOCK_ID_GET,
    block_id
);

uuid_response!(
    /// Carries the id of the block after the queried one.
    BlockNextIdGetResponse,
    request_id::BLOCK_ID_GET_NEXT,
    block_id
);

uuid_response!(
    /// Carries the id of the block before the queried one.
    BlockPrevIdGetResponse,
    request_id::BLOCK_ID_GET_PREV,
    block_id
);

uuid_response!(
    /// Carries the block id found at the queried height.
    BlockIdByHeightGetResponse,
    request_id::BLOCK_ID_BY_HEIGHT_GET,
    block_id
);

uuid_response!(
    /// Carries the id of the transaction after the queried one.
    TransactionNextIdGetResponse,
    request_id::TRANSACTION_ID_GET_NEXT,
    txn_id
);

uuid_response!(
    /// Carries the id of the transaction before the queried one.
    TransactionPrevIdGetResponse,
    request_id::TRANSACTION_ID_GET_PREV,
    txn_id
);

uuid_response!(
    /// Carries the id of the block containing the queried transaction.
    TransactionBlockIdGetResponse,
    request_id::TRANSACTION_BLOCK_ID_GET,
    block_id
);

uuid_response!(
    /// Carries the first transaction id recorded for the queried artifact.
    ArtifactFirstTxnIdGetResponse,
    request_id::ARTIFACT_FIRST_TXN_BY_ID_GET,
    txn_id
);

uuid_response!(
    /// Carries the last transaction id recorded for the queried artifact.
    ArtifactLastTxnIdGetResponse,
    request_id::ARTIFACT_LAST_TXN_BY_ID_GET,
    txn_id
);

header_only_response!(
    /// Acknowledges a submitted transaction; the status field says whether
    /// it was accepted.
    TransactionSubmitResponse,
    request_id::TRANSACTION_SUBMIT
);

header_only_response!(
    /// Reports agent liveness via the status field.
    StatusGetResponse,
    request_id::STATUS_GET
);

header_only_response!(
    /// Confirms the connection will be closed.
    ConnectionCloseResponse,
    request_id::CONNECTION_CLOSE
);

header_only_response!(
    /// Delivered when a latest-block-id assertion is invalidated.
    AssertLatestBlockIdResponse,
    request_id::ASSERT_LATEST_BLOCK_ID
);

header_only_response!(
    /// Confirms cancellation of a latest-block-id assertion.
    AssertLatestBlockIdCancelResponse,
    request_id::ASSERT_LATEST_BLOCK_ID_CANCEL
);

header_only_response!(
    /// Confirms the extended API is enabled for this session.
    ExtendedApiEnableResponse,
    request_id::EXTENDED_API_ENABLE
);

/// Full block record: linkage ids, height, and the block certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGetResponse {
    pub offset: u32,
    pub status: u32,
    pub block_id: Uuid,
    pub prev_block_id: Uuid,
    pub next_block_id: Uuid,
    pub first_txn_id: Uuid,
    pub block_height: u64,
    pub cert: Vec<u8>,
}

impl BlockGetResponse {
    pub fn encode(&self) -> Bytes {
        let mut body = BytesMut::with_capacity(80 + self.cert.len());
        put_uuid(&mut body, &self.block_id);
        put_uuid(&mut body, &self.prev_block_id);
        put_uuid(&mut body, &self.next_block_id);
        put_uuid(&mut body, &self.first_txn_id);
        body.put_u64(self.block_height);
        put_blob(&mut body, &self.cert);
        encode_generic_response(request_id::BLOCK_BY_ID_GET, self.offset, self.status, &body)
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::BLOCK_BY_ID_GET)?;
        let status = r.read_u32()?;
        let offset = r.read_u32()?;
        let block_id = r.read_uuid()?;
        let prev_block_id = r.read_uuid()?;
        let next_block_id = r.read_uuid()?;
        let first_txn_id = r.read_uuid()?;
        let block_height = r.read_u64()?;
        let cert = r.read_blob()?;
        r.finish()?;
        Ok(Self {
            offset,
            status,
            block_id,
            prev_block_id,
            next_block_id,
            first_txn_id,
            block_height,
            cert,
        })
    }
}

/// Full transaction record: linkage ids, owning artifact and block, and the
/// transaction certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionGetResponse {
    pub offset: u32,
    pub status: u32,
    pub txn_id: Uuid,
    pub prev_txn_id: Uuid,
    pub next_txn_id: Uuid,
    pub artifact_id: Uuid,
    pub block_id: Uuid,
    pub cert: Vec<u8>,
}

impl TransactionGetResponse {
    pub fn encode(&self) -> Bytes {
        let mut body = BytesMut::with_capacity(88 + self.cert.len());
        put_uuid(&mut body, &self.txn_id);
        put_uuid(&mut body, &self.prev_txn_id);
        put_uuid(&mut body, &self.next_txn_id);
        put_uuid(&mut body, &self.artifact_id);
        put_uuid(&mut body, &self.block_id);
        put_blob(&mut body, &self.cert);
        encode_generic_response(
            request_id::TRANSACTION_BY_ID_GET,
            self.offset,
            self.status,
            &body,
        )
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::TRANSACTION_BY_ID_GET)?;
        let status = r.read_u32()?;
        let offset = r.read_u32()?;
        let txn_id = r.read_uuid()?;
        let prev_txn_id = r.read_uuid()?;
        let next_txn_id = r.read_uuid()?;
        let artifact_id = r.read_uuid()?;
        let block_id = r.read_uuid()?;
        let cert = r.read_blob()?;
        r.finish()?;
        Ok(Self {
            offset,
            status,
            txn_id,
            prev_txn_id,
            next_txn_id,
            artifact_id,
            block_id,
            cert,
        })
    }
}

/// Agent's answer to an extended-API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedApiResponse {
    pub offset: u64,
    pub status: u32,
    pub body: Vec<u8>,
}

impl ExtendedApiResponse {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(24 + self.body.len());
        buf.put_u32(request_id::EXTENDED_API_SENDRECV);
        buf.put_u32(self.status);
        buf.put_u64(self.offset);
        put_blob(&mut buf, &self.body);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::EXTENDED_API_SENDRECV)?;
        let status = r.read_u32()?;
        let offset = r.read_u64()?;
        let body = r.read_blob()?;
        r.finish()?;
        Ok(Self {
            offset,
            status,
            body,
        })
    }
}

/// An extended-API call routed *to* this client, which is acting as the
/// endpoint for the verb. Carries the calling client's identity and public
/// keys so the endpoint can authenticate and answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedApiClientRequestMsg {
    pub offset: u64,
    pub client_id: Uuid,
    pub verb_id: Uuid,
    pub client_enc_pubkey: Vec<u8>,
    pub client_sign_pubkey: Vec<u8>,
    pub body: Vec<u8>,
}

impl ExtendedApiClientRequestMsg {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            68 + self.client_enc_pubkey.len() + self.client_sign_pubkey.len() + self.body.len(),
        );
        buf.put_u32(request_id::EXTENDED_API_CLIENTREQ);
        buf.put_u64(self.offset);
        put_uuid(&mut buf, &self.client_id);
        put_uuid(&mut buf, &self.verb_id);
        put_blob(&mut buf, &self.client_enc_pubkey);
        put_blob(&mut buf, &self.client_sign_pubkey);
        put_blob(&mut buf, &self.body);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::EXTENDED_API_CLIENTREQ)?;
        let offset = r.read_u64()?;
        let client_id = r.read_uuid()?;
        let verb_id = r.read_uuid()?;
        let client_enc_pubkey = r.read_blob()?;
        let client_sign_pubkey = r.read_blob()?;
        let body = r.read_blob()?;
        r.finish()?;
        Ok(Self {
            offset,
            client_id,
            verb_id,
            client_enc_pubkey,
            client_sign_pubkey,
            body,
        })
    }
}
