//! Request message codecs (client to agent).

use super::{
    check_request_id, offset_only_request, request_id, uuid_request,
};
use crate::core::wire::{put_blob, put_uuid, Reader};
use crate::crypto::{NONCE_SIZE, PACKET_MAC_SIZE};
use crate::error::Result;
use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// Opens the handshake: identifies the client entity and offers the
/// single-use key and challenge nonces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub offset: u32,
    pub protocol_version: u32,
    pub crypto_suite: u32,
    pub entity_id: Uuid,
    pub key_nonce: [u8; NONCE_SIZE],
    pub challenge_nonce: [u8; NONCE_SIZE],
}

impl HandshakeRequest {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(16 + 16 + 2 * NONCE_SIZE);
        buf.put_u32(request_id::HANDSHAKE_INITIATE);
        buf.put_u32(self.offset);
        buf.put_u32(self.protocol_version);
        buf.put_u32(self.crypto_suite);
        put_uuid(&mut buf, &self.entity_id);
        buf.put_slice(&self.key_nonce);
        buf.put_slice(&self.challenge_nonce);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::HANDSHAKE_INITIATE)?;
        let offset = r.read_u32()?;
        let protocol_version = r.read_u32()?;
        let crypto_suite = r.read_u32()?;
        let entity_id = r.read_uuid()?;
        let key_nonce = r.read_array()?;
        let challenge_nonce = r.read_array()?;
        r.finish()?;
        Ok(Self {
            offset,
            protocol_version,
            crypto_suite,
            entity_id,
            key_nonce,
            challenge_nonce,
        })
    }
}

/// Handshake acknowledgement: the short-MAC digest of the server's
/// challenge nonce, keyed by the derived session key. Sent as the payload of
/// the first authenticated packet; carries no header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeAck {
    pub digest: [u8; PACKET_MAC_SIZE],
}

impl HandshakeAck {
    pub fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&self.digest)
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let digest = r.read_array()?;
        r.finish()?;
        Ok(Self { digest })
    }
}

offset_only_request!(
    /// Ask for the id of the latest block in the chain.
    LatestBlockIdGetRequest,
    request_id::LATEST_BLOCK_ID_GET
);

offset_only_request!(
    /// Ask for the agent's status.
    StatusGetRequest,
    request_id::STATUS_GET
);

offset_only_request!(
    /// Ask the agent to close the connection cleanly.
    ConnectionCloseRequest,
    request_id::CONNECTION_CLOSE
);

offset_only_request!(
    /// Cancel an outstanding latest-block-id assertion.
    AssertLatestBlockIdCancelRequest,
    request_id::ASSERT_LATEST_BLOCK_ID_CANCEL
);

offset_only_request!(
    /// Enable the extended API on this session.
    ExtendedApiEnableRequest,
    request_id::EXTENDED_API_ENABLE
);

uuid_request!(
    /// Fetch a block record by block id.
    BlockGetRequest,
    request_id::BLOCK_BY_ID_GET,
    block_id
);

uuid_request!(
    /// Fetch the id of the block after the given one.
    BlockNextIdGetRequest,
    request_id::BLOCK_ID_GET_NEXT,
    block_id
);

uuid_request!(
    /// Fetch the id of the block before the given one.
    BlockPrevIdGetRequest,
    request_id::BLOCK_ID_GET_PREV,
    block_id
);

uuid_request!(
    /// Fetch a transaction record by transaction id.
    TransactionGetRequest,
    request_id::TRANSACTION_BY_ID_GET,
    txn_id
);

uuid_request!(
    /// Fetch the id of the transaction after the given one.
    TransactionNextIdGetRequest,
    request_id::TRANSACTION_ID_GET_NEXT,
    txn_id
);

uuid_request!(
    /// Fetch the id of the transaction before the given one.
    TransactionPrevIdGetRequest,
    request_id::TRANSACTION_ID_GET_PREV,
    txn_id
);

uuid_request!(
    /// Fetch the id of the block containing the given transaction.
    TransactionBlockIdGetRequest,
    request_id::TRANSACTION_BLOCK_ID_GET,
    txn_id
);

uuid_request!(
    /// Fetch the first transaction id recorded for an artifact.
    ArtifactFirstTxnIdGetRequest,
    request_id::ARTIFACT_FIRST_TXN_BY_ID_GET,
    artifact_id
);

uuid_request!(
    /// Fetch the last transaction id recorded for an artifact.
    ArtifactLastTxnIdGetRequest,
    request_id::ARTIFACT_LAST_TXN_BY_ID_GET,
    artifact_id
);

uuid_request!(
    /// Assert that the given block id is the latest; the agent answers only
    /// when the assertion is invalidated.
    AssertLatestBlockIdRequest,
    request_id::ASSERT_LATEST_BLOCK_ID,
    latest_block_id
);

/// Look up a block id by chain height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIdByHeightGetRequest {
    pub offset: u32,
    pub height: u64,
}

impl BlockIdByHeightGetRequest {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(16);
        buf.put_u32(request_id::BLOCK_ID_BY_HEIGHT_GET);
        buf.put_u32(self.offset);
        buf.put_u64(self.height);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::BLOCK_ID_BY_HEIGHT_GET)?;
        let offset = r.read_u32()?;
        let height = r.read_u64()?;
        r.finish()?;
        Ok(Self { offset, height })
    }
}

/// Submit a transaction certificate for the given artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSubmitRequest {
    pub offset: u32,
    pub txn_id: Uuid,
    pub artifact_id: Uuid,
    pub cert: Vec<u8>,
}

impl TransactionSubmitRequest {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(48 + self.cert.len());
        buf.put_u32(request_id::TRANSACTION_SUBMIT);
        buf.put_u32(self.offset);
        put_uuid(&mut buf, &self.txn_id);
        put_uuid(&mut buf, &self.artifact_id);
        put_blob(&mut buf, &self.cert);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::TRANSACTION_SUBMIT)?;
        let offset = r.read_u32()?;
        let txn_id = r.read_uuid()?;
        let artifact_id = r.read_uuid()?;
        let cert = r.read_blob()?;
        r.finish()?;
        Ok(Self {
            offset,
            txn_id,
            artifact_id,
            cert,
        })
    }
}

/// Invoke an extended-API verb on the agent.
///
/// The extended-API family uses 64-bit offsets to correlate the larger
/// volume of in-flight calls a sentinel can have open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedApiRequest {
    pub offset: u64,
    pub verb_id: Uuid,
    pub body: Vec<u8>,
}

impl ExtendedApiRequest {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(36 + self.body.len());
        buf.put_u32(request_id::EXTENDED_API_SENDRECV);
        buf.put_u64(self.offset);
        put_uuid(&mut buf, &self.verb_id);
        put_blob(&mut buf, &self.body);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::EXTENDED_API_SENDRECV)?;
        let offset = r.read_u64()?;
        let verb_id = r.read_uuid()?;
        let body = r.read_blob()?;
        r.finish()?;
        Ok(Self {
            offset,
            verb_id,
            body,
        })
    }
}

/// Response a client (acting as extended-API endpoint) sends back for a
/// routed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedApiClientResponseMsg {
    pub offset: u64,
    pub status: u32,
    pub body: Vec<u8>,
}

impl ExtendedApiClientResponseMsg {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(24 + self.body.len());
        buf.put_u32(request_id::EXTENDED_API_CLIENTREQ);
        buf.put_u32(self.status);
        buf.put_u64(self.offset);
        put_blob(&mut buf, &self.body);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        check_request_id(r.read_u32()?, request_id::EXTENDED_API_CLIENTREQ)?;
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
