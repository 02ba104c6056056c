//! Session orchestration: per-request send methods and raw receive, tied to
//! the per-direction IV counters.
//!
//! A session is strictly sequential: every operation takes `&mut self`, and
//! the engine contains no locking of its own. One send and one receive may
//! proceed concurrently only by splitting the stream externally; the two
//! directions use independent IV counters. Each counter advances by exactly
//! one per *successful* operation in its direction; a failed send or receive
//! leaves its counter untouched.

use crate::config::SessionConfig;
use crate::core::packet::{read_authed_packet, write_authed_packet};
use crate::crypto::{CipherSuite, SessionKey};
use crate::error::Result;
use crate::protocol::message::request::{
    ArtifactFirstTxnIdGetRequest, ArtifactLastTxnIdGetRequest, AssertLatestBlockIdCancelRequest,
    AssertLatestBlockIdRequest, BlockGetRequest, BlockIdByHeightGetRequest, BlockNextIdGetRequest,
    BlockPrevIdGetRequest, ConnectionCloseRequest, ExtendedApiClientResponseMsg,
    ExtendedApiEnableRequest, ExtendedApiRequest, LatestBlockIdGetRequest, StatusGetRequest,
    TransactionBlockIdGetRequest, TransactionGetRequest, TransactionNextIdGetRequest,
    TransactionPrevIdGetRequest, TransactionSubmitRequest,
};
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::instrument;
use uuid::Uuid;
use zeroize::Zeroizing;

/// An established, authenticated session with the agent.
///
/// Produced by [`crate::protocol::handshake::handshake`]; the session key is
/// zeroed when the session is dropped.
pub struct Session<S> {
    stream: S,
    suite: CipherSuite,
    config: SessionConfig,
    key: SessionKey,
    client_iv: u64,
    server_iv: u64,
}

// Manual impl: the session key must never reach log or panic output.
impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client_iv", &self.client_iv)
            .field("server_iv", &self.server_iv)
            .finish_non_exhaustive()
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Assemble a session from already-established key material and IV
    /// state, e.g. in tests or when resuming a connection whose handshake
    /// ran elsewhere.
    pub fn from_parts(
        stream: S,
        suite: CipherSuite,
        config: SessionConfig,
        key: SessionKey,
        client_iv: u64,
        server_iv: u64,
    ) -> Self {
        Self {
            stream,
            suite,
            config,
            key,
            client_iv,
            server_iv,
        }
    }

    /// Current client-to-server IV counter.
    pub fn client_iv(&self) -> u64 {
        self.client_iv
    }

    /// Current server-to-client IV counter.
    pub fn server_iv(&self) -> u64 {
        self.server_iv
    }

    /// Frame, encrypt, and send one request payload; advances `client_iv`
    /// by exactly one on success regardless of payload size.
    async fn send_payload(&mut self, plaintext: &[u8]) -> Result<()> {
        write_authed_packet(
            &mut self.stream,
            &self.suite,
            &self.key,
            self.client_iv,
            plaintext,
            self.config.max_payload_size,
        )
        .await?;
        self.client_iv = self.client_iv.wrapping_add(1);
        Ok(())
    }

    /// Receive, verify, and decrypt the next packet from the agent,
    /// returning the payload unparsed; advances `server_iv` by exactly one
    /// on success.
    ///
    /// Callers apply [`crate::protocol::message::decode_response_header`]
    /// and then the per-message decoder.
    #[instrument(skip(self))]
    pub async fn recv(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let payload = read_authed_packet(
            &mut self.stream,
            &self.suite,
            &self.key,
            self.server_iv,
            self.config.max_payload_size,
        )
        .await?;
        self.server_iv = self.server_iv.wrapping_add(1);
        Ok(payload)
    }

    pub async fn send_latest_block_id_get(&mut self, offset: u32) -> Result<()> {
        self.send_payload(&LatestBlockIdGetRequest { offset }.encode())
            .await
    }

    pub async fn send_block_get(&mut self, offset: u32, block_id: Uuid) -> Result<()> {
        self.send_payload(&BlockGetRequest { offset, block_id }.encode())
            .await
    }

    pub async fn send_block_next_id_get(&mut self, offset: u32, block_id: Uuid) -> Result<()> {
        self.send_payload(&BlockNextIdGetRequest { offset, block_id }.encode())
            .await
    }

    pub async fn send_block_prev_id_get(&mut self, offset: u32, block_id: Uuid) -> Result<()> {
        self.send_payload(&BlockPrevIdGetRequest { offset, block_id }.encode())
            .await
    }

    pub async fn send_block_id_by_height_get(&mut self, offset: u32, height: u64) -> Result<()> {
        self.send_payload(&BlockIdByHeightGetRequest { offset, height }.encode())
            .await
    }

    pub async fn send_transaction_submit(
        &mut self,
        offset: u32,
        txn_id: Uuid,
        artifact_id: Uuid,
        cert: &[u8],
    ) -> Result<()> {
        let msg = TransactionSubmitRequest {
            offset,
            txn_id,
            artifact_id,
            cert: cert.to_vec(),
        };
        self.send_payload(&msg.encode()).await
    }

    pub async fn send_transaction_get(&mut self, offset: u32, txn_id: Uuid) -> Result<()> {
        self.send_payload(&TransactionGetRequest { offset, txn_id }.encode())
            .await
    }

    pub async fn send_transaction_next_id_get(&mut self, offset: u32, txn_id: Uuid) -> Result<()> {
        self.send_payload(&TransactionNextIdGetRequest { offset, txn_id }.encode())
            .await
    }

    pub async fn send_transaction_prev_id_get(&mut self, offset: u32, txn_id: Uuid) -> Result<()> {
        self.send_payload(&TransactionPrevIdGetRequest { offset, txn_id }.encode())
            .await
    }

    pub async fn send_transaction_block_id_get(&mut self, offset: u32, txn_id: Uuid) -> Result<()> {
        self.send_payload(&TransactionBlockIdGetRequest { offset, txn_id }.encode())
            .await
    }

    pub async fn send_artifact_first_txn_id_get(
        &mut self,
        offset: u32,
        artifact_id: Uuid,
    ) -> Result<()> {
        self.send_payload(&ArtifactFirstTxnIdGetRequest { offset, artifact_id }.encode())
            .await
    }

    pub async fn send_artifact_last_txn_id_get(
        &mut self,
        offset: u32,
        artifact_id: Uuid,
    ) -> Result<()> {
        self.send_payload(&ArtifactLastTxnIdGetRequest { offset, artifact_id }.encode())
            .await
    }

    pub async fn send_status_get(&mut self, offset: u32) -> Result<()> {
        self.send_payload(&StatusGetRequest { offset }.encode())
            .await
    }

    pub async fn send_connection_close(&mut self, offset: u32) -> Result<()> {
        self.send_payload(&ConnectionCloseRequest { offset }.encode())
            .await
    }

    pub async fn send_assert_latest_block_id(
        &mut self,
        offset: u32,
        latest_block_id: Uuid,
    ) -> Result<()> {
        let msg = AssertLatestBlockIdRequest {
            offset,
            latest_block_id,
        };
        self.send_payload(&msg.encode()).await
    }

    pub async fn send_assert_latest_block_id_cancel(&mut self, offset: u32) -> Result<()> {
        self.send_payload(&AssertLatestBlockIdCancelRequest { offset }.encode())
            .await
    }

    pub async fn send_extended_api_enable(&mut self, offset: u32) -> Result<()> {
        self.send_payload(&ExtendedApiEnableRequest { offset }.encode())
            .await
    }

    pub async fn send_extended_api_request(
        &mut self,
        offset: u64,
        verb_id: Uuid,
        body: &[u8],
    ) -> Result<()> {
        let msg = ExtendedApiRequest {
            offset,
            verb_id,
            body: body.to_vec(),
        };
        self.send_payload(&msg.encode()).await
    }

    /// Answer an extended-API call that was routed to this client.
    pub async fn send_extended_api_client_response(
        &mut self,
        offset: u64,
        status: u32,
        body: &[u8],
    ) -> Result<()> {
        let msg = ExtendedApiClientResponseMsg {
            offset,
            status,
            body: body.to_vec(),
        };
        self.send_payload(&msg.encode()).await
    }
}
