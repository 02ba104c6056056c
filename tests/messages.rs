#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Round-trip and minimum-size tests for every message codec.

use agentwire::error::ProtocolError;
use agentwire::protocol::message::{
    decode_response_header, encode_error_response, encode_generic_response, request::*,
    request_id, response::*, ResponseHeader, STATUS_OK,
};
use uuid::Uuid;

fn uuid(n: u8) -> Uuid {
    Uuid::from_bytes([n; 16])
}

/// Assert a codec round-trips and that every strict prefix of its encoding
/// is rejected without panicking.
macro_rules! assert_roundtrip {
    ($msg:expr, $ty:ty) => {{
        let msg = $msg;
        let bytes = msg.encode();
        let decoded = <$ty>::decode(&bytes).expect("decode");
        assert_eq!(msg, decoded);

        for len in 0..bytes.len() {
            assert!(
                <$ty>::decode(&bytes[..len]).is_err(),
                "truncated to {len} bytes should fail"
            );
        }
    }};
}

#[test]
fn handshake_request_roundtrip() {
    assert_roundtrip!(
        HandshakeRequest {
            offset: 0,
            protocol_version: 1,
            crypto_suite: 1,
            entity_id: uuid(1),
            key_nonce: [2; 32],
            challenge_nonce: [3; 32],
        },
        HandshakeRequest
    );
}

#[test]
fn handshake_ack_roundtrip() {
    assert_roundtrip!(HandshakeAck { digest: [7; 32] }, HandshakeAck);
}

#[test]
fn handshake_response_roundtrip() {
    let resp = HandshakeResponse {
        offset: 0,
        status: STATUS_OK,
        protocol_version: 1,
        crypto_suite: 1,
        server_id: uuid(9),
        server_public_key: [4; 32],
        server_key_nonce: [5; 32],
        server_challenge_nonce: [6; 32],
        cr_hmac: [8; 64],
    };
    assert_eq!(resp.encode().len(), HANDSHAKE_RESPONSE_SIZE);
    assert_roundtrip!(resp, HandshakeResponse);
}

#[test]
fn offset_only_requests_roundtrip() {
    assert_roundtrip!(LatestBlockIdGetRequest { offset: 17 }, LatestBlockIdGetRequest);
    assert_roundtrip!(StatusGetRequest { offset: 18 }, StatusGetRequest);
    assert_roundtrip!(ConnectionCloseRequest { offset: 19 }, ConnectionCloseRequest);
    assert_roundtrip!(
        AssertLatestBlockIdCancelRequest { offset: 20 },
        AssertLatestBlockIdCancelRequest
    );
    assert_roundtrip!(
        ExtendedApiEnableRequest { offset: 21 },
        ExtendedApiEnableRequest
    );
}

#[test]
fn uuid_requests_roundtrip() {
    assert_roundtrip!(
        BlockGetRequest {
            offset: 1,
            block_id: uuid(11)
        },
        BlockGetRequest
    );
    assert_roundtrip!(
        BlockNextIdGetRequest {
            offset: 2,
            block_id: uuid(12)
        },
        BlockNextIdGetRequest
    );
    assert_roundtrip!(
        BlockPrevIdGetRequest {
            offset: 3,
            block_id: uuid(13)
        },
        BlockPrevIdGetRequest
    );
    assert_roundtrip!(
        TransactionGetRequest {
            offset: 4,
            txn_id: uuid(14)
        },
        TransactionGetRequest
    );
    assert_roundtrip!(
        TransactionNextIdGetRequest {
            offset: 5,
            txn_id: uuid(15)
        },
        TransactionNextIdGetRequest
    );
    assert_roundtrip!(
        TransactionPrevIdGetRequest {
            offset: 6,
            txn_id: uuid(16)
        },
        TransactionPrevIdGetRequest
    );
    assert_roundtrip!(
        TransactionBlockIdGetRequest {
            offset: 7,
            txn_id: uuid(17)
        },
        TransactionBlockIdGetRequest
    );
    assert_roundtrip!(
        ArtifactFirstTxnIdGetRequest {
            offset: 8,
            artifact_id: uuid(18)
        },
        ArtifactFirstTxnIdGetRequest
    );
    assert_roundtrip!(
        ArtifactLastTxnIdGetRequest {
            offset: 9,
            artifact_id: uuid(19)
        },
        ArtifactLastTxnIdGetRequest
    );
    assert_roundtrip!(
        AssertLatestBlockIdRequest {
            offset: 10,
            latest_block_id: uuid(20)
        },
        AssertLatestBlockIdRequest
    );
}

#[test]
fn block_id_by_height_roundtrip() {
    assert_roundtrip!(
        BlockIdByHeightGetRequest {
            offset: 3,
            height: u64::MAX - 1
        },
        BlockIdByHeightGetRequest
    );
}

#[test]
fn transaction_submit_roundtrip() {
    for cert in [vec![], vec![0xEE; 600]] {
        assert_roundtrip!(
            TransactionSubmitRequest {
                offset: 5,
                txn_id: uuid(21),
                artifact_id: uuid(22),
                cert,
            },
            TransactionSubmitRequest
        );
    }
}

#[test]
fn extended_api_requests_roundtrip() {
    for body in [vec![], b"verb args".to_vec()] {
        assert_roundtrip!(
            ExtendedApiRequest {
                offset: u64::from(u32::MAX) + 7,
                verb_id: uuid(23),
                body,
            },
            ExtendedApiRequest
        );
    }
    assert_roundtrip!(
        ExtendedApiClientResponseMsg {
            offset: 99,
            status: 2,
            body: b"result".to_vec(),
        },
        ExtendedApiClientResponseMsg
    );
}

#[test]
fn uuid_responses_roundtrip() {
    assert_roundtrip!(
        LatestBlockIdGetResponse {
            offset: 1,
            status: STATUS_OK,
            block_id: uuid(31)
        },
        LatestBlockIdGetResponse
    );
    assert_roundtrip!(
        BlockNextIdGetResponse {
            offset: 2,
            status: STATUS_OK,
            block_id: uuid(32)
        },
        BlockNextIdGetResponse
    );
    assert_roundtrip!(
        BlockPrevIdGetResponse {
            offset: 3,
            status: STATUS_OK,
            block_id: uuid(33)
        },
        BlockPrevIdGetResponse
    );
    assert_roundtrip!(
        BlockIdByHeightGetResponse {
            offset: 4,
            status: STATUS_OK,
            block_id: uuid(34)
        },
        BlockIdByHeightGetResponse
    );
    assert_roundtrip!(
        TransactionNextIdGetResponse {
            offset: 5,
            status: STATUS_OK,
            txn_id: uuid(35)
        },
        TransactionNextIdGetResponse
    );
    assert_roundtrip!(
        TransactionPrevIdGetResponse {
            offset: 6,
            status: STATUS_OK,
            txn_id: uuid(36)
        },
        TransactionPrevIdGetResponse
    );
    assert_roundtrip!(
        TransactionBlockIdGetResponse {
            offset: 7,
            status: STATUS_OK,
            block_id: uuid(37)
        },
        TransactionBlockIdGetResponse
    );
    assert_roundtrip!(
        ArtifactFirstTxnIdGetResponse {
            offset: 8,
            status: STATUS_OK,
            txn_id: uuid(38)
        },
        ArtifactFirstTxnIdGetResponse
    );
    assert_roundtrip!(
        ArtifactLastTxnIdGetResponse {
            offset: 9,
            status: STATUS_OK,
            txn_id: uuid(39)
        },
        ArtifactLastTxnIdGetResponse
    );
}

#[test]
fn header_only_responses_roundtrip() {
    assert_roundtrip!(
        TransactionSubmitResponse {
            offset: 1,
            status: 0xFF
        },
        TransactionSubmitResponse
    );
    assert_roundtrip!(
        StatusGetResponse {
            offset: 2,
            status: STATUS_OK
        },
        StatusGetResponse
    );
    assert_roundtrip!(
        ConnectionCloseResponse {
            offset: 3,
            status: STATUS_OK
        },
        ConnectionCloseResponse
    );
    assert_roundtrip!(
        AssertLatestBlockIdResponse {
            offset: 4,
            status: STATUS_OK
        },
        AssertLatestBlockIdResponse
    );
    assert_roundtrip!(
        AssertLatestBlockIdCancelResponse {
            offset: 5,
            status: STATUS_OK
        },
        AssertLatestBlockIdCancelResponse
    );
    assert_roundtrip!(
        ExtendedApiEnableResponse {
            offset: 6,
            status: STATUS_OK
        },
        ExtendedApiEnableResponse
    );
}

#[test]
fn record_responses_roundtrip() {
    for cert in [vec![], vec![0xAB; 1200]] {
        assert_roundtrip!(
            BlockGetResponse {
                offset: 1,
                status: STATUS_OK,
                block_id: uuid(41),
                prev_block_id: uuid(42),
                next_block_id: uuid(43),
                first_txn_id: uuid(44),
                block_height: 7_000_000,
                cert: cert.clone(),
            },
            BlockGetResponse
        );
        assert_roundtrip!(
            TransactionGetResponse {
                offset: 2,
                status: STATUS_OK,
                txn_id: uuid(45),
                prev_txn_id: uuid(46),
                next_txn_id: uuid(47),
                artifact_id: uuid(48),
                block_id: uuid(49),
                cert,
            },
            TransactionGetResponse
        );
    }
}

#[test]
fn extended_api_responses_roundtrip() {
    assert_roundtrip!(
        ExtendedApiResponse {
            offset: 1 << 40,
            status: STATUS_OK,
            body: b"answer".to_vec(),
        },
        ExtendedApiResponse
    );
    assert_roundtrip!(
        ExtendedApiClientRequestMsg {
            offset: 1 << 41,
            client_id: uuid(50),
            verb_id: uuid(51),
            client_enc_pubkey: vec![1; 32],
            client_sign_pubkey: vec![2; 32],
            body: b"routed call".to_vec(),
        },
        ExtendedApiClientRequestMsg
    );
}

#[test]
fn wrong_request_id_rejected() {
    let bytes = LatestBlockIdGetRequest { offset: 1 }.encode();
    assert!(matches!(
        StatusGetRequest::decode(&bytes),
        Err(ProtocolError::UnexpectedValue)
    ));
}

#[test]
fn trailing_garbage_rejected() {
    let mut bytes = StatusGetRequest { offset: 1 }.encode().to_vec();
    bytes.push(0);
    assert!(matches!(
        StatusGetRequest::decode(&bytes),
        Err(ProtocolError::UnexpectedPayloadSize { .. })
    ));
}

#[test]
fn blob_declared_length_cross_checked() {
    // Valid submit request whose blob length prefix claims more bytes than
    // the payload holds.
    let msg = TransactionSubmitRequest {
        offset: 1,
        txn_id: uuid(1),
        artifact_id: uuid(2),
        cert: vec![0; 16],
    };
    let mut bytes = msg.encode().to_vec();
    // The u64 blob length sits right after the two UUIDs.
    let len_pos = 4 + 4 + 16 + 16;
    bytes[len_pos..len_pos + 8].copy_from_slice(&1000u64.to_be_bytes());
    assert!(matches!(
        TransactionSubmitRequest::decode(&bytes),
        Err(ProtocolError::UnexpectedPayloadSize { .. })
    ));
}

#[test]
fn generic_and_error_encoders_share_header_layout() {
    let generic = encode_generic_response(request_id::STATUS_GET, 7, 3, &[]);
    let error = encode_error_response(request_id::STATUS_GET, 7, 3);
    assert_eq!(generic, error);

    let header = decode_response_header(&error).unwrap();
    assert_eq!(
        header,
        ResponseHeader {
            request_id: request_id::STATUS_GET,
            status: 3,
            offset: 7
        }
    );
}
