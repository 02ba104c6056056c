//! # Message Serialization Layer
//!
//! Typed request/response structures and their bit-exact wire codecs.
//!
//! Every message follows one layout, big-endian throughout: `request_id:u32`,
//! then `status:u32` (responses only), then `offset` (`u32`, or `u64` for
//! the extended-API family), then any fixed 16-byte UUID fields in declared
//! order, then fixed-width key/nonce fields, then any u64-length-prefixed
//! trailing blob. Decoders validate the minimum fixed size up front and
//! cross-check declared blob lengths against the bytes actually present.

use crate::core::wire::Reader;
use crate::error::{ProtocolError, Result};
use bytes::{BufMut, Bytes, BytesMut};

pub mod request;
pub mod response;

/// Embedded status value meaning the remote request succeeded.
///
/// The embedded status is an independent signal from the function-level
/// `Result`: the `Result` says the protocol exchange completed, the status
/// says whether the remote request itself succeeded.
pub const STATUS_OK: u32 = 0;

/// Request-id tags identifying each protocol verb.
pub mod request_id {
    pub const HANDSHAKE_INITIATE: u32 = 0x0000_0000;
    pub const HANDSHAKE_ACKNOWLEDGE: u32 = 0x0000_0001;
    pub const LATEST_BLOCK_ID_GET: u32 = 0x0000_0002;
    pub const TRANSACTION_SUBMIT: u32 = 0x0000_0003;
    pub const BLOCK_BY_ID_GET: u32 = 0x0000_0004;
    pub const BLOCK_ID_GET_NEXT: u32 = 0x0000_0005;
    pub const BLOCK_ID_GET_PREV: u32 = 0x0000_0006;
    pub const BLOCK_ID_BY_HEIGHT_GET: u32 = 0x0000_0007;
    pub const TRANSACTION_BY_ID_GET: u32 = 0x0000_0008;
    pub const TRANSACTION_ID_GET_NEXT: u32 = 0x0000_0009;
    pub const TRANSACTION_ID_GET_PREV: u32 = 0x0000_000A;
    pub const TRANSACTION_BLOCK_ID_GET: u32 = 0x0000_000B;
    pub const ARTIFACT_FIRST_TXN_BY_ID_GET: u32 = 0x0000_000C;
    pub const ARTIFACT_LAST_TXN_BY_ID_GET: u32 = 0x0000_000D;
    pub const STATUS_GET: u32 = 0x0000_000E;
    pub const ASSERT_LATEST_BLOCK_ID: u32 = 0x0000_000F;
    pub const ASSERT_LATEST_BLOCK_ID_CANCEL: u32 = 0x0000_0010;
    pub const EXTENDED_API_ENABLE: u32 = 0x0000_0011;
    pub const EXTENDED_API_SENDRECV: u32 = 0x0000_0012;
    pub const EXTENDED_API_CLIENTREQ: u32 = 0x0000_0013;
    pub const CONNECTION_CLOSE: u32 = 0x0000_0014;
}

/// Decoded common header of a standard response.
///
/// The extended-API family carries a 64-bit offset and is parsed by its own
/// decoders; for those messages only `request_id` and `status` here are
/// meaningful for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub request_id: u32,
    pub status: u32,
    pub offset: u32,
}

/// Extract `request_id` / `status` / `offset` from a raw response payload
/// without consuming it.
pub fn decode_response_header(payload: &[u8]) -> Result<ResponseHeader> {
    let mut r = Reader::new(payload);
    Ok(ResponseHeader {
        request_id: r.read_u32()?,
        status: r.read_u32()?,
        offset: r.read_u32()?,
    })
}

/// Encode an arbitrary `(request_id, offset, status, payload)` response.
///
/// All per-message response encoders funnel through this to keep the common
/// header layout in one place.
pub fn encode_generic_response(
    request_id: u32,
    offset: u32,
    status: u32,
    payload: &[u8],
) -> Bytes {
    let mut buf = BytesMut::with_capacity(12 + payload.len());
    buf.put_u32(request_id);
    buf.put_u32(status);
    buf.put_u32(offset);
    buf.put_slice(payload);
    buf.freeze()
}

/// Encode an all-header error response with no payload.
pub fn encode_error_response(request_id: u32, offset: u32, status: u32) -> Bytes {
    encode_generic_response(request_id, offset, status, &[])
}

pub(crate) fn check_request_id(found: u32, expected: u32) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedValue)
    }
}

/// Request carrying only the common `request_id`/`offset` header.
macro_rules! offset_only_request {
    ($(#[$meta:meta])* $name:ident, $id:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub offset: u32,
        }

        impl $name {
            pub fn encode(&self) -> Bytes {
                let mut buf = BytesMut::with_capacity(8);
                buf.put_u32($id);
                buf.put_u32(self.offset);
                buf.freeze()
            }

            pub fn decode(payload: &[u8]) -> Result<Self> {
                let mut r = Reader::new(payload);
                check_request_id(r.read_u32()?, $id)?;
                let offset = r.read_u32()?;
                r.finish()?;
                Ok(Self { offset })
            }
        }
    };
}

/// Request carrying the common header plus one UUID field.
macro_rules! uuid_request {
    ($(#[$meta:meta])* $name:ident, $id:path, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub offset: u32,
            pub $field: Uuid,
        }

        impl $name {
            pub fn encode(&self) -> Bytes {
                let mut buf = BytesMut::with_capacity(24);
                buf.put_u32($id);
                buf.put_u32(self.offset);
                put_uuid(&mut buf, &self.$field);
                buf.freeze()
            }

            pub fn decode(payload: &[u8]) -> Result<Self> {
                let mut r = Reader::new(payload);
                check_request_id(r.read_u32()?, $id)?;
                let offset = r.read_u32()?;
                let $field = r.read_uuid()?;
                r.finish()?;
                Ok(Self { offset, $field })
            }
        }
    };
}

/// Response carrying only the common header.
macro_rules! header_only_response {
    ($(#[$meta:meta])* $name:ident, $id:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub offset: u32,
            pub status: u32,
        }

        impl $name {
            pub fn encode(&self) -> Bytes {
                encode_generic_response($id, self.offset, self.status, &[])
            }

            pub fn decode(payload: &[u8]) -> Result<Self> {
                let mut r = Reader::new(payload);
                check_request_id(r.read_u32()?, $id)?;
                let status = r.read_u32()?;
                let offset = r.read_u32()?;
                r.finish()?;
                Ok(Self { offset, status })
            }
        }
    };
}

/// Response carrying the common header plus one UUID field.
macro_rules! uuid_response {
    ($(#[$meta:meta])* $name:ident, $id:path, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub offset: u32,
            pub status: u32,
            pub $field: Uuid,
        }

        impl $name {
            pub fn encode(&self) -> Bytes {
                encode_generic_response($id, self.offset, self.status, self.$field.as_bytes())
            }

            pub fn decode(payload: &[u8]) -> Result<Self> {
                let mut r = Reader::new(payload);
                check_request_id(r.read_u32()?, $id)?;
                let status = r.read_u32()?;
                let offset = r.read_u32()?;
                let $field = r.read_uuid()?;
                r.finish()?;
                Ok(Self {
                    offset,
                    status,
                    $field,
                })
            }
        }
    };
}

pub(crate) use {header_only_response, offset_only_request, uuid_request, uuid_response};
