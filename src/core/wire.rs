//! Primitive byte codec: big-endian integers, UUIDs, and length-prefixed
//! blobs, shared by every message encoder/decoder and the packet codec.
//!
//! Encoding goes through `bytes::BufMut`; decoding goes through the
//! bounds-checked [`Reader`] cursor, which rejects underflow with
//! `UnexpectedPayloadSize` instead of panicking.

use crate::error::{ProtocolError, Result};
use bytes::BufMut;
use uuid::Uuid;

/// Append a 16-byte UUID in RFC byte order.
pub fn put_uuid(buf: &mut impl BufMut, id: &Uuid) {
    buf.put_slice(id.as_bytes());
}

/// Append a u64-length-prefixed blob.
pub fn put_blob(buf: &mut impl BufMut, blob: &[u8]) {
    buf.put_u64(blob.len() as u64);
    buf.put_slice(blob);
}

/// Bounds-checked forward cursor over a decoded payload.
pub struct Reader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(ProtocolError::UnexpectedPayloadSize {
                expected: self.consumed + n,
                actual: self.consumed + self.buf.len(),
            });
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        self.consumed += n;
        Ok(head)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    pub fn read_uuid(&mut self) -> Result<Uuid> {
        let bytes = self.take(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(Uuid::from_bytes(raw))
    }

    /// Read a fixed-width field, e.g. a nonce or public key.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut raw = [0u8; N];
        raw.copy_from_slice(bytes);
        Ok(raw)
    }

    /// Read a u64-length-prefixed blob into a freshly owned buffer.
    ///
    /// The declared length is cross-checked against the bytes actually
    /// remaining; a declared length past the end of the payload is rejected.
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        let declared = self.read_u64()?;
        let len = usize::try_from(declared).map_err(|_| ProtocolError::UnexpectedPayloadSize {
            expected: usize::MAX,
            actual: self.consumed + self.buf.len(),
        })?;
        Ok(self.take(len)?.to_vec())
    }

    /// Assert the payload has been fully consumed.
    pub fn finish(self) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedPayloadSize {
                expected: self.consumed,
                actual: self.consumed + self.buf.len(),
            })
        }
    }
}
