//! Shared scalar-encoding primitives used by both the chunked `Writer` and
//! the single-buffer `BufferWriter`. Each backend only needs to supply raw
//! byte placement (`ByteSink`); the protobuf-specific encodings
//! (varint, zig-zag, fixed-width, length-delimited) are implemented once
//! here as default trait methods so the two backends stay in lockstep.

use crate::varint::{encode_varint32, encode_varint64, zigzag_encode32, zigzag_encode64};
use crate::wire_type::{encode_tag, WireType};

/// Raw byte placement for a writer backend.
pub trait ByteSink {
    /// Reserve room for at least `extra` more bytes without necessarily
    /// sealing/allocating per-byte.
    fn reserve(&mut self, extra: usize);
    fn put_byte(&mut self, byte: u8);
    fn put_slice(&mut self, bytes: &[u8]);
}

/// Protobuf scalar encodings, implemented once for every `ByteSink`.
///
/// Every method returns `&mut Self` so calls chain: `w.tag(1, wt).uint32(5)`.
pub trait ScalarWrite: ByteSink + Sized {
    /// Single-byte tag fast path for `id <= 15`; larger ids go through the
    /// varint path via `uint32((id << 3) | wire_type)`.
    #[inline]
    fn tag(&mut self, id: u32, wire_type: WireType) -> &mut Self {
        if id <= 15 {
            self.put_byte((((id << 3) as u8) | (wire_type as u8)) & 0xFF);
            self
        } else {
            self.uint32(encode_tag(id, wire_type))
        }
    }

    #[inline]
    fn uint32(&mut self, value: u32) -> &mut Self {
        self.reserve(5);
        let mut scratch = Vec::with_capacity(5);
        encode_varint32(value, &mut scratch);
        self.put_slice(&scratch);
        self
    }

    /// Negative values are sign-extended to 64 bits and varint-encoded as
    /// 10 bytes, matching the canonical wire format for negative `int32`
    /// (a deliberate deviation from a naive `uint32`-only rendering — see
    /// DESIGN.md).
    #[inline]
    fn int32(&mut self, value: i32) -> &mut Self {
        if value < 0 {
            self.uint64(value as i64 as u64)
        } else {
            self.uint32(value as u32)
        }
    }

    #[inline]
    fn sint32(&mut self, value: i32) -> &mut Self {
        self.uint32(zigzag_encode32(value))
    }

    #[inline]
    fn uint64(&mut self, value: u64) -> &mut Self {
        self.reserve(10);
        let mut scratch = Vec::with_capacity(10);
        encode_varint64(value, &mut scratch);
        self.put_slice(&scratch);
        self
    }

    #[inline]
    fn int64(&mut self, value: i64) -> &mut Self {
        self.uint64(value as u64)
    }

    #[inline]
    fn sint64(&mut self, value: i64) -> &mut Self {
        self.uint64(zigzag_encode64(value))
    }

    #[inline]
    fn fixed32(&mut self, value: u32) -> &mut Self {
        self.put_slice(&value.to_le_bytes());
        self
    }

    /// Raw little-endian signed 32 bits — wire-compatible with protobuf's
    /// `sfixed32`, which is not zig-zagged (only the varint-coded `sint32`
    /// is). See DESIGN.md for the reasoning.
    #[inline]
    fn sfixed32(&mut self, value: i32) -> &mut Self {
        self.put_slice(&value.to_le_bytes());
        self
    }

    #[inline]
    fn fixed64(&mut self, value: u64) -> &mut Self {
        self.put_slice(&value.to_le_bytes());
        self
    }

    #[inline]
    fn sfixed64(&mut self, value: i64) -> &mut Self {
        self.put_slice(&value.to_le_bytes());
        self
    }

    #[inline]
    fn float(&mut self, value: f32) -> &mut Self {
        self.put_slice(&value.to_bits().to_le_bytes());
        self
    }

    #[inline]
    fn double(&mut self, value: f64) -> &mut Self {
        self.put_slice(&value.to_bits().to_le_bytes());
        self
    }

    #[inline]
    fn bool(&mut self, value: bool) -> &mut Self {
        self.put_byte(if value { 1 } else { 0 });
        self
    }

    /// Empty input emits a single zero length byte; non-empty input emits
    /// `uint32(len)` followed by the raw bytes.
    #[inline]
    fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.uint32(value.len() as u32);
        self.put_slice(value);
        self
    }

    /// The UTF-8 byte length (not the char count) is what gets prefixed;
    /// Rust strings are always valid UTF-8 so no re-validation is needed.
    #[inline]
    fn string(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes())
    }
}

impl<T: ByteSink> ScalarWrite for T {}
