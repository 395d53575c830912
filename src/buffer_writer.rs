//! A flat, single-buffer writer for callers who already know they won't
//! need `fork`/`reset` sub-encoding — e.g. encoding a scalar field or a
//! pre-assembled byte string. Trades the chunked writer's amortized growth
//! for a simpler, directly-indexable `Vec<u8>`.

use crate::sink::ByteSink;

pub use crate::sink::ScalarWrite;

/// A non-forking writer backed by a single growable `Vec<u8>`.
#[derive(Debug, Default)]
pub struct BufferWriter {
    buf: Vec<u8>,
}

impl BufferWriter {
    pub fn new() -> Self {
        BufferWriter { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BufferWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Consumes the writer, returning the accumulated bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Current length of the buffer, for callers that want to compute a
    /// length prefix without consuming the writer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl ByteSink for BufferWriter {
    fn reserve(&mut self, extra: usize) {
        self.buf.reserve(extra);
    }

    fn put_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire_type::WireType;

    #[test]
    fn chains_and_finishes() {
        let mut w = BufferWriter::new();
        w.tag(1, WireType::Varint).uint32(150);
        assert_eq!(w.finish(), vec![0x08, 0x96, 0x01]);
    }

    #[test]
    fn string_field() {
        let mut w = BufferWriter::new();
        w.tag(2, WireType::LengthDelimited).string("hi");
        assert_eq!(w.finish(), vec![0x12, 0x02, b'h', b'i']);
    }

    #[test]
    fn len_tracks_without_consuming() {
        let mut w = BufferWriter::new();
        w.bool(true);
        assert_eq!(w.len(), 1);
        assert!(!w.is_empty());
    }
}
