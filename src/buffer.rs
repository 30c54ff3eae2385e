//! Input buffer: accumulates received bytes and hands out CRLF-delimited
//! lines and length-prefixed regions without ever copying more than the
//! consumed prefix.

use bytes::{Buf, Bytes, BytesMut};

/// The initial capacity reserved for a freshly constructed buffer.
///
/// Chosen to absorb one or two typical TCP reads before the first
/// reallocation.
const INIT_CAPACITY: usize = 8 * 1024;

/// A growable byte sequence supporting append, CRLF search, and prefix
/// consumption. Backed by `bytes::BytesMut`, whose `split_to` is O(1) —
/// it just slices the shared allocation rather than copying the tail.
#[derive(Debug, Default)]
pub(crate) struct InputBuffer {
    buf: BytesMut,
}

impl InputBuffer {
    pub(crate) fn new() -> InputBuffer {
        InputBuffer {
            buf: BytesMut::with_capacity(INIT_CAPACITY),
        }
    }

    pub(crate) fn append(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn first(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    /// Index of the first byte of the next `\r\n`, if fully present.
    pub(crate) fn find_crlf(&self) -> Option<usize> {
        find_crlf(&self.buf)
    }

    /// Consumes and returns the first `n` bytes as an owned, cheaply
    /// cloneable `Bytes`. Panics if `n > self.len()`.
    pub(crate) fn consume(&mut self, n: usize) -> Bytes {
        self.buf.split_to(n).freeze()
    }

    /// Drops the first `n` bytes without retaining them.
    pub(crate) fn advance(&mut self, n: usize) {
        Buf::advance(&mut self.buf, n);
    }
}

/// Finds the first occurrence of `\r\n` in `haystack`, if any.
pub(crate) fn find_crlf(haystack: &[u8]) -> Option<usize> {
    if haystack.len() < 2 {
        return None;
    }
    // memchr-style scan for '\r' followed by a '\n'; the protocol's control
    // lines are short, so a linear scan with no external crate is fine here.
    let mut start = 0;
    while let Some(rel) = haystack[start..].iter().position(|&b| b == b'\r') {
        let idx = start + rel;
        if idx + 1 >= haystack.len() {
            return None;
        }
        if haystack[idx + 1] == b'\n' {
            return Some(idx);
        }
        start = idx + 1;
    }
    None
}
