//! # Byte Buffer
//!
//! Holds instrument output that has been received but not yet classified as
//! either an escape token or raster data.
//!
//! ## Layout
//!
//! ```text
//!  consumed prefix      unconsumed bytes
//! ├────────────────┼──────────────────────────┤
//! 0              head                      data.len()
//! ```
//!
//! Consumption only advances `head`. The consumed prefix is dropped lazily
//! once it makes up at least half of the allocation, so a long capture
//! doesn't shift the whole buffer on every token.

/// Consumed prefixes smaller than this are never compacted.
const COMPACT_THRESHOLD: usize = 4096;

/// Append-at-tail, consume-from-head byte arena.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    head: usize,
}

impl ByteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the tail with `chunk`.
    pub fn append(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.compact();
        self.data.extend_from_slice(chunk);
    }

    /// Remove and return the first `n` unconsumed bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    pub fn consume(&mut self, n: usize) -> Vec<u8> {
        assert!(
            n <= self.len(),
            "consume({}) past end of buffer (len {})",
            n,
            self.len()
        );
        let out = self.data[self.head..self.head + n].to_vec();
        self.head += n;
        out
    }

    /// Drop the first `n` unconsumed bytes without copying them out.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    pub fn discard(&mut self, n: usize) {
        assert!(
            n <= self.len(),
            "discard({}) past end of buffer (len {})",
            n,
            self.len()
        );
        self.head += n;
    }

    /// Number of unconsumed bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View of the unconsumed bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.head..]
    }

    /// Drop everything, consumed or not.
    pub fn clear(&mut self) {
        self.data.clear();
        self.head = 0;
    }

    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        if self.head == self.data.len() {
            self.data.clear();
            self.head = 0;
        } else if self.head >= COMPACT_THRESHOLD && self.head * 2 >= self.data.len() {
            log::debug!(
                "compacting buffer: dropping {} consumed bytes, keeping {}",
                self.head,
                self.len()
            );
            self.data.drain(..self.head);
            self.head = 0;
        }
    }
}
