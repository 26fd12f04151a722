//! Fixed-capacity, compacting byte FIFO.
//!
//! Bytes live in `buf[..len]` in arrival order. Appends that do not fit are
//! cut to the remaining capacity; consuming from the front shifts the
//! remainder back to index 0, so the contents are always one contiguous
//! slice that can be handed to a transport in a single write.
//!
//! `Fifo` has no internal synchronisation. The channel store wraps each one
//! in a try-lock mutex.

/// A byte FIFO holding at most `N` bytes.
pub struct Fifo<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Fifo<N> {
    /// Create an empty FIFO.
    ///
    /// `const` so FIFOs can sit inside `static` channel tables.
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    /// Append as much of `data` as fits and return the number of bytes
    /// appended. The rest of `data` is discarded.
    #[allow(clippy::indexing_slicing)] // Safety: len <= N invariant; take <= N - len
    #[allow(clippy::arithmetic_side_effects)] // Safety: len + take <= N
    pub fn push(&mut self, data: &[u8]) -> usize {
        let take = data.len().min(self.remaining());
        self.buf[self.len..self.len + take].copy_from_slice(&data[..take]);
        self.len += take;
        take
    }

    /// Let `fill` write into the free tail and commit what it reports.
    ///
    /// `fill` receives the unused capacity and returns how many bytes it
    /// wrote; a count larger than the slice is clamped.
    #[allow(clippy::indexing_slicing)] // Safety: len <= N invariant
    #[allow(clippy::arithmetic_side_effects)] // Safety: written clamped to N - len
    pub fn fill_with(&mut self, fill: impl FnOnce(&mut [u8]) -> usize) -> usize {
        let tail = &mut self.buf[self.len..];
        let written = fill(tail).min(N - self.len);
        self.len += written;
        written
    }

    /// Offer the buffered bytes to `sink` and drop the prefix it accepted.
    ///
    /// `sink` returns how many bytes it took from the front of the slice.
    pub fn drain_with(&mut self, sink: impl FnOnce(&[u8]) -> usize) -> usize {
        let taken = sink(self.as_slice()).min(self.len);
        self.consume(taken);
        taken
    }

    /// Remove `count` bytes from the front and move the remainder to
    /// index 0.
    #[allow(clippy::arithmetic_side_effects)] // Safety: count clamped to len
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.len);
        if count == 0 {
            return;
        }
        self.buf.copy_within(count..self.len, 0);
        self.len -= count;
    }

    /// Buffered bytes in arrival order.
    #[allow(clippy::indexing_slicing)] // Safety: len <= N invariant
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free space in bytes.
    #[allow(clippy::arithmetic_side_effects)] // Safety: len <= N invariant
    pub fn remaining(&self) -> usize {
        N - self.len
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop every buffered byte.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for Fifo<N> {
    fn default() -> Self {
        Self::new()
    }
}
