//! Fixed-capacity byte ring.

use std::fmt;

use crate::error::{PipeError, Result};

/// A fixed-capacity circular byte store.
///
/// `RingBuffer` keeps two cursors into a storage array one byte longer than
/// its capacity. The extra slot is never filled, so `read_at == write_at`
/// always means empty and a full buffer is always distinguishable from an
/// empty one without a separate flag.
///
/// The ring does no locking and knows nothing about closing; the pipe
/// layers both on top.
///
/// # Example
///
/// ```
/// use bytepipe::{PipeError, RingBuffer};
///
/// let mut ring = RingBuffer::new(4).unwrap();
/// assert_eq!(ring.write(b"abc"), Ok(3));
/// assert_eq!(
///     ring.write(b"def"),
///     Err(PipeError::ShortWrite { written: 1, requested: 3 })
/// );
///
/// let mut out = [0u8; 8];
/// let n = ring.read(&mut out);
/// assert_eq!(&out[..n], b"abcd");
/// ```
pub struct RingBuffer {
    storage: Vec<u8>,
    read_at: usize,
    write_at: usize,
}

impl RingBuffer {
    /// Creates a ring that holds up to `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipeError::InvalidCapacity(capacity));
        }
        Ok(RingBuffer {
            storage: vec![0; capacity + 1],
            read_at: 0,
            write_at: 0,
        })
    }

    /// Returns the maximum number of bytes the ring can hold.
    pub fn capacity(&self) -> usize {
        self.storage.len() - 1
    }

    /// Returns the number of bytes waiting to be read.
    pub fn buffered(&self) -> usize {
        if self.read_at <= self.write_at {
            self.write_at - self.read_at
        } else {
            self.storage.len() - self.read_at + self.write_at
        }
    }

    /// Returns the number of bytes that can be written without a short write.
    pub fn available(&self) -> usize {
        self.capacity() - self.buffered()
    }

    /// Returns true if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.read_at == self.write_at
    }

    /// Returns true if no more bytes fit.
    pub fn is_full(&self) -> bool {
        self.buffered() == self.capacity()
    }

    /// Moves both cursors back to the start.
    ///
    /// Storage is not cleared; bytes from before the reset stay in memory
    /// but are unreachable through [`read`](Self::read).
    pub fn reset(&mut self) {
        self.read_at = 0;
        self.write_at = 0;
    }

    /// Copies up to `dest.len()` buffered bytes into `dest`.
    ///
    /// Returns the number of bytes copied, which is 0 when the ring is
    /// empty or `dest` is empty.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let mut n = 0;
        // Data wraps: drain the tail of storage first.
        if self.write_at < self.read_at {
            let span = self.storage.len() - self.read_at;
            n = self.read_span(dest, span);
        }
        if self.read_at < self.write_at {
            let span = self.write_at - self.read_at;
            n += self.read_span(&mut dest[n..], span);
        }
        n
    }

    /// Copies as much of `src` as fits into the ring.
    ///
    /// Returns `Ok(src.len())` when everything fit. Otherwise the bytes that
    /// fit are stored and [`PipeError::ShortWrite`] reports how many.
    pub fn write(&mut self, src: &[u8]) -> Result<usize> {
        let mut n = 0;
        if self.read_at <= self.write_at {
            // Never let write_at catch up with read_at from behind.
            let mut end = self.storage.len();
            if self.read_at == 0 {
                end -= 1;
            }
            let span = end - self.write_at;
            n = self.write_span(src, span);
        }
        if self.write_at + 1 < self.read_at {
            let span = self.read_at - 1 - self.write_at;
            n += self.write_span(&src[n..], span);
        }

        if n < src.len() {
            return Err(PipeError::ShortWrite {
                written: n,
                requested: src.len(),
            });
        }
        Ok(n)
    }

    fn read_span(&mut self, dest: &mut [u8], span: usize) -> usize {
        let c = span.min(dest.len());
        dest[..c].copy_from_slice(&self.storage[self.read_at..self.read_at + c]);
        self.read_at += c;
        if self.read_at == self.storage.len() {
            self.read_at = 0;
        }
        c
    }

    fn write_span(&mut self, src: &[u8], span: usize) -> usize {
        let c = span.min(src.len());
        self.storage[self.write_at..self.write_at + c].copy_from_slice(&src[..c]);
        self.write_at += c;
        if self.write_at == self.storage.len() {
            self.write_at = 0;
        }
        c
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("buffered", &self.buffered())
            .field("read_at", &self.read_at)
            .field("write_at", &self.write_at)
            .finish()
    }
}
