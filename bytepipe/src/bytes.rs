//! Convenience constructors for common pipe sizes.

use crate::error::Result;
use crate::pipe::{PipeReader, PipeWriter, pipe};
use crate::ring_buffer::RingBuffer;

// ============================================================================
// Pipe convenience functions
// ============================================================================

/// Creates a pipe with a 256B buffer.
pub fn pipe_256b() -> (PipeReader, PipeWriter) {
    sized_pipe(256)
}

/// Creates a pipe with a 1KB buffer.
pub fn pipe_1kb() -> (PipeReader, PipeWriter) {
    sized_pipe(1024)
}

/// Creates a pipe with a 4KB buffer.
pub fn pipe_4kb() -> (PipeReader, PipeWriter) {
    sized_pipe(4096)
}

/// Creates a pipe with a 16KB buffer.
pub fn pipe_16kb() -> (PipeReader, PipeWriter) {
    sized_pipe(16384)
}

/// Creates a pipe with a 64KB buffer.
pub fn pipe_64kb() -> (PipeReader, PipeWriter) {
    sized_pipe(65536)
}

fn sized_pipe(capacity: usize) -> (PipeReader, PipeWriter) {
    match pipe(capacity) {
        Ok(ends) => ends,
        Err(e) => unreachable!("non-zero capacity {} rejected: {}", capacity, e),
    }
}

// ============================================================================
// RingBuffer convenience functions
// ============================================================================

/// Creates a ring buffer for bytes with the specified capacity.
pub fn ring_bytes(size: usize) -> Result<RingBuffer> {
    RingBuffer::new(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_convenience_functions() {
        let sizes = [
            (pipe_256b(), 256),
            (pipe_1kb(), 1024),
            (pipe_4kb(), 4096),
            (pipe_16kb(), 16384),
            (pipe_64kb(), 65536),
        ];

        for ((r, w), capacity) in sizes {
            assert_eq!(w.capacity(), capacity);
            w.write(&[1, 2, 3]).unwrap();
            assert_eq!(r.buffered(), 3);
        }
    }

    #[test]
    fn test_ring_bytes() {
        let ring = ring_bytes(100).unwrap();
        assert_eq!(ring.capacity(), 100);
        assert!(ring_bytes(0).is_err());
    }
}
