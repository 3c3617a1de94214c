//! Bounded in-memory byte pipe.
//!
//! This crate provides a capacity-limited pipe for streaming bytes between
//! threads, similar to a unix pipe that lives entirely in memory:
//!
//! - [`pipe()`]: creates a connected [`PipeReader`] / [`PipeWriter`] pair
//! - [`RingBuffer`]: the fixed-capacity byte store underneath, usable on its own
//! - [`Synced`]: a lock wrapper that turns partial transfers into full ones
//!
//! # Backpressure
//!
//! Writes block while the buffer is full and reads block while it is empty.
//! Neither waits for a full transfer: a read returns whatever is buffered
//! and a write returns as soon as some bytes fit.
//!
//! ```
//! use bytepipe::pipe;
//!
//! let (r, w) = pipe(4).unwrap();
//! assert_eq!(w.write(b"abcdef").unwrap(), 4); // only 4 fit
//!
//! let mut buf = [0u8; 8];
//! assert_eq!(r.read(&mut buf).unwrap(), 4);
//! ```
//!
//! # Closing
//!
//! Each end closes independently, optionally with a [`CloseCause`]:
//!
//! - Closing the writer lets the reader drain what is buffered, then every
//!   read returns the writer's cause ([`CloseCause::Eof`] by default).
//! - Closing the reader makes every write fail with the reader's cause
//!   ([`CloseCause::ClosedPipe`] by default).
//! - Using an end after closing it fails with [`PipeError::ClosedPipe`].
//!
//! ```
//! use bytepipe::{pipe, CloseCause, PipeError};
//!
//! let (r, w) = pipe(8).unwrap();
//! w.write(b"last").unwrap();
//! w.close_with_error(Some(CloseCause::other("shutting down"))).unwrap();
//!
//! let mut buf = [0u8; 8];
//! assert_eq!(r.read(&mut buf).unwrap(), 4);
//! assert_eq!(
//!     r.read(&mut buf),
//!     Err(PipeError::Closed(CloseCause::other("shutting down")))
//! );
//! ```
//!
//! # Thread Safety
//!
//! Pipe ends are `Send + Sync` and `Clone`; clones share the same pipe.
//! [`PipeReader`] and [`PipeWriter`] also implement [`std::io::Read`] and
//! [`std::io::Write`].

mod bytes;
mod error;
mod pipe;
mod ring_buffer;
mod sync;
mod traits;

pub use bytes::*;
pub use error::{CloseCause, PipeError, Result, Side};
pub use pipe::{
    DEFAULT_READ_CLOSE_CAUSE, DEFAULT_WRITE_CLOSE_CAUSE, PipeReader, PipeStatus, PipeWriter, pipe,
};
pub use ring_buffer::RingBuffer;
pub use sync::{SyncPipeReader, SyncPipeWriter, Synced};
pub use traits::{CloseWithError, Closer, PipeRead, PipeWrite, Reader, Writer};

#[cfg(test)]
mod tests;

#[cfg(test)]
mod static_tests {
    use super::*;

    #[test]
    fn test_pipe_ends_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipeReader>();
        assert_send_sync::<PipeWriter>();
        assert_send_sync::<SyncPipeReader>();
        assert_send_sync::<SyncPipeWriter>();
        assert_send_sync::<PipeError>();
    }

    #[test]
    fn test_pipe_ends_are_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<PipeReader>();
        assert_clone::<PipeWriter>();
    }

    #[test]
    fn test_pipe_ends_satisfy_capabilities() {
        fn assert_pipe_read<T: PipeRead>() {}
        fn assert_pipe_write<T: PipeWrite>() {}
        assert_pipe_read::<PipeReader>();
        assert_pipe_write::<PipeWriter>();
        assert_pipe_read::<SyncPipeReader>();
        assert_pipe_write::<SyncPipeWriter>();
    }
}
