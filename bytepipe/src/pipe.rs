//! Blocking, half-closable byte pipe.

use std::fmt;
use std::io;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::error::{CloseCause, PipeError, Result, Side};
use crate::ring_buffer::RingBuffer;
use crate::traits::{CloseWithError, Closer, Reader, Writer};

/// Cause recorded when a [`PipeReader`] is closed without an explicit cause.
pub const DEFAULT_READ_CLOSE_CAUSE: CloseCause = CloseCause::ClosedPipe;

/// Cause recorded when a [`PipeWriter`] is closed without an explicit cause.
pub const DEFAULT_WRITE_CLOSE_CAUSE: CloseCause = CloseCause::Eof;

/// Creates a connected reader/writer pair sharing a buffer of `capacity` bytes.
///
/// Behaves like a unix pipe with a fixed capacity: writes block while the
/// buffer is full, reads block while it is empty, and either end may be
/// closed independently. A writer's close cause reaches the reader only
/// after every buffered byte has been read.
///
/// # Example
///
/// ```
/// use bytepipe::{pipe, CloseCause, PipeError};
/// use std::thread;
///
/// let (r, w) = pipe(4).unwrap();
///
/// let producer = thread::spawn(move || {
///     let mut data: &[u8] = b"hello, pipe";
///     while !data.is_empty() {
///         let n = w.write(data).unwrap();
///         data = &data[n..];
///     }
///     w.close().unwrap();
/// });
///
/// let mut got = Vec::new();
/// let mut buf = [0u8; 3];
/// loop {
///     match r.read(&mut buf) {
///         Ok(n) => got.extend_from_slice(&buf[..n]),
///         Err(PipeError::Closed(CloseCause::Eof)) => break,
///         Err(e) => panic!("{}", e),
///     }
/// }
///
/// producer.join().unwrap();
/// assert_eq!(got, b"hello, pipe");
/// ```
pub fn pipe(capacity: usize) -> Result<(PipeReader, PipeWriter)> {
    let pipe = Arc::new(Pipe {
        state: Mutex::new(PipeState {
            buffer: RingBuffer::new(capacity)?,
            read_closed: None,
            write_closed: None,
        }),
        cond: Condvar::new(),
    });
    Ok((
        PipeReader {
            pipe: Arc::clone(&pipe),
        },
        PipeWriter { pipe },
    ))
}

/// Snapshot of a pipe's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeStatus {
    /// Buffer capacity in bytes.
    pub capacity: usize,
    /// Bytes waiting to be read.
    pub buffered: usize,
    /// Cause the read end was closed with, if closed.
    pub read_closed: Option<CloseCause>,
    /// Cause the write end was closed with, if closed.
    pub write_closed: Option<CloseCause>,
}

impl PipeStatus {
    /// Returns true once both ends are closed and nothing is left to read.
    ///
    /// From then on every read and write only returns a close error.
    pub fn is_finished(&self) -> bool {
        self.read_closed.is_some() && self.write_closed.is_some() && self.buffered == 0
    }
}

struct Pipe {
    state: Mutex<PipeState>,
    // Broadcast after every change to `state`.
    cond: Condvar,
}

struct PipeState {
    buffer: RingBuffer,
    read_closed: Option<CloseCause>,
    write_closed: Option<CloseCause>,
}

impl Pipe {
    fn read(&self, dest: &mut [u8]) -> Result<usize> {
        let mut state = self.state.lock();
        loop {
            if state.read_closed.is_some() {
                return Err(PipeError::ClosedPipe);
            }

            let n = state.buffer.read(dest);
            if n != 0 {
                self.cond.notify_all();
                return Ok(n);
            }
            if let Some(cause) = &state.write_closed {
                if state.buffer.is_empty() {
                    return Err(PipeError::Closed(cause.clone()));
                }
            }
            if dest.is_empty() {
                return Ok(0);
            }

            trace!("pipe reader waiting for data");
            self.cond.wait(&mut state);
        }
    }

    fn write(&self, src: &[u8]) -> Result<usize> {
        let mut state = self.state.lock();
        loop {
            if state.write_closed.is_some() {
                return Err(PipeError::ClosedPipe);
            }
            if let Some(cause) = &state.read_closed {
                return Err(PipeError::Closed(cause.clone()));
            }

            let n = match state.buffer.write(src) {
                Ok(n) => n,
                Err(PipeError::ShortWrite { written, .. }) => written,
                Err(e) => return Err(e),
            };
            if n != 0 {
                self.cond.notify_all();
                return Ok(n);
            }
            if src.is_empty() {
                return Ok(0);
            }

            trace!("pipe writer waiting for space");
            self.cond.wait(&mut state);
        }
    }

    fn close(&self, side: Side, cause: Option<CloseCause>) -> Result<()> {
        let Some(cause) = cause else {
            warn!("rejected pipe {} close without a cause", side);
            return Err(PipeError::InvalidClose(side));
        };

        let mut state = self.state.lock();
        let slot = match side {
            Side::Read => &mut state.read_closed,
            Side::Write => &mut state.write_closed,
        };
        if let Some(existing) = slot.as_ref() {
            if *existing == cause {
                return Ok(());
            }
            warn!(
                "ignoring pipe {} close with ({}); already closed with ({})",
                side, cause, existing
            );
            return Err(PipeError::ConflictingClose {
                side,
                existing: existing.clone(),
                requested: cause,
            });
        }

        debug!("pipe {} closed: {}", side, cause);
        *slot = Some(cause);
        self.cond.notify_all();
        Ok(())
    }

    fn status(&self) -> PipeStatus {
        let state = self.state.lock();
        PipeStatus {
            capacity: state.buffer.capacity(),
            buffered: state.buffer.buffered(),
            read_closed: state.read_closed.clone(),
            write_closed: state.write_closed.clone(),
        }
    }
}

/// The reading end of a [`pipe()`].
///
/// Clones share the same pipe; any number of threads may read through
/// them concurrently.
#[derive(Clone)]
pub struct PipeReader {
    pipe: Arc<Pipe>,
}

impl PipeReader {
    /// Reads buffered bytes into `dest`.
    ///
    /// Blocks while the pipe is empty, the writer is open and `dest` is
    /// non-empty. Returns as soon as any bytes are available, without
    /// waiting to fill `dest`.
    ///
    /// # Errors
    ///
    /// - [`PipeError::ClosedPipe`] if this end was closed.
    /// - [`PipeError::Closed`] with the writer's cause once the writer has
    ///   closed and the buffer is drained.
    pub fn read(&self, dest: &mut [u8]) -> Result<usize> {
        self.pipe.read(dest)
    }

    /// Closes the read end with [`DEFAULT_READ_CLOSE_CAUSE`].
    pub fn close(&self) -> Result<()> {
        self.close_with_error(Some(DEFAULT_READ_CLOSE_CAUSE))
    }

    /// Closes the read end with `cause`.
    ///
    /// Pending and future writes fail with `cause`.
    pub fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        self.pipe.close(Side::Read, cause)
    }

    /// Returns the buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.pipe.status().capacity
    }

    /// Returns the number of bytes waiting to be read.
    pub fn buffered(&self) -> usize {
        self.pipe.status().buffered
    }

    /// Returns a snapshot of the pipe's state.
    pub fn status(&self) -> PipeStatus {
        self.pipe.status()
    }
}

/// The writing end of a [`pipe()`].
///
/// Clones share the same pipe; any number of threads may write through
/// them concurrently.
#[derive(Clone)]
pub struct PipeWriter {
    pipe: Arc<Pipe>,
}

impl PipeWriter {
    /// Writes as much of `src` as currently fits.
    ///
    /// Blocks while the pipe is full, both ends are open and `src` is
    /// non-empty. Returns as soon as any bytes were accepted; a return value
    /// smaller than `src.len()` is a partial write and the caller retries
    /// the remainder.
    ///
    /// # Errors
    ///
    /// - [`PipeError::ClosedPipe`] if this end was closed.
    /// - [`PipeError::Closed`] with the reader's cause if the reader closed.
    pub fn write(&self, src: &[u8]) -> Result<usize> {
        self.pipe.write(src)
    }

    /// Closes the write end with [`DEFAULT_WRITE_CLOSE_CAUSE`].
    pub fn close(&self) -> Result<()> {
        self.close_with_error(Some(DEFAULT_WRITE_CLOSE_CAUSE))
    }

    /// Closes the write end with `cause`.
    ///
    /// Readers receive `cause` after draining what is already buffered.
    pub fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        self.pipe.close(Side::Write, cause)
    }

    /// Returns the buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.pipe.status().capacity
    }

    /// Returns the number of bytes waiting to be read.
    pub fn buffered(&self) -> usize {
        self.pipe.status().buffered
    }

    /// Returns a snapshot of the pipe's state.
    pub fn status(&self) -> PipeStatus {
        self.pipe.status()
    }
}

impl fmt::Debug for PipeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeReader")
            .field("status", &self.status())
            .finish()
    }
}

impl fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeWriter")
            .field("status", &self.status())
            .finish()
    }
}

impl Reader for PipeReader {
    fn read(&self, dest: &mut [u8]) -> Result<usize> {
        PipeReader::read(self, dest)
    }
}

impl Closer for PipeReader {
    fn close(&self) -> Result<()> {
        PipeReader::close(self)
    }
}

impl CloseWithError for PipeReader {
    fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        PipeReader::close_with_error(self, cause)
    }
}

impl Writer for PipeWriter {
    fn write(&self, src: &[u8]) -> Result<usize> {
        PipeWriter::write(self, src)
    }
}

impl Closer for PipeWriter {
    fn close(&self) -> Result<()> {
        PipeWriter::close(self)
    }
}

impl CloseWithError for PipeWriter {
    fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        PipeWriter::close_with_error(self, cause)
    }
}

impl io::Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match PipeReader::read(self, buf) {
            Ok(n) => Ok(n),
            Err(e) if e.is_eof() => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl io::Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        PipeWriter::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
