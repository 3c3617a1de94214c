//! Lock-serializing wrapper for readers, writers and closers.
//!
//! A bare pipe end hands back partial transfers and lets concurrent callers'
//! bytes interleave. [`Synced`] puts its own lock around any capability
//! implementation so that each call transfers the whole slice before another
//! caller gets a turn, and [`Synced::do_atomic`] lets a caller group several
//! operations under that same lock.

use std::fmt;

use parking_lot::Mutex;

use crate::error::{CloseCause, Result};
use crate::pipe::{PipeReader, PipeWriter};
use crate::traits::{CloseWithError, Closer, Reader, Writer};

/// A [`PipeReader`] whose reads fill the whole destination.
pub type SyncPipeReader = Synced<PipeReader>;

/// A [`PipeWriter`] whose writes transfer the whole source.
pub type SyncPipeWriter = Synced<PipeWriter>;

/// Serializes access to `T` behind a lock.
///
/// `Synced<T>` implements each of [`Reader`], [`Writer`], [`Closer`] and
/// [`CloseWithError`] that `T` implements.
///
/// # Example
///
/// ```
/// use bytepipe::{pipe, Reader, Synced, Writer};
/// use std::thread;
///
/// let (r, w) = pipe(4).unwrap();
/// let w = Synced::new(w);
/// let r = Synced::new(r);
///
/// let producer = thread::spawn(move || {
///     // Blocks until all 10 bytes are in the pipe.
///     assert_eq!(w.write(b"0123456789").unwrap(), 10);
/// });
///
/// let mut buf = [0u8; 10];
/// assert_eq!(r.read(&mut buf).unwrap(), 10);
/// assert_eq!(&buf, b"0123456789");
/// producer.join().unwrap();
/// ```
pub struct Synced<T> {
    lock: Mutex<()>,
    inner: T,
}

impl<T> Synced<T> {
    /// Wraps `inner`.
    pub fn new(inner: T) -> Self {
        Synced {
            lock: Mutex::new(()),
            inner,
        }
    }

    /// Runs `block` with the wrapped value while holding the lock.
    ///
    /// Other calls through this wrapper wait until `block` returns. Calls
    /// made directly on the wrapped value from inside `block` do not take
    /// the lock again.
    pub fn do_atomic<R>(&self, block: impl FnOnce(&T) -> R) -> R {
        let _guard = self.lock.lock();
        block(&self.inner)
    }

    /// Returns a reference to the wrapped value without locking.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Unwraps the wrapped value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Reader> Reader for Synced<T> {
    /// Reads until `dest` is full.
    ///
    /// If an error interrupts the transfer after some bytes were read, the
    /// partial count is returned and the error is left for the next call.
    fn read(&self, dest: &mut [u8]) -> Result<usize> {
        let _guard = self.lock.lock();
        let mut n = 0;
        while n < dest.len() {
            match self.inner.read(&mut dest[n..]) {
                Ok(0) => break,
                Ok(c) => n += c,
                Err(e) if n == 0 => return Err(e),
                Err(_) => break,
            }
        }
        Ok(n)
    }
}

impl<T: Writer> Writer for Synced<T> {
    /// Writes until all of `src` is accepted.
    ///
    /// If an error interrupts the transfer after some bytes were written, the
    /// partial count is returned and the error is left for the next call.
    fn write(&self, src: &[u8]) -> Result<usize> {
        let _guard = self.lock.lock();
        let mut n = 0;
        while n < src.len() {
            match self.inner.write(&src[n..]) {
                Ok(0) => break,
                Ok(c) => n += c,
                Err(e) if n == 0 => return Err(e),
                Err(_) => break,
            }
        }
        Ok(n)
    }
}

impl<T: Closer> Closer for Synced<T> {
    fn close(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.close()
    }
}

impl<T: CloseWithError> CloseWithError for Synced<T> {
    fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.close_with_error(cause)
    }
}

impl<T: fmt::Debug> fmt::Debug for Synced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synced").field("inner", &self.inner).finish()
    }
}
