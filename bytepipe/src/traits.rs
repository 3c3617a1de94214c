//! Capability traits shared by pipe ends and their wrappers.
//!
//! Every method takes `&self`: pipe handles are shared between threads and
//! synchronize internally, so callers never need exclusive access.

use crate::error::{CloseCause, Result};

/// Something bytes can be read from.
pub trait Reader {
    /// Reads up to `dest.len()` bytes, returning how many were read.
    fn read(&self, dest: &mut [u8]) -> Result<usize>;
}

/// Something bytes can be written to.
pub trait Writer {
    /// Writes up to `src.len()` bytes, returning how many were accepted.
    fn write(&self, src: &[u8]) -> Result<usize>;
}

/// Something that can be closed with its default cause.
pub trait Closer {
    /// Closes with the default cause for this end.
    fn close(&self) -> Result<()>;
}

/// Something that can be closed with an explicit cause.
pub trait CloseWithError {
    /// Closes with `cause`.
    ///
    /// `None` is rejected with [`PipeError::InvalidClose`]. Repeating the
    /// recorded cause is a no-op; a different cause is rejected with
    /// [`PipeError::ConflictingClose`].
    ///
    /// [`PipeError::InvalidClose`]: crate::PipeError::InvalidClose
    /// [`PipeError::ConflictingClose`]: crate::PipeError::ConflictingClose
    fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()>;
}

/// The reading half of a pipe: [`Reader`] + [`Closer`] + [`CloseWithError`].
pub trait PipeRead: Reader + Closer + CloseWithError {}

impl<T: Reader + Closer + CloseWithError + ?Sized> PipeRead for T {}

/// The writing half of a pipe: [`Writer`] + [`Closer`] + [`CloseWithError`].
pub trait PipeWrite: Writer + Closer + CloseWithError {}

impl<T: Writer + Closer + CloseWithError + ?Sized> PipeWrite for T {}

impl<T: Reader + ?Sized> Reader for &T {
    fn read(&self, dest: &mut [u8]) -> Result<usize> {
        (**self).read(dest)
    }
}

impl<T: Writer + ?Sized> Writer for &T {
    fn write(&self, src: &[u8]) -> Result<usize> {
        (**self).write(src)
    }
}

impl<T: Closer + ?Sized> Closer for &T {
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl<T: CloseWithError + ?Sized> CloseWithError for &T {
    fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        (**self).close_with_error(cause)
    }
}

impl<T: Reader + ?Sized> Reader for Box<T> {
    fn read(&self, dest: &mut [u8]) -> Result<usize> {
        (**self).read(dest)
    }
}

impl<T: Writer + ?Sized> Writer for Box<T> {
    fn write(&self, src: &[u8]) -> Result<usize> {
        (**self).write(src)
    }
}

impl<T: Closer + ?Sized> Closer for Box<T> {
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl<T: CloseWithError + ?Sized> CloseWithError for Box<T> {
    fn close_with_error(&self, cause: Option<CloseCause>) -> Result<()> {
        (**self).close_with_error(cause)
    }
}
