//! Growable byte buffer with append, insert and formatted writes.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

use thiserror::Error;

/// Growth factor applied when a write does not fit.
const GROWTH: usize = 2;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("initial capacity must be non-zero")]
    ZeroCapacity,
    #[error("insert position {pos} is past the end of the stream (length {len})")]
    OutOfRange { pos: usize, len: usize },
    #[error("failed to grow stream buffer")]
    Alloc(#[from] TryReserveError),
}

/// A growable owned byte buffer.
///
/// Invariants: `len() <= capacity()`, and `capacity()` never shrinks. Bytes
/// in `[0, len)` are the content; [`read`](Self::read) borrows them, so the
/// borrow checker rules out reading across a mutation.
///
/// ```
/// use io_kit::cstring::StringStream;
///
/// let mut s = StringStream::with_capacity(8).unwrap();
/// s.write(b"world").unwrap();
/// s.insert(b"hello ", 0).unwrap();
/// s.write_format(format_args!("{}", '!')).unwrap();
/// assert_eq!(s.read(), b"hello world!");
/// ```
#[derive(Debug, Clone)]
pub struct StringStream {
    buf: Vec<u8>,
}

impl StringStream {
    pub fn with_capacity(initial_cap: usize) -> Result<Self, StreamError> {
        if initial_cap == 0 {
            return Err(StreamError::ZeroCapacity);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(initial_cap)?;
        Ok(Self { buf })
    }

    /// Makes room for `additional` more bytes, growing geometrically.
    fn grow_for(&mut self, additional: usize) -> Result<(), StreamError> {
        let needed = self.buf.len().saturating_add(additional);
        if needed <= self.buf.capacity() {
            return Ok(());
        }
        let target = needed.max(self.buf.capacity().saturating_mul(GROWTH));
        self.buf.try_reserve_exact(target - self.buf.len())?;
        Ok(())
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.grow_for(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_format(&mut self, args: fmt::Arguments<'_>) -> Result<(), StreamError> {
        match args.as_str() {
            Some(s) => self.write(s.as_bytes()),
            None => self.write(fmt::format(args).as_bytes()),
        }
    }

    /// Inserts `bytes` at `pos`; `pos == len()` appends.
    pub fn insert(&mut self, bytes: &[u8], pos: usize) -> Result<(), StreamError> {
        let len = self.buf.len();
        if pos > len {
            return Err(StreamError::OutOfRange { pos, len });
        }
        self.grow_for(bytes.len())?;
        self.buf.splice(pos..pos, bytes.iter().copied());
        Ok(())
    }

    /// Shortens the content to `n` bytes. Has no effect when `n >= len()`.
    pub fn truncate(&mut self, n: usize) {
        self.buf.truncate(n);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Ensures the total capacity is at least `min_cap`.
    pub fn reserve(&mut self, min_cap: usize) -> Result<(), StreamError> {
        if min_cap > self.buf.capacity() {
            self.buf.try_reserve_exact(min_cap - self.buf.len())?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn capacity_remaining(&self) -> usize {
        self.buf.capacity() - self.buf.len()
    }

    pub fn read(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl fmt::Write for StringStream {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl io::Write for StringStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        StringStream::write(self, buf).map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
