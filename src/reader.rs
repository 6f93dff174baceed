//! Provides [`PacReader`], the single cursor over a container shared by all parsing stages.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use thiserror::Error;

/// An error which may occur while reading a container.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Returned when fewer bytes than requested were available.
    #[error("truncated read at offset {offset:#x}: expected {expected} bytes, got {got}")]
    Truncated { offset: u64, expected: usize, got: usize },
    /// Any other I/O error reported by the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A reader over a PAC container with an explicit position.
///
/// Every stage receives the reader by mutable reference and seeks before reading, so the order of
/// reads is visible at the call sites.
#[derive(Debug)]
pub struct PacReader<R> {
    inner: R,
    len: u64,
    pos: u64,
}

impl<R: Read + Seek> PacReader<R> {
    /// Wraps a stream, measuring its length and rewinding it to the start.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len, pos: 0 })
    }

    /// Returns the total length of the container in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns the current absolute position.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Moves the cursor to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> Result<(), ReadError> {
        self.pos = self.inner.seek(SeekFrom::Start(offset))?;
        trace!("Seeked to {:#x}.", self.pos);
        Ok(())
    }

    /// Fills `buf` completely from the current position.
    ///
    /// # Errors
    /// Returns [`ReadError::Truncated`] if the stream ends before `buf` is full. The cursor is left
    /// after the bytes that were read.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let offset = self.pos;
        let mut got = 0;
        while got < buf.len() {
            match self.inner.read(&mut buf[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.pos += got as u64;

        if got != buf.len() {
            return Err(ReadError::Truncated {
                offset,
                expected: buf.len(),
                got,
            });
        }

        Ok(())
    }

    /// Reads `len` bytes into a newly allocated buffer.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, ReadError> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}
