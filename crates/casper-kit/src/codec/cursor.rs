//! Little-endian byte cursor and appending writer.

use crate::error::CodecError;

/// A read position over a borrowed byte buffer.
///
/// Every read either consumes exactly the requested width or fails with
/// [`CodecError::BufferUnderrun`] and leaves the position untouched.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Run `read` and rewind to the starting position if it fails.
    ///
    /// This makes a multi-step decode all-or-nothing from the caller's view.
    pub fn atomically<T, F>(&mut self, read: F) -> Result<T, CodecError>
    where
        F: FnOnce(&mut Self) -> Result<T, CodecError>,
    {
        let start = self.position;
        let result = read(self);
        if result.is_err() {
            self.position = start;
        }
        result
    }

    /// Consume `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::BufferUnderrun {
                needed: len,
                remaining,
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.bytes[start..self.position])
    }

    /// Consume exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Consume everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let start = self.position;
        self.position = self.bytes.len();
        &self.bytes[start..]
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Read a `u32` length prefix as a `usize`.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        self.read_u32().map(|len| len as usize)
    }

    /// Fail with [`CodecError::TrailingBytes`] unless the buffer is exhausted.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// A growable output buffer; every write appends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a collection length as a `u32` prefix.
    ///
    /// Lengths are bounded by what a `u32` can express; anything larger cannot
    /// exist on the wire.
    pub fn write_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthMismatch {
            expected: u32::MAX as usize,
            actual: len,
        })?;
        self.write_u32(len);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
