//! Sequential read head over an immutable byte buffer.
//!
//! Every read either advances the position by exactly the bytes it
//! consumed or fails without moving. Errors report the absolute offset of
//! the read that failed.

use binscope_error::{Error, ErrorKind, Result};

use crate::leb128;

/// Cursor over a byte slice with absolute offset tracking.
///
/// The cursor is `Copy`: saving a copy and assigning it back is how callers
/// rewind after a speculative decode.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos:  usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining unread length.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// True once every byte has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Fail with `UnexpectedEof` unless `n` more bytes are available.
    pub fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::unexpected_eof(self.pos, n, self.remaining()));
        }
        Ok(())
    }

    /// Peek the next byte without advancing.
    pub fn peek_u8(&self) -> Result<u8> {
        self.data.get(self.pos).copied().ok_or(Error::unexpected_eof(self.pos, 1, 0))
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read exactly `n` bytes as a view into the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a little-endian unsigned integer `width` bytes wide (1 to 8).
    pub fn read_fixed(&mut self, width: usize) -> Result<u64> {
        if width == 0 || width > 8 {
            return Err(Error::invalid_value(self.pos, "fixed integer width", width as u64));
        }
        let bytes = self.read_bytes(width)?;
        Ok(bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a little-endian IEEE 754 single.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_u32_le().map(f32::from_bits)
    }

    /// Read a little-endian IEEE 754 double.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_fixed(8).map(f64::from_bits)
    }

    /// Read a LEB128 unsigned 32-bit integer.
    pub fn read_var_u32(&mut self) -> Result<u32> {
        let (value, read) = leb128::read_leb128_u32(self.data, self.pos)?;
        self.pos += read;
        Ok(value)
    }

    /// Read a LEB128 unsigned 64-bit integer.
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let (value, read) = leb128::read_leb128_u64(self.data, self.pos)?;
        self.pos += read;
        Ok(value)
    }

    /// Read a LEB128 signed 32-bit integer.
    pub fn read_var_i32(&mut self) -> Result<i32> {
        let (value, read) = leb128::read_leb128_i32(self.data, self.pos)?;
        self.pos += read;
        Ok(value)
    }

    /// Read a LEB128 signed 64-bit integer.
    pub fn read_var_i64(&mut self) -> Result<i64> {
        let (value, read) = leb128::read_leb128_i64(self.data, self.pos)?;
        self.pos += read;
        Ok(value)
    }

    /// Read a length-prefixed UTF-8 name: a LEB128 byte count followed by
    /// exactly that many bytes.
    pub fn read_name(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let len = self.read_var_u32()? as usize;
        let text_at = self.pos;
        let bytes = match self.read_bytes(len) {
            Ok(bytes) => bytes,
            Err(error) => {
                self.pos = start;
                return Err(error);
            },
        };
        core::str::from_utf8(bytes).map_err(|_| {
            self.pos = start;
            Error::new(ErrorKind::MalformedText, text_at)
        })
    }

    /// Skip exactly `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// A copy at the same position that cannot read past offset `end`.
    ///
    /// `end` is clamped to the current position and the buffer length.
    #[must_use]
    pub fn limited(&self, end: usize) -> Self {
        let end = end.clamp(self.pos, self.data.len());
        Self { data: &self.data[..end], pos: self.pos }
    }

    /// Move to absolute offset `pos`.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::unexpected_eof(self.pos, pos.saturating_sub(self.pos), self.remaining()));
        }
        self.pos = pos;
        Ok(())
    }
}
