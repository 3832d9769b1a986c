//! LEB128 (Little Endian Base 128) encoding and decoding utilities
//!
//! Both container formats that use variable-length integers encode them
//! little-endian, seven payload bits per byte, with the high bit marking
//! continuation. Readers return the decoded value together with the number
//! of bytes consumed; all offsets in errors are absolute.

use alloc::vec::Vec;

use binscope_error::{Error, ErrorKind, Result};

/// Maximum encoded length of a 32-bit value
pub const MAX_LEB128_U32_BYTES: usize = 5;
/// Maximum encoded length of a 64-bit value
pub const MAX_LEB128_U64_BYTES: usize = 10;

const fn max_bytes(bits: u32) -> usize {
    bits.div_ceil(7) as usize
}

fn next_byte(data: &[u8], at: usize) -> Result<u8> {
    data.get(at).copied().ok_or(Error::unexpected_eof(at, 1, 0))
}

fn read_unsigned(data: &[u8], offset: usize, bits: u32) -> Result<(u64, usize)> {
    let limit = max_bytes(bits);
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut read = 0usize;

    loop {
        let byte = next_byte(data, offset + read)?;
        read += 1;

        if read == limit {
            // Final byte: no continuation, and only the bits that still fit
            let spare = bits - shift;
            if byte & 0x80 != 0 || (spare < 7 && u64::from(byte) >> spare != 0) {
                return Err(Error::new(ErrorKind::VarintOverflow { max_bytes: limit }, offset));
            }
        }

        result |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((result, read));
        }
        shift += 7;
    }
}

fn read_signed(data: &[u8], offset: usize, bits: u32) -> Result<(i64, usize)> {
    let limit = max_bytes(bits);
    let mut result = 0i64;
    let mut shift = 0u32;
    let mut read = 0usize;

    loop {
        let byte = next_byte(data, offset + read)?;
        read += 1;

        if read == limit {
            // Unused high bits of the final byte must replicate the sign bit
            let spare = bits - shift;
            let upper = (byte & 0x7F) >> (spare - 1);
            if byte & 0x80 != 0 || (upper != 0 && upper != 0x7F >> (spare - 1)) {
                return Err(Error::new(ErrorKind::VarintOverflow { max_bytes: limit }, offset));
            }
        }

        result |= i64::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            if shift < 64 && byte & 0x40 != 0 {
                result |= -1i64 << shift;
            }
            return Ok((result, read));
        }
    }
}

/// Read a LEB128 encoded unsigned 32-bit integer
pub fn read_leb128_u32(data: &[u8], offset: usize) -> Result<(u32, usize)> {
    let (value, read) = read_unsigned(data, offset, 32)?;
    Ok((value as u32, read))
}

/// Read a LEB128 encoded unsigned 64-bit integer
pub fn read_leb128_u64(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    read_unsigned(data, offset, 64)
}

/// Read a LEB128 encoded signed 32-bit integer
pub fn read_leb128_i32(data: &[u8], offset: usize) -> Result<(i32, usize)> {
    let (value, read) = read_signed(data, offset, 32)?;
    Ok((value as i32, read))
}

/// Read a LEB128 encoded signed 64-bit integer
pub fn read_leb128_i64(data: &[u8], offset: usize) -> Result<(i64, usize)> {
    read_signed(data, offset, 64)
}

/// Write a LEB128 encoded unsigned 64-bit integer
pub fn write_leb128_u64(value: u64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut value = value;

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80;
        }

        result.push(byte);

        if value == 0 {
            break;
        }
    }

    result
}

/// Write a LEB128 encoded unsigned 32-bit integer
pub fn write_leb128_u32(value: u32) -> Vec<u8> {
    write_leb128_u64(u64::from(value))
}

/// Write a LEB128 encoded signed 64-bit integer
pub fn write_leb128_i64(value: i64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut value = value;

    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;

        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            result.push(byte);
            break;
        }
        result.push(byte | 0x80);
    }

    result
}

/// Write a LEB128 encoded signed 32-bit integer
pub fn write_leb128_i32(value: i32) -> Vec<u8> {
    write_leb128_i64(i64::from(value))
}
