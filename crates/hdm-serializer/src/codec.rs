//! Binary encode/decode primitives.
//!
//! All integers are little-endian. Strings are length-prefixed with a `u32`
//! byte count. A link is a `(tag u16, index u32)` pair; tag 0 is null.

use std::io::{Read, Write};

use crate::error::FormatError;
use crate::{FORMAT_VERSION, MAGIC};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), FormatError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u16.
pub fn write_u16_le(w: &mut dyn Write, v: u16) -> Result<(), FormatError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), FormatError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), FormatError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length as u32, rejecting lengths that do not fit.
pub fn write_len(w: &mut dyn Write, len: usize) -> Result<(), FormatError> {
    let len = u32::try_from(len).map_err(|_| FormatError::Corrupt {
        detail: format!("length {len} exceeds u32"),
    })?;
    write_u32_le(w, len)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_str(w: &mut dyn Write, s: &str) -> Result<(), FormatError> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Write a `(tag, index)` link.
pub fn write_link(w: &mut dyn Write, tag: u16, index: u32) -> Result<(), FormatError> {
    write_u16_le(w, tag)?;
    write_u32_le(w, index)
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, FormatError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a boolean byte; anything but 0 or 1 is corrupt.
pub fn read_bool(r: &mut dyn Read) -> Result<bool, FormatError> {
    match read_u8(r)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(FormatError::Corrupt {
            detail: format!("invalid bool byte {other}"),
        }),
    }
}

/// Read a little-endian u16.
pub fn read_u16_le(r: &mut dyn Read) -> Result<u16, FormatError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, FormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
///
/// The declared length is not trusted for preallocation: bytes are pulled
/// through `take`, so a corrupt length fails as truncation instead of
/// allocating.
pub fn read_str(r: &mut dyn Read) -> Result<String, FormatError> {
    let len = read_u32_le(r)?;
    let mut buf = Vec::new();
    (&mut *r).take(u64::from(len)).read_to_end(&mut buf)?;
    if buf.len() != len as usize {
        return Err(FormatError::Truncated {
            detail: format!("string of {len} bytes, {} available", buf.len()),
        });
    }
    String::from_utf8(buf).map_err(|e| FormatError::InvalidUtf8 {
        detail: e.to_string(),
    })
}

/// Read a `(tag, index)` link.
pub fn read_link(r: &mut dyn Read) -> Result<(u16, u32), FormatError> {
    let tag = read_u16_le(r)?;
    let index = read_u32_le(r)?;
    Ok((tag, index))
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the stream header (magic, version).
pub fn encode_header(w: &mut dyn Write) -> Result<(), FormatError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)
}

/// Decode and validate the stream header.
pub fn decode_header(r: &mut dyn Read) -> Result<(), FormatError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(FormatError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion { found: version });
    }
    Ok(())
}
