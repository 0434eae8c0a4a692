//! 7-bit continuation-encoded unsigned integers.
//!
//! Each byte contributes its low 7 bits, least significant group first. A set
//! high bit means another byte follows.

use crate::error::DecodeErrorKind;

/// Decodes the varint starting at `pos`.
///
/// Returns the value and the position just past its last byte.
///
/// # Example
///
/// ```rust
/// use dbbdump::dbb::varint;
///
/// let buf = [0xE5, 0x03, 0xFF];
/// assert_eq!(varint::decode(&buf, 0).unwrap(), (485, 2));
/// ```
pub fn decode(buf: &[u8], pos: usize) -> Result<(u64, usize), DecodeErrorKind> {
    let start = pos;
    let mut pos = pos;
    let mut value = 0u64;
    let mut shift = 0u32;

    loop {
        let byte = *buf
            .get(pos)
            .ok_or(DecodeErrorKind::UnexpectedEnd { offset: pos })?;
        if shift >= u64::BITS || (shift == 63 && byte & 0x7E != 0) {
            return Err(DecodeErrorKind::VarintOverflow { offset: start });
        }
        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;
        pos += 1;
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
    }
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let low = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(low);
            return;
        }
        out.push(low | 0x80);
    }
}

/// Returns the encoding of `value`.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    encode_into(&mut out, value);
    out
}
