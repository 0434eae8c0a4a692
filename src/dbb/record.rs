//! Field decoder for a single DBB record slot.
//!
//! A slot is laid out as:
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0 | 4 | magic `l33l` |
//! | 4 | 4 | record size, little-endian `u32` |
//! | 8 | 4 | record id, little-endian `u32` |
//! | 12 | 5 | reserved |
//! | 17 | .. | fields, until `record size + 8` |
//!
//! Each field starts with a tag byte followed by a varint field code:
//! - `0x00` - varint value
//! - `0x03` - NUL-terminated text
//! - `0x04` - varint length, then that many raw bytes

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::varint;
use crate::error::DecodeErrorKind;

/// Record signature.
pub const MAGIC: &[u8; 4] = b"l33l";

/// Offset of the first field.
pub const HEADER_LEN: usize = 17;

/// Field code under which the header record id is stored.
pub const RECORD_ID_CODE: i64 = -1;

const TAG_INT: u8 = 0x00;
const TAG_TEXT: u8 = 0x03;
const TAG_BLOB: u8 = 0x04;

/// A decoded field value.
///
/// `Flag` never comes out of the decoder; it is used for attributes derived
/// during materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(u64),
    Text(String),
    /// Raw bytes, base64-encoded.
    Blob(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<u64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Text(s) | FieldValue::Blob(s) => f.write_str(s),
            FieldValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Field code to value, as decoded from one slot.
pub type FieldMap = BTreeMap<i64, FieldValue>;

/// Decodes one raw record slot into its fields.
///
/// The record id from the header is stored under [`RECORD_ID_CODE`].
///
/// # Errors
///
/// Fails on a wrong signature, an unknown tag byte, a text field without a
/// terminator, or any read past the end of `chunk`. No partial map is
/// returned.
pub fn decode_record(chunk: &[u8]) -> Result<FieldMap, DecodeErrorKind> {
    if chunk.get(..4) != Some(MAGIC.as_slice()) {
        return Err(DecodeErrorKind::BadMagic {
            found: chunk.iter().take(4).copied().collect(),
        });
    }
    let record_size = read_u32_le(chunk, 4)?;
    let record_id = read_u32_le(chunk, 8)?;

    let mut fields = FieldMap::new();
    fields.insert(RECORD_ID_CODE, FieldValue::Int(u64::from(record_id)));

    let end = record_size as usize + 8;
    let mut pos = HEADER_LEN;
    while pos < end {
        let tag_offset = pos;
        let tag = *chunk
            .get(pos)
            .ok_or(DecodeErrorKind::UnexpectedEnd { offset: pos })?;
        pos += 1;
        if !matches!(tag, TAG_INT | TAG_TEXT | TAG_BLOB) {
            return Err(DecodeErrorKind::UnknownFieldType {
                tag,
                offset: tag_offset,
            });
        }

        let (code, next) = varint::decode(chunk, pos)?;
        let code =
            i64::try_from(code).map_err(|_| DecodeErrorKind::VarintOverflow { offset: pos })?;
        pos = next;

        let value = match tag {
            TAG_INT => {
                let (value, next) = varint::decode(chunk, pos)?;
                pos = next;
                FieldValue::Int(value)
            }
            TAG_BLOB => {
                let (size, next) = varint::decode(chunk, pos)?;
                let blob = usize::try_from(size)
                    .ok()
                    .and_then(|size| chunk.get(next..next.checked_add(size)?))
                    .ok_or(DecodeErrorKind::UnexpectedEnd { offset: next })?;
                pos = next + blob.len();
                FieldValue::Blob(STANDARD.encode(blob))
            }
            _ => {
                // TAG_TEXT
                let len = chunk[pos..]
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or(DecodeErrorKind::UnterminatedString { offset: pos })?;
                let text = String::from_utf8_lossy(&chunk[pos..pos + len]).into_owned();
                pos += len + 1;
                FieldValue::Text(text)
            }
        };
        fields.insert(code, value);
    }

    Ok(fields)
}

fn read_u32_le(chunk: &[u8], offset: usize) -> Result<u32, DecodeErrorKind> {
    chunk
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(DecodeErrorKind::UnexpectedEnd {
            offset: chunk.len(),
        })
}

/// Assembles well-formed record slots.
///
/// Used to synthesize fixtures for tests, benchmarks and the `gen_dbb`
/// generator.
///
/// # Example
///
/// ```rust
/// use dbbdump::dbb::record::{RecordBuilder, decode_record, FieldValue};
///
/// let slot = RecordBuilder::new(42)
///     .int(485, 1_300_000_000)
///     .text(508, "hello")
///     .build_slot(264);
///
/// let fields = decode_record(&slot).unwrap();
/// assert_eq!(fields[&-1], FieldValue::Int(42));
/// assert_eq!(fields[&508], FieldValue::Text("hello".into()));
/// ```
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record_id: u32,
    body: Vec<u8>,
}

impl RecordBuilder {
    pub fn new(record_id: u32) -> Self {
        Self {
            record_id,
            body: Vec::new(),
        }
    }

    /// Appends an integer field.
    #[must_use]
    pub fn int(mut self, code: u64, value: u64) -> Self {
        self.body.push(TAG_INT);
        varint::encode_into(&mut self.body, code);
        varint::encode_into(&mut self.body, value);
        self
    }

    /// Appends a text field. `value` must not contain NUL.
    #[must_use]
    pub fn text(mut self, code: u64, value: &str) -> Self {
        self.body.push(TAG_TEXT);
        varint::encode_into(&mut self.body, code);
        self.body.extend_from_slice(value.as_bytes());
        self.body.push(0);
        self
    }

    /// Appends a binary field.
    #[must_use]
    pub fn blob(mut self, code: u64, value: &[u8]) -> Self {
        self.body.push(TAG_BLOB);
        varint::encode_into(&mut self.body, code);
        varint::encode_into(&mut self.body, value.len() as u64);
        self.body.extend_from_slice(value);
        self
    }

    /// Appends raw bytes to the field area, bypassing the encoders.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Returns the record without slot padding.
    pub fn build(&self) -> Vec<u8> {
        let record_size = (HEADER_LEN - 8 + self.body.len()) as u32;
        let mut out = Vec::with_capacity(HEADER_LEN + self.body.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&record_size.to_le_bytes());
        out.extend_from_slice(&self.record_id.to_le_bytes());
        out.resize(HEADER_LEN, 0);
        out.extend_from_slice(&self.body);
        out
    }

    /// Returns the record zero-padded to `stride` bytes.
    ///
    /// A record longer than `stride` is returned unpadded.
    pub fn build_slot(&self, stride: usize) -> Vec<u8> {
        let mut out = self.build();
        if out.len() < stride {
            out.resize(stride, 0);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_all_field_types() {
        let slot = RecordBuilder::new(9)
            .int(3, 1001)
            .text(480, "#alice/$bob;abc")
            .blob(3170, &[0xDE, 0xAD, 0xBE, 0xEF])
            .build_slot(256);

        let fields = decode_record(&slot).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[&RECORD_ID_CODE], FieldValue::Int(9));
        assert_eq!(fields[&3], FieldValue::Int(1001));
        assert_eq!(fields[&480], FieldValue::Text("#alice/$bob;abc".into()));
        assert_eq!(fields[&3170], FieldValue::Blob("3q2+7w==".into()));
    }

    #[test]
    fn test_empty_record() {
        let slot = RecordBuilder::new(1).build_slot(64);
        let fields = decode_record(&slot).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[&RECORD_ID_CODE], FieldValue::Int(1));
    }

    #[test]
    fn test_padding_after_record_is_ignored() {
        let mut slot = RecordBuilder::new(2).int(11, 5).build_slot(64);
        // Garbage past the declared size must not be read as fields.
        let len = slot.len();
        slot[len - 1] = 0x99;
        let fields = decode_record(&slot).unwrap();
        assert_eq!(fields[&11], FieldValue::Int(5));
    }

    #[test]
    fn test_bad_magic() {
        let mut slot = RecordBuilder::new(1).build_slot(32);
        slot[0] = b'x';
        let err = decode_record(&slot).unwrap_err();
        assert_eq!(
            err,
            DecodeErrorKind::BadMagic {
                found: b"x33l".to_vec()
            }
        );
    }

    #[test]
    fn test_short_chunk_is_bad_magic() {
        let err = decode_record(b"l3").unwrap_err();
        assert!(matches!(err, DecodeErrorKind::BadMagic { .. }));
    }

    #[test]
    fn test_unknown_tag_reports_offset() {
        let slot = RecordBuilder::new(1)
            .int(3, 1)
            .raw(&[0x07, 0x01, 0x01])
            .build_slot(64);
        let err = decode_record(&slot).unwrap_err();
        // Tag 0x00, code 3, value 1 occupies offsets 17..20.
        assert_eq!(err, DecodeErrorKind::UnknownFieldType { tag: 0x07, offset: 20 });
    }

    #[test]
    fn test_unterminated_string() {
        let mut slot = RecordBuilder::new(1).raw(&[TAG_TEXT, 0x10]).build();
        slot.extend_from_slice(b"no terminator");
        // Declared size covers the text, but the chunk ends first.
        let size = (slot.len() - 8) as u32;
        slot[4..8].copy_from_slice(&size.to_le_bytes());
        let err = decode_record(&slot).unwrap_err();
        assert_eq!(err, DecodeErrorKind::UnterminatedString { offset: 19 });
    }

    #[test]
    fn test_declared_size_past_chunk_fails() {
        let mut slot = RecordBuilder::new(1).int(3, 1).build();
        slot[4..8].copy_from_slice(&1000u32.to_le_bytes());
        let err = decode_record(&slot).unwrap_err();
        assert_eq!(err, DecodeErrorKind::UnexpectedEnd { offset: slot.len() });
    }

    #[test]
    fn test_blob_overrun_fails() {
        let mut slot = RecordBuilder::new(1).raw(&[TAG_BLOB, 0x07, 0x40, 0x01]).build();
        let size = 100u32;
        slot[4..8].copy_from_slice(&size.to_le_bytes());
        let err = decode_record(&slot).unwrap_err();
        assert_eq!(err, DecodeErrorKind::UnexpectedEnd { offset: 20 });
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let slot = RecordBuilder::new(1)
            .raw(&[TAG_TEXT, 0x14, 0xFF, b'a', 0x00])
            .build_slot(64);
        let fields = decode_record(&slot).unwrap();
        assert_eq!(fields[&20], FieldValue::Text("\u{FFFD}a".into()));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Int(7).to_string(), "7");
        assert_eq!(FieldValue::Text("hi".into()).to_string(), "hi");
        assert_eq!(FieldValue::Flag(true).to_string(), "true");
    }

    #[test]
    fn test_field_value_serializes_untagged() {
        let json = serde_json::to_string(&FieldValue::Int(5)).unwrap();
        assert_eq!(json, "5");
        let json = serde_json::to_string(&FieldValue::Text("x".into())).unwrap();
        assert_eq!(json, "\"x\"");
        let json = serde_json::to_string(&FieldValue::Flag(false)).unwrap();
        assert_eq!(json, "false");
    }
}
