//! Entity materialization: named, per-kind views over decoded records.
//!
//! A decoded [`FieldMap`] knows only numeric codes. Each entity kind turns
//! it into [`Attributes`] using its table from [`crate::schema`], then adds
//! the attributes it derives (creation time, dialog partner, call role).
//!
//! # Example
//!
//! ```rust,no_run
//! use dbbdump::entity::{ChatMessage, EntityReader};
//!
//! let reader = EntityReader::<ChatMessage>::open("chatmsg256.dbb")?;
//! for msg in reader.entities() {
//!     let msg = msg?;
//!     if let Some(body) = msg.body_xml() {
//!         println!("[{}] {}: {}", msg.ctime(), msg.dialog_partner(), body);
//!     }
//! }
//! # Ok::<(), dbbdump::DbbError>(())
//! ```

mod call;
mod directory;
mod message;

pub use call::Call;
pub use directory::{Account, Chat, ChatMember, Contact};
pub use message::ChatMessage;

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::Path;

use chrono::{Local, TimeZone};
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::dbb::{FieldMap, FieldValue, RecordPager};
use crate::error::Result;
use crate::schema::EntityKind;

/// Placeholder creation time when no usable timestamp is present.
pub const UNKNOWN_TIME: &str = "Unknown";

/// Named attributes of one materialized record.
///
/// Serializes as a JSON object with keys in lexicographic order.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    kind: EntityKind,
    values: BTreeMap<&'static str, FieldValue>,
    unknown: Vec<i64>,
}

impl Attributes {
    /// Maps every known code of `fields` to its attribute name.
    ///
    /// Unknown codes are logged and kept only in [`unknown_codes`](Self::unknown_codes).
    pub fn from_fields(kind: EntityKind, fields: FieldMap) -> Self {
        let mut values = BTreeMap::new();
        let mut unknown = Vec::new();
        for (code, value) in fields {
            match kind.field_name(code) {
                Some(name) => {
                    values.insert(name, value);
                }
                None => {
                    warn!(%kind, code, value = %value, "unknown field");
                    unknown.push(code);
                }
            }
        }
        Self {
            kind,
            values,
            unknown,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the attribute if it holds an integer.
    pub fn int(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(FieldValue::as_int)
    }

    /// Returns the attribute if it holds text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// The record id from the slot header.
    pub fn record_id(&self) -> Option<u64> {
        self.int("recid")
    }

    /// Codes present in the record but missing from the kind's table.
    pub fn unknown_codes(&self) -> &[i64] {
        &self.unknown
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

/// A record kind that can be built from a decoded field map.
pub trait Entity: Sized {
    /// The kind whose table names this entity's fields.
    const KIND: EntityKind;

    /// Builds the entity, deriving its computed attributes.
    fn from_fields(fields: FieldMap) -> Self;

    /// All attributes, including derived ones.
    fn attributes(&self) -> &Attributes;

    fn record_id(&self) -> Option<u64> {
        self.attributes().record_id()
    }
}

/// Formats a Unix timestamp like C `ctime` in local time, without the
/// trailing newline (`Thu Jan  1 00:00:00 1970`).
///
/// Returns `None` when the timestamp is outside the representable range.
pub fn format_ctime(secs: u64) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%a %b %e %H:%M:%S %Y").to_string())
}

/// Creation time string for an optional timestamp attribute.
pub(crate) fn ctime_or_unknown(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_int)
        .and_then(format_ctime)
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Typed reader over one DBB file.
///
/// Wraps a [`RecordPager`] and materializes every slot as `E`.
pub struct EntityReader<E> {
    pager: RecordPager,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityReader<E> {
    /// Opens `path`, inferring the stride from its file name.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_pager(RecordPager::open(path)?))
    }

    /// Opens `path` with an explicit maximum payload size.
    pub fn open_with_max_size(path: impl AsRef<Path>, max_size: Option<u64>) -> Result<Self> {
        Ok(Self::with_pager(RecordPager::open_with_max_size(
            path, max_size,
        )?))
    }

    pub fn with_pager(pager: RecordPager) -> Self {
        Self {
            pager,
            _entity: PhantomData,
        }
    }

    pub fn pager(&self) -> &RecordPager {
        &self.pager
    }

    /// Number of record slots in the file.
    pub fn len(&self) -> u64 {
        self.pager.record_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads and materializes the record at `index`.
    pub fn read(&self, index: u64) -> Result<E> {
        self.pager.decode_at(index).map(E::from_fields)
    }

    /// Iterates over all records from the start of the file.
    ///
    /// Stops after the first error.
    pub fn entities(&self) -> impl Iterator<Item = Result<E>> + '_ {
        self.pager.records().map(|fields| fields.map(E::from_fields))
    }
}
