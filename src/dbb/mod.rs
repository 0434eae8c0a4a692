//! Low-level access to DBB record files.
//!
//! - [`varint`] - 7-bit continuation-encoded integers
//! - [`record`] - field decoder for one record slot
//! - [`pager`] - fixed-stride slot access over a file

pub mod pager;
pub mod record;
pub mod varint;

pub use pager::{RecordPager, max_size_from_file_name};
pub use record::{FieldMap, FieldValue, RecordBuilder, decode_record};
