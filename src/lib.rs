//! # dbbdump
//!
//! A Rust library for decoding the `.dbb` record files written by the
//! legacy Skype for Linux client, and exporting chat and call history as
//! JSON lines or size-bounded HTML logs.
//!
//! ## Overview
//!
//! A `.dbb` file is a sequence of fixed-size slots. Each slot holds one
//! record: a `l33l` signature, a size, a record id, and a run of tagged
//! fields keyed by numeric codes. The file name ends in the slot payload
//! size (`chatmsg256.dbb`), which gives the stride.
//!
//! Decoding runs in stages:
//! - [`dbb::RecordPager`] reads raw slots
//! - [`dbb::decode_record`] turns a slot into a field map
//! - [`entity`] names the fields per record kind and derives extra attributes
//! - [`render`] produces JSON or HTML for one entity
//! - [`output`] writes JSON lines and HTML part files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbbdump::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let reader = EntityReader::<ChatMessage>::open("chatmsg256.dbb")?;
//!     for msg in reader.entities() {
//!         if let Some(line) = to_json_compact(&msg?)? {
//!             println!("{line}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Exporting Every Profile
//!
//! ```rust,no_run
//! use dbbdump::prelude::*;
//!
//! let config = ExportConfig::new(ExportKind::Html)
//!     .with_html(HtmlConfig::new().with_size_limit(4 * 1024 * 1024));
//! let summary = run_export("/home/alice/.Skype", &config)?;
//! for failure in &summary.failures {
//!     eprintln!("{}: {}", failure.path.display(), failure.error);
//! }
//! # Ok::<(), dbbdump::DbbError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`dbb`] - varint codec, field decoder, record pager
//! - [`schema`] - entity kinds and field code tables
//! - [`entity`] - [`ChatMessage`](entity::ChatMessage), [`Call`](entity::Call),
//!   [`Account`](entity::Account), [`Contact`](entity::Contact),
//!   [`Chat`](entity::Chat), [`ChatMember`](entity::ChatMember)
//! - [`render`] - full JSON, compact JSON and HTML fragment renderers
//! - [`output`] - [`JsonLinesWriter`](output::JsonLinesWriter),
//!   [`HtmlPartitioner`](output::HtmlPartitioner)
//! - [`export`] - profile discovery and per-user export pipelines
//! - [`config`] - export and HTML settings
//! - [`cli`] - CLI argument types (feature `cli`)
//! - [`error`] - unified error types ([`DbbError`], [`Result`])
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dbb;
pub mod entity;
pub mod error;
pub mod export;
pub mod output;
pub mod render;
pub mod schema;

pub use error::{DbbError, DecodeErrorKind, Result};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use dbbdump::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{DbbError, DecodeErrorKind, Result};

    pub use crate::dbb::{FieldMap, FieldValue, RecordPager, decode_record};
    pub use crate::schema::EntityKind;

    pub use crate::entity::{
        Account, Call, Chat, ChatMember, ChatMessage, Contact, Entity, EntityReader,
    };

    pub use crate::render::{escape_html, to_html_fragment, to_json_compact, to_json_full};

    pub use crate::output::{HtmlPartitioner, JsonLinesWriter, PartPaths};

    pub use crate::config::{ExportConfig, ExportKind, HtmlConfig, PartitionMode};

    pub use crate::export::{ExportSummary, Profile, discover_profiles, run_export};
}
