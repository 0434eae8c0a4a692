//! Output writers.
//!
//! - [`JsonLinesWriter`] - one JSON record per line, trailing comma
//! - [`HtmlPartitioner`] - size-bounded HTML part files per conversation

mod json_lines;
mod partition;

pub use json_lines::JsonLinesWriter;
pub use partition::{HtmlPartitioner, PAGE_TAIL, PartPaths, PartitionReport, page_head};
