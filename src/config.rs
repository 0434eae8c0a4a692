//! Configuration types for exports and HTML output.
//!
//! Plain values passed explicitly to the export pipelines and the
//! [`HtmlPartitioner`](crate::output::HtmlPartitioner). No framework
//! dependencies; the CLI converts its arguments into these.
//!
//! # Example
//!
//! ```rust
//! use dbbdump::config::{ExportConfig, ExportKind, HtmlConfig, PartitionMode};
//!
//! let config = ExportConfig::new(ExportKind::Html)
//!     .with_output_dir("logs")
//!     .with_html(
//!         HtmlConfig::new()
//!             .with_mode(PartitionMode::Append)
//!             .with_size_limit(4 * 1024 * 1024),
//!     );
//! assert!(config.html.validate().is_ok());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DbbError, Result};

/// Default HTML part size ceiling (1 GiB).
pub const DEFAULT_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

/// Smallest accepted HTML part size ceiling.
pub const MIN_SIZE_LIMIT: u64 = 1024;

/// How existing HTML part files are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMode {
    /// Start over at part 0, truncating existing parts.
    Overwrite,
    /// Continue the last existing part.
    Append,
    /// Overwrite if the existing log starts like the new one, else append.
    #[default]
    Guess,
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionMode::Overwrite => write!(f, "overwrite"),
            PartitionMode::Append => write!(f, "append"),
            PartitionMode::Guess => write!(f, "guess"),
        }
    }
}

impl FromStr for PartitionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(PartitionMode::Overwrite),
            "append" => Ok(PartitionMode::Append),
            "guess" => Ok(PartitionMode::Guess),
            _ => Err(format!(
                "Unknown mode: '{}'. Expected one of: append, overwrite, guess",
                s
            )),
        }
    }
}

/// Settings for HTML output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlConfig {
    /// Treatment of existing part files (default: guess)
    pub mode: PartitionMode,

    /// Maximum part file size in bytes (default: 1 GiB, minimum 1 KiB)
    pub size_limit: u64,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            mode: PartitionMode::Guess,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl HtmlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PartitionMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_size_limit(mut self, bytes: u64) -> Self {
        self.size_limit = bytes;
        self
    }

    /// Checks the size ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`DbbError::InvalidSizeLimit`] if the limit is below
    /// [`MIN_SIZE_LIMIT`].
    pub fn validate(&self) -> Result<()> {
        if self.size_limit < MIN_SIZE_LIMIT {
            return Err(DbbError::invalid_size_limit(
                self.size_limit.to_string(),
                "must be at least 1024 bytes",
            ));
        }
        Ok(())
    }
}

/// What an export run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// All message attributes, one JSON object per line.
    Full,
    /// Displayed fields of said messages, one JSON object per line.
    Compact,
    /// All call attributes, one JSON object per line.
    Calls,
    /// Size-bounded HTML logs per conversation.
    Html,
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Full => write!(f, "full"),
            ExportKind::Compact => write!(f, "compact"),
            ExportKind::Calls => write!(f, "calls"),
            ExportKind::Html => write!(f, "html"),
        }
    }
}

/// Settings for one export run over all profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub kind: ExportKind,

    /// HTML settings, used by [`ExportKind::Html`] only
    pub html: HtmlConfig,

    /// Directory receiving output files (default: current directory)
    pub output_dir: PathBuf,
}

impl ExportConfig {
    pub fn new(kind: ExportKind) -> Self {
        Self {
            kind,
            html: HtmlConfig::default(),
            output_dir: PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn with_html(mut self, html: HtmlConfig) -> Self {
        self.html = html;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Parses a size ceiling such as `4096`, `64K` or `2M`.
///
/// # Errors
///
/// Returns [`DbbError::InvalidSizeLimit`] for malformed input or values
/// below [`MIN_SIZE_LIMIT`].
pub fn parse_size_limit(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let (digits, unit) = match trimmed.char_indices().last() {
        Some((i, 'K')) if i > 0 => (&trimmed[..i], 1024),
        Some((i, 'M')) if i > 0 => (&trimmed[..i], 1024 * 1024),
        _ => (trimmed, 1),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| DbbError::invalid_size_limit(input, "expected a number with optional K or M suffix"))?;
    let bytes = value
        .checked_mul(unit)
        .ok_or_else(|| DbbError::invalid_size_limit(input, "value too large"))?;
    if bytes < MIN_SIZE_LIMIT {
        return Err(DbbError::invalid_size_limit(
            input,
            "must be at least 1024 bytes",
        ));
    }
    Ok(bytes)
}
