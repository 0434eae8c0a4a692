//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`JsonMode`] - What `--json` dumps
//! - [`Mode`] - How existing HTML parts are treated
//! - [`Kind`] - Entity kind for `--dump`
//!
//! Each value enum converts into its library counterpart, so the rest of
//! the crate never depends on clap.
//!
//! ```rust
//! use clap::Parser;
//! use dbbdump::cli::Args;
//! use dbbdump::config::ExportKind;
//!
//! let args = Args::try_parse_from(["dbbdump", "--json", "calls"]).unwrap();
//! assert_eq!(args.export_config().unwrap().kind, ExportKind::Calls);
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{ExportConfig, ExportKind, HtmlConfig, PartitionMode, parse_size_limit};
use crate::schema::EntityKind;

/// Dump Skype for Linux chat and call history from `.dbb` files.
#[derive(Parser, Debug, Clone)]
#[command(name = "dbbdump")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("action").required(true).args(["json", "html", "dump"])))]
#[command(after_help = "EXAMPLES:
    dbbdump --json compact
    dbbdump -j calls -o exports
    dbbdump --html --mode append --limit 4M
    dbbdump --dump ~/.Skype/alice/user4096.dbb --kind contact")]
pub struct Args {
    /// Save history for each user in a *.js file (unsorted)
    #[arg(short, long, value_enum, value_name = "WHAT")]
    pub json: Option<JsonMode>,

    /// Save history for each user/contact pair in *.html files
    #[arg(short = 't', long)]
    pub html: bool,

    /// Decode a single .dbb file and print its records as JSON lines
    #[arg(long, value_name = "FILE")]
    pub dump: Option<PathBuf>,

    /// HTML output mode
    #[arg(short, long, value_enum, default_value = "guess")]
    pub mode: Mode,

    /// Limit HTML file size (bytes, with optional K or M suffix)
    #[arg(short, long, value_name = "BYTES", value_parser = parse_limit)]
    pub limit: Option<u64>,

    /// Skype data directory holding one folder per user
    #[arg(long, value_name = "DIR")]
    pub skype_dir: Option<PathBuf>,

    /// Directory receiving the output files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Record kind of the --dump file
    #[arg(
        long,
        value_enum,
        default_value = "message",
        requires = "dump",
        conflicts_with_all = ["json", "html"]
    )]
    pub kind: Kind,

    /// Maximum record payload size of the --dump file (default: from file name)
    #[arg(
        long,
        value_name = "BYTES",
        requires = "dump",
        conflicts_with_all = ["json", "html"]
    )]
    pub max_size: Option<u64>,
}

fn parse_limit(s: &str) -> Result<u64, String> {
    parse_size_limit(s).map_err(|e| e.to_string())
}

impl Args {
    /// Export settings for `--json` and `--html`; `None` for `--dump`.
    pub fn export_config(&self) -> Option<ExportConfig> {
        let kind = match (self.json, self.html) {
            (Some(json), _) => json.into(),
            (None, true) => ExportKind::Html,
            (None, false) => return None,
        };
        let mut html = HtmlConfig::new().with_mode(self.mode.into());
        if let Some(limit) = self.limit {
            html = html.with_size_limit(limit);
        }
        Some(
            ExportConfig::new(kind)
                .with_html(html)
                .with_output_dir(self.output_dir.clone()),
        )
    }
}

/// What `--json` dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    /// Fields displayed in the client, said messages only
    Compact,

    /// Every message attribute
    Full,

    /// Every call attribute
    Calls,
}

impl From<JsonMode> for ExportKind {
    fn from(mode: JsonMode) -> ExportKind {
        match mode {
            JsonMode::Compact => ExportKind::Compact,
            JsonMode::Full => ExportKind::Full,
            JsonMode::Calls => ExportKind::Calls,
        }
    }
}

/// How existing HTML parts are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Continue the last existing part
    Append,

    /// Rewrite from the first part
    Overwrite,

    /// Overwrite if the log starts the same way, else append
    #[default]
    Guess,
}

impl From<Mode> for PartitionMode {
    fn from(mode: Mode) -> PartitionMode {
        match mode {
            Mode::Append => PartitionMode::Append,
            Mode::Overwrite => PartitionMode::Overwrite,
            Mode::Guess => PartitionMode::Guess,
        }
    }
}

/// Record kind of a `.dbb` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// chatmsg*.dbb
    #[value(alias = "chatmsg")]
    Message,

    /// profile*.dbb
    #[value(alias = "profile")]
    Account,

    /// user*.dbb
    #[value(alias = "user")]
    Contact,

    /// chat*.dbb
    Chat,

    /// chatmember*.dbb
    #[value(name = "chatmember")]
    ChatMember,

    /// call*.dbb
    Call,
}

impl From<Kind> for EntityKind {
    fn from(kind: Kind) -> EntityKind {
        match kind {
            Kind::Message => EntityKind::Message,
            Kind::Account => EntityKind::Account,
            Kind::Contact => EntityKind::Contact,
            Kind::Chat => EntityKind::Chat,
            Kind::ChatMember => EntityKind::ChatMember,
            Kind::Call => EntityKind::Call,
        }
    }
}
