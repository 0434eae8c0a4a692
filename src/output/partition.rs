//! Size-bounded HTML part files for one conversation.
//!
//! A conversation between `user` and `partner` is written to
//! `<user>-<partner>-<seq>.html`, starting at sequence 0. Every part is a
//! complete page: header, fragments one per line, then [`PAGE_TAIL`]. When
//! the next fragment would push a part past the size ceiling, the part is
//! closed and the next sequence number is started.
//!
//! Existing parts are handled according to [`PartitionMode`]:
//! - `Overwrite` rewrites from part 0 and removes any parts past the last
//!   one written
//! - `Append` reopens the last part and writes over its tail; if the tail
//!   is damaged, a new part is started instead
//! - `Guess` overwrites when part 0 begins with the same first fragment,
//!   and appends otherwise

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{HtmlConfig, PartitionMode};
use crate::error::{DbbError, Result};
use crate::render::{FRAGMENT_MARKER, escape_html};

/// Closing markup of every part file.
pub const PAGE_TAIL: &str = "</body></html>";

const PAGE_HEAD: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">
<html><head><meta http-equiv="content-type" content="text/html; charset=UTF-8">
<title>[TITLE]</title><style>
div.msg span.time:before { content: "["; }
div.msg span.time:after { content: "]"; }
div.msg span.time { color: #7F7F7F; margin: 0ex 0.2ex 0ex 0.2ex; }
div.msg span.me:after { content: ": "; }
div.msg span.me { font-weight: bold; color: #0063CC; margin: 0ex 0.5ex 0ex 0.5ex; }
div.msg span.from:after { content: ": "; }
div.msg span.from { font-weight: bold; color: #098DDE; margin: 0ex 0.5ex 0ex 0.5ex; }
</style></head><body>
"#;

/// Page header for part `seq` of a conversation.
pub fn page_head(user: &str, partner: &str, seq: u32) -> String {
    let title = format!(
        "'{}' chats with '{}' part {seq}",
        escape_html(user),
        escape_html(partner)
    );
    PAGE_HEAD.replace("[TITLE]", &title)
}

/// Names the part files of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPaths {
    dir: PathBuf,
    user: String,
    partner: String,
}

impl PartPaths {
    pub fn new(dir: impl Into<PathBuf>, user: impl Into<String>, partner: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            user: user.into(),
            partner: partner.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn partner(&self) -> &str {
        &self.partner
    }

    /// Path of part `seq`. Path separators in names are replaced by `_`.
    pub fn path(&self, seq: u32) -> PathBuf {
        self.dir.join(format!(
            "{}-{}-{seq}.html",
            file_safe(&self.user),
            file_safe(&self.partner)
        ))
    }
}

fn file_safe(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Outcome of writing one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionReport {
    /// Mode in effect after resolving `Guess` and missing files
    pub mode: PartitionMode,

    /// Part files written, in order
    pub parts: Vec<PathBuf>,

    pub fragments_written: usize,

    /// The last part had a damaged tail and was left untouched
    pub recovered: bool,
}

/// Writes conversations as size-bounded HTML part files.
#[derive(Debug, Clone)]
pub struct HtmlPartitioner {
    config: HtmlConfig,
}

impl HtmlPartitioner {
    /// # Errors
    ///
    /// Returns [`DbbError::InvalidSizeLimit`] if the configured ceiling is
    /// below the minimum.
    pub fn new(config: HtmlConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HtmlConfig {
        &self.config
    }

    /// Resolves the configured mode against the files on disk.
    ///
    /// Any mode becomes `Overwrite` when part 0 does not exist.
    pub fn resolve_mode(&self, paths: &PartPaths, first_fragment: &str) -> Result<PartitionMode> {
        let first = paths.path(0);
        if !first.exists() {
            return Ok(PartitionMode::Overwrite);
        }
        match self.config.mode {
            PartitionMode::Guess => {
                let expected = first_fragment.lines().next().unwrap_or_default();
                Ok(match first_marker_line(&first)? {
                    Some(line) if line == expected.as_bytes() => PartitionMode::Overwrite,
                    Some(_) => PartitionMode::Append,
                    None => PartitionMode::Overwrite,
                })
            }
            mode => Ok(mode),
        }
    }

    /// Writes `fragments`, already sorted, as the parts of one conversation.
    ///
    /// Nothing is written for an empty slice.
    pub fn write(&self, paths: &PartPaths, fragments: &[String]) -> Result<PartitionReport> {
        let Some(first) = fragments.first() else {
            return Ok(PartitionReport {
                mode: self.config.mode,
                parts: Vec::new(),
                fragments_written: 0,
                recovered: false,
            });
        };
        let mode = self.resolve_mode(paths, first)?;
        let mut report = PartitionReport {
            mode,
            parts: Vec::new(),
            fragments_written: 0,
            recovered: false,
        };

        let mut seq = 0;
        let mut cursor = None;
        if mode == PartitionMode::Append {
            while paths.path(seq + 1).exists() {
                seq += 1;
            }
            cursor = reopen_for_append(&paths.path(seq))?;
            if cursor.is_none() {
                report.recovered = true;
                seq += 1;
            }
        }

        let limit = self.config.size_limit;
        let mut idx = 0;
        loop {
            let path = paths.path(seq);
            let (file, mut bytes, appending) = match cursor.take() {
                Some((file, offset)) => (file, offset, true),
                None => {
                    let file = File::create(&path).map_err(|e| DbbError::open(&path, e))?;
                    (file, 0, false)
                }
            };
            debug!(path = %path.display(), appending, "writing part");

            let mut out = BufWriter::new(file);
            if !appending {
                let head = page_head(paths.user(), paths.partner(), seq);
                out.write_all(head.as_bytes())?;
                bytes += head.len() as u64;
            }

            let mut in_part = 0;
            while let Some(fragment) = fragments.get(idx) {
                let needed = fragment.len() as u64 + 1;
                let fits = bytes + needed + PAGE_TAIL.len() as u64 <= limit;
                // a fresh part always takes at least one fragment
                if !fits && (appending || in_part > 0) {
                    break;
                }
                out.write_all(fragment.as_bytes())?;
                out.write_all(b"\n")?;
                bytes += needed;
                idx += 1;
                in_part += 1;
            }
            out.write_all(PAGE_TAIL.as_bytes())?;
            out.flush()?;

            info!(path = %path.display(), fragments = in_part, bytes, "part written");
            report.parts.push(path);
            report.fragments_written += in_part;

            if idx >= fragments.len() {
                break;
            }
            seq += 1;
        }

        // parts left over from an earlier, longer conversation
        let mut stale = seq + 1;
        while paths.path(stale).exists() {
            let path = paths.path(stale);
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "removed stale part");
            stale += 1;
        }
        Ok(report)
    }
}

/// Returns the first line of `path` that starts with the fragment marker,
/// without its line ending.
fn first_marker_line(path: &Path) -> Result<Option<Vec<u8>>> {
    let file = File::open(path).map_err(|e| DbbError::open(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        if line.starts_with(FRAGMENT_MARKER.as_bytes()) {
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            return Ok(Some(line));
        }
    }
}

/// Opens the last part for appending, positioned at its tail.
///
/// Returns `None` if the file does not end with [`PAGE_TAIL`].
fn reopen_for_append(path: &Path) -> Result<Option<(File, u64)>> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| DbbError::open(path, e))?;
    let len = file.metadata()?.len();
    let tail_len = PAGE_TAIL.len() as u64;
    if len < tail_len {
        warn!(path = %path.display(), len, "bad end of file, starting a new part");
        return Ok(None);
    }

    let offset = len - tail_len;
    file.seek(SeekFrom::Start(offset))?;
    let mut found = Vec::with_capacity(PAGE_TAIL.len());
    Read::by_ref(&mut file).take(tail_len).read_to_end(&mut found)?;
    if found != PAGE_TAIL.as_bytes() {
        warn!(
            path = %path.display(),
            found = %String::from_utf8_lossy(&found),
            "bad end of file, starting a new part"
        );
        return Ok(None);
    }

    file.seek(SeekFrom::Start(offset))?;
    Ok(Some((file, offset)))
}
