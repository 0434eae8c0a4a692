//! Profile discovery and export pipelines.
//!
//! The client keeps one directory per local user under its data root
//! (`~/.Skype` on Linux). Each export walks the DBB files of one kind in
//! every profile and writes the rendered records to the output directory.
//!
//! An input file that cannot be opened or decoded aborts that file only:
//! the error is logged, recorded in [`ExportSummary::failures`], and the
//! export continues with the next file. Output errors abort the export.
//!
//! # Example
//!
//! ```rust,no_run
//! use dbbdump::config::{ExportConfig, ExportKind};
//! use dbbdump::export::{default_skype_dir, run_export};
//!
//! let root = default_skype_dir().expect("HOME is set");
//! let summary = run_export(&root, &ExportConfig::new(ExportKind::Compact))?;
//! println!("{} records from {} files", summary.records, summary.files_read);
//! # Ok::<(), dbbdump::DbbError>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{ExportConfig, ExportKind};
use crate::entity::{Call, ChatMessage, Entity, EntityReader};
use crate::error::{DbbError, Result};
use crate::output::{HtmlPartitioner, JsonLinesWriter, PartPaths};
use crate::render::{Fragment, to_json_compact, to_json_full};
use crate::schema::EntityKind;

/// Data root of the desktop client for the current user.
///
/// Returns `None` if `HOME` is not set.
pub fn default_skype_dir() -> Option<PathBuf> {
    let home = PathBuf::from(std::env::var_os("HOME")?);
    if cfg!(target_os = "macos") {
        Some(home.join("Library/Application Support/Skype"))
    } else {
        Some(home.join(".Skype"))
    }
}

/// One local user's data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub dir: PathBuf,
}

impl Profile {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// DBB files of `kind` in this profile, sorted by name.
    pub fn dbb_files(&self, kind: EntityKind) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| DbbError::open(&self.dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| kind.matches_file_name(name));
            if matches && entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Lists the profile directories under `root`, sorted by name.
pub fn discover_profiles(root: impl AsRef<Path>) -> Result<Vec<Profile>> {
    let root = root.as_ref();
    let entries = fs::read_dir(root).map_err(|e| DbbError::open(root, e))?;
    let mut profiles = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        profiles.push(Profile::new(name, entry.path()));
    }
    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(profiles)
}

/// An input file that was abandoned.
#[derive(Debug)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub error: DbbError,
}

/// Counters and outcomes of an export.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Input files opened successfully
    pub files_read: usize,

    /// Records decoded
    pub records: u64,

    /// Lines or fragments written
    pub written: u64,

    /// Output files produced
    pub outputs: Vec<PathBuf>,

    pub failures: Vec<ExportFailure>,
}

impl ExportSummary {
    pub fn merge(&mut self, other: ExportSummary) {
        self.files_read += other.files_read;
        self.records += other.records;
        self.written += other.written;
        self.outputs.extend(other.outputs);
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &Path, err: DbbError) {
        error!(path = %path.display(), error = %err, "skipping rest of file");
        self.failures.push(ExportFailure {
            path: path.to_path_buf(),
            error: err,
        });
    }
}

/// Feeds every entity of every file to `sink`.
///
/// Input errors end the current file and are recorded; errors from `sink`
/// are returned.
fn for_each_entity<E, F>(files: &[PathBuf], summary: &mut ExportSummary, mut sink: F) -> Result<()>
where
    E: Entity,
    F: FnMut(E) -> Result<()>,
{
    for path in files {
        let reader = match EntityReader::<E>::open(path) {
            Ok(reader) => reader,
            Err(err) => {
                summary.fail(path, err);
                continue;
            }
        };
        summary.files_read += 1;
        info!(path = %path.display(), records = reader.len(), "reading");
        for entity in reader.entities() {
            match entity {
                Ok(entity) => {
                    summary.records += 1;
                    sink(entity)?;
                }
                Err(err) => {
                    summary.fail(path, err);
                    break;
                }
            }
        }
    }
    Ok(())
}

fn export_json_lines<E, R>(files: &[PathBuf], output: &Path, mut render: R) -> Result<ExportSummary>
where
    E: Entity,
    R: FnMut(&E) -> Result<Option<String>>,
{
    let mut summary = ExportSummary::default();
    let mut writer = JsonLinesWriter::create(output)?;
    for_each_entity::<E, _>(files, &mut summary, |entity| {
        if let Some(line) = render(&entity)? {
            writer.write_line(&line)?;
        }
        Ok(())
    })?;
    summary.written = writer.lines();
    writer.finish()?;
    summary.outputs.push(output.to_path_buf());
    Ok(summary)
}

/// Writes every message attribute of `files` to `output`.
pub fn export_messages_full(files: &[PathBuf], output: &Path) -> Result<ExportSummary> {
    export_json_lines::<ChatMessage, _>(files, output, |msg| to_json_full(msg).map(Some))
}

/// Writes the displayed fields of said messages in `files` to `output`.
pub fn export_messages_compact(files: &[PathBuf], output: &Path) -> Result<ExportSummary> {
    export_json_lines::<ChatMessage, _>(files, output, to_json_compact)
}

/// Writes every call record of `files` to `output`.
pub fn export_calls(files: &[PathBuf], output: &Path) -> Result<ExportSummary> {
    export_json_lines::<Call, _>(files, output, |call| to_json_full(call).map(Some))
}

/// Groups the said messages of `files` by dialog partner, each group in
/// chronological order.
pub fn bucket_fragments(
    files: &[PathBuf],
    summary: &mut ExportSummary,
) -> Result<BTreeMap<String, Vec<Fragment>>> {
    let mut buckets: BTreeMap<String, Vec<Fragment>> = BTreeMap::new();
    for_each_entity::<ChatMessage, _>(files, summary, |msg| {
        if let Some(fragment) = Fragment::from_message(&msg) {
            buckets
                .entry(msg.dialog_partner().to_string())
                .or_default()
                .push(fragment);
        }
        Ok(())
    })?;
    for fragments in buckets.values_mut() {
        fragments.sort();
    }
    Ok(buckets)
}

/// Writes the said messages of `files` as HTML parts, one conversation
/// per dialog partner.
pub fn export_html(
    user: &str,
    files: &[PathBuf],
    output_dir: &Path,
    partitioner: &HtmlPartitioner,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    let buckets = bucket_fragments(files, &mut summary)?;
    for (partner, fragments) in buckets {
        let html: Vec<String> = fragments.into_iter().map(|f| f.html).collect();
        let paths = PartPaths::new(output_dir, user, partner);
        let report = partitioner.write(&paths, &html)?;
        info!(
            user,
            partner = paths.partner(),
            mode = %report.mode,
            parts = report.parts.len(),
            "conversation written"
        );
        summary.written += report.fragments_written as u64;
        summary.outputs.extend(report.parts);
    }
    Ok(summary)
}

/// Runs the configured export for one profile.
///
/// Profiles without input files of the needed kind produce no output.
pub fn export_profile(profile: &Profile, config: &ExportConfig) -> Result<ExportSummary> {
    let kind = match config.kind {
        ExportKind::Calls => EntityKind::Call,
        _ => EntityKind::Message,
    };
    let files = profile.dbb_files(kind)?;
    if files.is_empty() {
        return Ok(ExportSummary::default());
    }

    let output_dir = config.output_dir.as_path();
    let (file_name, export): (String, fn(&[PathBuf], &Path) -> Result<ExportSummary>) =
        match config.kind {
            ExportKind::Html => {
                let partitioner = HtmlPartitioner::new(config.html)?;
                return export_html(&profile.name, &files, output_dir, &partitioner);
            }
            ExportKind::Full => (format!("{}.js", profile.name), export_messages_full),
            ExportKind::Compact => (format!("{}.js", profile.name), export_messages_compact),
            ExportKind::Calls => (format!("{}.calls.js", profile.name), export_calls),
        };
    let output = output_dir.join(file_name);
    info!(path = %output.display(), "writing");
    export(&files, &output)
}

/// Runs the configured export for every profile under `root`.
pub fn run_export(root: impl AsRef<Path>, config: &ExportConfig) -> Result<ExportSummary> {
    config.html.validate()?;
    let mut summary = ExportSummary::default();
    for profile in discover_profiles(root)? {
        summary.merge(export_profile(&profile, config)?);
    }
    Ok(summary)
}
