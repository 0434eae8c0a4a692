//! # dbbdump CLI
//!
//! Command-line interface for the dbbdump library.

use std::io::{self, Write};
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use dbbdump::cli::Args;
use dbbdump::config::{ExportConfig, ExportKind};
use dbbdump::dbb::RecordPager;
use dbbdump::entity::{Account, Call, Chat, ChatMember, ChatMessage, Contact, Entity};
use dbbdump::export::{ExportSummary, default_skype_dir, discover_profiles, export_profile};
use dbbdump::render::to_json_full;
use dbbdump::schema::EntityKind;
use dbbdump::{DbbError, Result};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = <Args as ClapParser>::parse();

    if let Some(path) = &args.dump {
        let pager = RecordPager::open_with_max_size(path, args.max_size)?;
        return dump_file(&pager, args.kind.into());
    }

    let Some(config) = args.export_config() else {
        return Ok(());
    };
    config.html.validate()?;

    match config.kind {
        ExportKind::Compact => println!("Dumping chat history to JSON (compact)..."),
        ExportKind::Full => println!("Dumping chat history to JSON (full)..."),
        ExportKind::Calls => println!("Dumping call history to JSON (full)..."),
        ExportKind::Html => println!("Dumping chat history to HTML..."),
    }

    let root = match args.skype_dir.clone().or_else(default_skype_dir) {
        Some(root) => root,
        None => {
            return Err(DbbError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "HOME is not set; pass --skype-dir",
            )));
        }
    };

    let start = Instant::now();
    let mut total = ExportSummary::default();
    for profile in discover_profiles(&root)? {
        let summary = export_profile(&profile, &config)?;
        report_profile(&profile.name, &config, &summary);
        total.merge(summary);
    }

    println!();
    println!(
        "Done: {} records from {} files, {} written ({:.2}s)",
        total.records,
        total.files_read,
        total.written,
        start.elapsed().as_secs_f64()
    );
    if !total.is_clean() {
        println!("{} file(s) could not be read completely:", total.failures.len());
        for failure in &total.failures {
            println!("   {}: {}", failure.path.display(), failure.error);
        }
    }
    Ok(())
}

fn report_profile(user: &str, config: &ExportConfig, summary: &ExportSummary) {
    if summary.files_read == 0 && summary.failures.is_empty() {
        return;
    }
    match config.kind {
        ExportKind::Html => println!(
            "{user}: {} messages in {} files",
            summary.written,
            summary.outputs.len()
        ),
        _ => {
            for output in &summary.outputs {
                println!("writing {} ...", output.display());
            }
        }
    }
}

/// Prints every record of one file as full JSON lines.
fn dump_file(pager: &RecordPager, kind: EntityKind) -> Result<()> {
    match kind {
        EntityKind::Message => dump_records::<ChatMessage>(pager),
        EntityKind::Account => dump_records::<Account>(pager),
        EntityKind::Contact => dump_records::<Contact>(pager),
        EntityKind::Chat => dump_records::<Chat>(pager),
        EntityKind::ChatMember => dump_records::<ChatMember>(pager),
        EntityKind::Call => dump_records::<Call>(pager),
    }
}

fn dump_records<E: Entity>(pager: &RecordPager) -> Result<()> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for fields in pager.records() {
        let entity = E::from_fields(fields?);
        writeln!(out, "{},", to_json_full(&entity)?)?;
    }
    out.flush()?;
    Ok(())
}
