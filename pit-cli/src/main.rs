//! pit.bin export CLI application.
//!
//! Decodes a photo-booth pit.bin log and exports the captures to SQLite,
//! Excel or Access.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pit_core::record::RECORD_SIZE;
use pit_core::{decode_file, output, ExportKind, StopReason};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Export destination accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    /// SQLite database
    Db,
    /// Excel workbook
    Xlsx,
    /// Microsoft Access database (requires the `access` feature)
    Accdb,
}

impl From<Target> for ExportKind {
    fn from(target: Target) -> Self {
        match target {
            Target::Db => ExportKind::Tabular,
            Target::Xlsx => ExportKind::Spreadsheet,
            Target::Accdb => ExportKind::DesktopDatabase,
        }
    }
}

/// Photo-booth pit.bin exporter.
///
/// Decodes the capture log written by the booth and exports every capture
/// (date, photo number, sticker) to the selected destination.
#[derive(Parser, Debug)]
#[command(name = "pit-export")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input pit.bin file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Export destination
    #[arg(
        short,
        long,
        value_enum,
        env = "PIT_EXPORT_TO",
        required_unless_present = "list"
    )]
    to: Option<Target>,

    /// Output file path
    ///
    /// Defaults to photos.db, photos.xlsx or photos.accdb depending on --to.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the decoded captures to stdout
    ///
    /// Without --to (or PIT_EXPORT_TO) nothing is exported.
    #[arg(short, long)]
    list: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn export_kind(&self) -> Option<ExportKind> {
        self.to.map(ExportKind::from)
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let progress = spinner(args.quiet || args.list);
    let start_time = Instant::now();

    progress.set_message(format!(
        "Decoding {:?}...",
        args.input.file_name().unwrap_or_default()
    ));

    let result = decode_file(&args.input)
        .with_context(|| format!("Failed to decode pit.bin file {:?}", args.input))?;

    match result.stop {
        StopReason::Truncated { index, available } => warn!(
            index,
            available,
            declared = result.declared_count,
            "file ends inside the record array"
        ),
        stop => debug!(?stop, "decode stopped"),
    }

    if args.list {
        for event in &result.events {
            println!("{}", event);
        }
    }

    // clap guarantees --to unless --list was given
    let Some(kind) = args.export_kind() else {
        return Ok(());
    };
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(kind.default_file_name()));

    progress.set_message(format!(
        "Writing {} captures to {:?}...",
        result.events.len(),
        output_path.file_name().unwrap_or_default()
    ));

    let rows = output::export(kind, &output_path, &result.events)
        .with_context(|| format!("Failed to export to {} file {:?}", kind, output_path))?;

    let total_duration = start_time.elapsed();

    progress.finish_with_message(format!(
        "Done! Exported {} captures in {:.2}s",
        rows,
        total_duration.as_secs_f64()
    ));

    if !args.quiet {
        // Print summary
        eprintln!();
        eprintln!("Summary:");
        eprintln!("  Input:        {:?}", args.input);
        eprintln!("  Output:       {:?} ({})", output_path, kind);
        eprintln!("  Declared:     {}", result.declared_count);
        eprintln!("  Captures:     {}", rows);
        eprintln!("  Stopped:      {}", describe_stop(result.stop));
        eprintln!("  Duration:     {:.3}s", total_duration.as_secs_f64());
    }

    Ok(())
}

fn describe_stop(stop: StopReason) -> String {
    match stop {
        StopReason::CountExhausted => "all declared records read".to_string(),
        StopReason::Sentinel { index } => format!("end marker at record {}", index),
        StopReason::Truncated { index, available } => {
            format!(
                "record {} truncated ({} of {} bytes)",
                index, available, RECORD_SIZE
            )
        }
    }
}
