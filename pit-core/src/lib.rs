//! Decoder and exporter for photo-booth pit.bin capture logs.
//!
//! A pit.bin file holds a small fixed header followed by an array of 16-byte
//! records, one per photo capture. This crate decodes those records into
//! [`CaptureEvent`]s and writes them to SQLite, Excel or Access.
//!
//! # Example
//!
//! ```no_run
//! use pit_core::{decode_file, output::{self, ExportKind}};
//!
//! let result = decode_file("pit.bin").unwrap();
//! println!("Decoded {} of {} declared records", result.events.len(), result.declared_count);
//!
//! output::export(ExportKind::Tabular, "photos.db", &result.events).unwrap();
//! ```
//!
//! # Features
//!
//! - Header-driven record count with sentinel and truncation handling
//! - Streaming decode from any [`std::io::Read`] source
//! - SQLite and Excel export; Access export behind the `access` feature

pub mod decoder;
pub mod output;
pub mod record;
pub mod types;

// Re-export commonly used types
pub use decoder::{decode, decode_file, decode_log, decode_reader, DecodeError};
pub use output::{export, ExportKind, OutputError};
pub use types::{CaptureEvent, DecodeResult, StickerKind, StopReason};
