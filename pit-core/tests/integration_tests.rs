//! Integration tests for the pit.bin decoder and exporters.
//!
//! Inputs are synthetic pit.bin buffers written to temporary files.

use pit_core::output::{self, ExportKind};
use pit_core::{decode, decode_file, decode_log, DecodeError, StickerKind, StopReason};
use rusqlite::Connection;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Builds a pit.bin image from `(offset, photo_number, sticker_code)` records.
fn build_pit(count: u16, records: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut bytes = vec![0u8; 0x18];
    bytes[0..8].copy_from_slice(b"PITLOG\0\0");
    bytes[0x08..0x0A].copy_from_slice(&count.to_le_bytes());
    for &(offset, photo, sticker) in records {
        let flags = (photo << 11) | (sticker << 18) | 0x7FF;
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&[0x5A; 8]);
        bytes.extend_from_slice(&flags.to_le_bytes());
    }
    bytes
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn sample_log() -> Vec<u8> {
    // Day 1 of a booth session, then unused space
    build_pit(
        6,
        &[
            (8 * 3600, 1, 0),
            (8 * 3600 + 30, 2, 1),
            (9 * 3600, 3, 2),
            (10 * 3600, 127, 3),
            (0, 0, 0),
            (11 * 3600, 5, 1),
        ],
    )
}

/// Test that decoding from disk matches decoding from memory.
#[test]
fn test_decode_file_matches_buffer() {
    let bytes = sample_log();
    let file = write_temp(&bytes);

    let from_file = decode_file(file.path()).expect("Failed to decode file");
    let from_buffer = decode_log(&bytes).unwrap();

    assert_eq!(from_file, from_buffer);
    assert_eq!(from_file.declared_count, 6);
    assert_eq!(from_file.events.len(), 4);
    assert_eq!(from_file.stop, StopReason::Sentinel { index: 4 });
}

/// Test that every decoded event stays inside its field ranges.
#[test]
fn test_fields_in_range() {
    let records: Vec<(u32, u32, u32)> = (1..=300u32).map(|i| (i, i % 128, i % 4)).collect();
    let events = decode(&build_pit(300, &records)).unwrap();

    assert_eq!(events.len(), 300);
    for (i, event) in events.iter().enumerate() {
        assert!(event.photo_number() <= 127, "Event {} out of range", i);
        assert_eq!(event.sticker_kind().code() as usize, (i + 1) % 4);
    }
}

/// Test that output preserves record order, not timestamp order.
#[test]
fn test_order_preserved() {
    let events = decode(&build_pit(3, &[(300, 1, 0), (100, 2, 0), (200, 3, 0)])).unwrap();
    let photos: Vec<u8> = events.iter().map(|e| e.photo_number()).collect();
    assert_eq!(photos, vec![1, 2, 3]);
}

/// Test that decoding the same bytes twice gives the same result.
#[test]
fn test_decode_deterministic() {
    let bytes = sample_log();
    assert_eq!(decode(&bytes).unwrap(), decode(&bytes).unwrap());
}

/// Test that a file cut mid-record yields the records before the cut.
#[test]
fn test_truncated_file() {
    let mut bytes = build_pit(10, &[(60, 1, 0), (120, 2, 0), (180, 3, 0), (240, 4, 0)]);
    bytes.truncate(bytes.len() - 8);
    let file = write_temp(&bytes);

    let result = decode_file(file.path()).unwrap();
    assert_eq!(result.events.len(), 3);
    assert_eq!(
        result.stop,
        StopReason::Truncated {
            index: 3,
            available: 8
        }
    );
}

/// Test that a file shorter than the header is rejected.
#[test]
fn test_short_file_rejected() {
    let file = write_temp(&[0u8; 5]);
    let err = decode_file(file.path()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedHeader { len: 5 }));
}

/// Test that a missing file surfaces as an IO error.
#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = decode_file(dir.path().join("pit.bin")).unwrap_err();
    assert!(matches!(err, DecodeError::Io(_)));
}

/// Test SQLite export, including append on a second run.
#[test]
fn test_sqlite_export() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join(ExportKind::Tabular.default_file_name());
    let events = decode(&sample_log()).unwrap();

    assert_eq!(output::export(ExportKind::Tabular, &db_path, &events).unwrap(), 4);
    assert_eq!(output::export(ExportKind::Tabular, &db_path, &events[..1]).unwrap(), 1);

    let conn = Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 5);

    let (date, photo, sticker): (String, i64, String) = conn
        .query_row(
            "SELECT date, photo_number, sticker FROM photos WHERE id = 3",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(date, "2000-01-01 09:00:00");
    assert_eq!(photo, 3);
    assert_eq!(sticker, StickerKind::Clover.symbol());
}

/// Test Excel export writes a zip container.
#[test]
fn test_xlsx_export() {
    let dir = tempdir().unwrap();
    let xlsx_path = dir.path().join(ExportKind::Spreadsheet.default_file_name());
    let events = decode(&sample_log()).unwrap();

    let rows = output::export(ExportKind::Spreadsheet, &xlsx_path, &events).unwrap();
    assert_eq!(rows, 4);

    let contents = std::fs::read(&xlsx_path).unwrap();
    assert!(contents.len() > 4);
    assert_eq!(&contents[..4], b"PK\x03\x04");
}

/// Test Excel export of an empty sequence still produces a workbook.
#[test]
fn test_xlsx_export_empty() {
    let dir = tempdir().unwrap();
    let xlsx_path = dir.path().join("empty.xlsx");
    assert_eq!(output::write_xlsx(&xlsx_path, &[]).unwrap(), 0);
    assert!(xlsx_path.exists());
}
