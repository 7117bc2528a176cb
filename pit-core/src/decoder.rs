//! pit.bin decoder.
//!
//! Reads the record count from the header, then walks the fixed-size record
//! array until the count is exhausted, a sentinel record is found, or the
//! input runs out.

use crate::record::{self, RawRecord, HEADER_SIZE, RECORD_SIZE};
use crate::types::{timestamp_from_offset, CaptureEvent, DecodeResult, StickerKind, StopReason};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur during pit.bin decoding.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed header: need 24 bytes, got {len}")]
    MalformedHeader { len: usize },
}

/// Decodes the capture events of an in-memory pit.bin file.
///
/// Truncated record data and the sentinel record both end the sequence
/// without an error; only a buffer shorter than the header fails.
pub fn decode(bytes: &[u8]) -> Result<Vec<CaptureEvent>, DecodeError> {
    decode_log(bytes).map(|result| result.events)
}

/// Like [`decode`], but also reports the declared count and why decoding stopped.
pub fn decode_log(bytes: &[u8]) -> Result<DecodeResult, DecodeError> {
    decode_reader(bytes)
}

/// Decodes a pit.bin file from disk.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodeResult, DecodeError> {
    let file = File::open(path.as_ref())?;
    decode_reader(BufReader::new(file))
}

/// Decodes from any byte source, reading the header and then one record at a time.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<DecodeResult, DecodeError> {
    let mut header = [0u8; HEADER_SIZE];
    let len = read_up_to(&mut reader, &mut header)?;
    if len < HEADER_SIZE {
        return Err(DecodeError::MalformedHeader { len });
    }
    let declared_count = record::read_record_count(&header);

    let mut events = Vec::with_capacity(declared_count as usize);
    let mut stop = StopReason::CountExhausted;
    let mut buf = [0u8; RECORD_SIZE];

    for index in 0..declared_count as usize {
        let available = read_up_to(&mut reader, &mut buf)?;
        if available < RECORD_SIZE {
            stop = StopReason::Truncated { index, available };
            break;
        }

        let raw = RawRecord::new(buf);
        let event = decode_record(&raw);
        trace!(index, offset = raw.timestamp_offset(), flags = raw.flags(), "record");

        if raw.is_sentinel() {
            stop = StopReason::Sentinel { index };
            break;
        }
        events.push(event);
    }

    debug!(declared_count, decoded = events.len(), ?stop, "decode finished");

    Ok(DecodeResult {
        events,
        declared_count,
        stop,
    })
}

/// Decodes the fields of one record. The sentinel check is left to the caller.
#[inline]
pub fn decode_record(raw: &RawRecord) -> CaptureEvent {
    let flags = raw.flags();
    CaptureEvent::new(
        timestamp_from_offset(raw.timestamp_offset()),
        record::flags_get_photo_number(flags),
        StickerKind::from_code(record::flags_get_sticker_code(flags)),
    )
}

/// Fills `buf` as far as the reader allows, returning the number of bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
