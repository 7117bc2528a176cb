//! Core types for decoded pit.bin data.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use std::fmt;

/// Unix time of 2000-01-01T00:00:00 UTC, the reference instant of every
/// timestamp stored in a pit.bin file.
pub const PIT_EPOCH_UNIX: i64 = 946_684_800;

/// Format used wherever a timestamp is persisted as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts a stored offset (seconds since 2000-01-01) to an absolute instant.
#[inline]
pub fn timestamp_from_offset(offset: u32) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(PIT_EPOCH_UNIX + i64::from(offset))
}

/// Sticker attached to a capture, from the 2-bit sticker code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum StickerKind {
    #[default]
    None = 0,
    Star = 1,
    Clover = 2,
    Heart = 3,
}

impl StickerKind {
    /// Maps a sticker code. Only the low two bits are considered; anything
    /// unrecognized is `None`.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match code & 0x3 {
            1 => Self::Star,
            2 => Self::Clover,
            3 => Self::Heart,
            _ => Self::None,
        }
    }

    /// The 2-bit wire code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Star => "star",
            Self::Clover => "clover",
            Self::Heart => "heart",
        }
    }

    /// The glyph written by the exporters. Empty when there is no sticker.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Star => "\u{2B50}",
            Self::Clover => "\u{1F340}",
            Self::Heart => "\u{2764}\u{FE0F}",
        }
    }
}

impl fmt::Display for StickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single photo capture recorded by the booth.
///
/// Values are immutable once built; fields are exposed through accessors so
/// the photo number can never leave its 7-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureEvent {
    timestamp: DateTime<Utc>,
    photo_number: u8,
    sticker_kind: StickerKind,
}

impl CaptureEvent {
    /// Creates a capture event. `photo_number` is masked to 7 bits.
    #[inline]
    pub fn new(timestamp: DateTime<Utc>, photo_number: u8, sticker_kind: StickerKind) -> Self {
        Self {
            timestamp,
            photo_number: photo_number & 0x7F,
            sticker_kind,
        }
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Photo slot, always in `0..=127`.
    #[inline]
    pub fn photo_number(&self) -> u8 {
        self.photo_number
    }

    #[inline]
    pub fn sticker_kind(&self) -> StickerKind {
        self.sticker_kind
    }

    /// Timestamp without timezone, as stored by the exporters.
    pub fn naive_timestamp(&self) -> NaiveDateTime {
        self.timestamp.naive_utc()
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for CaptureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  photo {:>3}  {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.photo_number,
            self.sticker_kind
        )
    }
}

/// Why a decode pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All declared records were decoded.
    CountExhausted,
    /// Record `index` had a zero timestamp offset and was not emitted.
    Sentinel { index: usize },
    /// Only `available` bytes were left for record `index`.
    Truncated { index: usize, available: usize },
}

/// Result of decoding a pit.bin file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    /// Decoded captures in on-disk order
    pub events: Vec<CaptureEvent>,
    /// Record count declared by the header
    pub declared_count: u16,
    pub stop: StopReason,
}
