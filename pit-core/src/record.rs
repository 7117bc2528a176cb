//! Low-level layout of pit.bin files.
//!
//! Offsets, record size and the bit ranges packed into the per-record flags
//! word. All multi-byte integers are little-endian.

use byteorder::{ByteOrder, LittleEndian};

// ============================================================================
// File header
// [0x00..0x08] opaque | [0x08..0x0A] record count (u16) | [0x0A..0x18] opaque
// ============================================================================

/// Offset of the little-endian u16 record count.
pub const COUNT_OFFSET: usize = 0x08;

/// Size of the fixed header; the record array starts here.
pub const HEADER_SIZE: usize = 0x18;

/// Size of one record in bytes.
pub const RECORD_SIZE: usize = 16;

/// Reads the declared record count from a complete header.
#[inline]
pub fn read_record_count(header: &[u8; HEADER_SIZE]) -> u16 {
    LittleEndian::read_u16(&header[COUNT_OFFSET..COUNT_OFFSET + 2])
}

// ============================================================================
// Record
// [0..4] timestamp offset (u32) | [4..12] reserved | [12..16] flags (u32)
// ============================================================================

/// A raw 16-byte record as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord([u8; RECORD_SIZE]);

impl RawRecord {
    /// Wraps a raw record buffer.
    #[inline]
    pub fn new(bytes: [u8; RECORD_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a record from a slice of exactly [`RECORD_SIZE`] bytes.
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Seconds elapsed since 2000-01-01T00:00:00 UTC. Zero marks the end of data.
    #[inline]
    pub fn timestamp_offset(&self) -> u32 {
        LittleEndian::read_u32(&self.0[0..4])
    }

    /// The eight reserved bytes, not interpreted.
    #[inline]
    pub fn reserved(&self) -> &[u8] {
        &self.0[4..12]
    }

    /// The bit-packed flags word.
    #[inline]
    pub fn flags(&self) -> u32 {
        LittleEndian::read_u32(&self.0[12..16])
    }

    /// True if this record is the end-of-data sentinel.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.timestamp_offset() == 0
    }
}

// ============================================================================
// Flags
// Bits: [31:20] unused | [19:18] sticker code | [17:11] photo number | [10:0] unused
// ============================================================================

pub const PHOTO_NUMBER_SHIFT: u32 = 11;
pub const PHOTO_NUMBER_MASK: u32 = 0x7F;
pub const STICKER_SHIFT: u32 = 18;
pub const STICKER_MASK: u32 = 0x3;

/// Extracts the 7-bit photo number (bits 17:11).
#[inline]
pub fn flags_get_photo_number(flags: u32) -> u8 {
    ((flags >> PHOTO_NUMBER_SHIFT) & PHOTO_NUMBER_MASK) as u8
}

/// Extracts the 2-bit sticker code (bits 19:18).
#[inline]
pub fn flags_get_sticker_code(flags: u32) -> u8 {
    ((flags >> STICKER_SHIFT) & STICKER_MASK) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_record_count() {
        let mut header = [0u8; HEADER_SIZE];
        header[0x08] = 0x34;
        header[0x09] = 0x12;
        assert_eq!(read_record_count(&header), 0x1234);

        // Bytes around the count field are not part of it
        let mut noisy = [0xFFu8; HEADER_SIZE];
        noisy[0x08..0x0A].copy_from_slice(&7u16.to_le_bytes());
        assert_eq!(read_record_count(&noisy), 7);
    }

    #[test]
    fn test_raw_record_fields() {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0..4].copy_from_slice(&3600u32.to_le_bytes());
        bytes[4..12].copy_from_slice(b"RESERVED");
        bytes[12..16].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

        let record = RawRecord::new(bytes);
        assert_eq!(record.timestamp_offset(), 3600);
        assert_eq!(record.reserved(), b"RESERVED");
        assert_eq!(record.flags(), 0xDEAD_BEEF);
        assert!(!record.is_sentinel());
    }

    #[test]
    fn test_raw_record_from_slice() {
        assert!(RawRecord::from_slice(&[0u8; RECORD_SIZE]).is_some());
        assert!(RawRecord::from_slice(&[0u8; 8]).is_none());
        assert!(RawRecord::from_slice(&[0u8; 17]).is_none());
        assert!(RawRecord::new([0u8; RECORD_SIZE]).is_sentinel());
    }

    #[test]
    #[allow(clippy::unusual_byte_groupings)]
    fn test_flags_parsing() {
        // sticker=0b10, photo=0b0000101
        let flags: u32 = 0b10_0000101_00000000000;
        assert_eq!(flags_get_photo_number(flags), 5);
        assert_eq!(flags_get_sticker_code(flags), 2);
    }

    #[test]
    fn test_flags_masking() {
        // Bits outside 11..=19 must not leak into either field.
        let flags = !0x000F_F800u32;
        assert_eq!(flags_get_photo_number(flags), 0);
        assert_eq!(flags_get_sticker_code(flags), 0);

        assert_eq!(flags_get_photo_number(u32::MAX), 127);
        assert_eq!(flags_get_sticker_code(u32::MAX), 3);
    }
}
