//! Read-only view over the manufacturer block (sector 0, block 0).
//!
//! ## Layout (4-byte UID cards)
//! ```text
//! [0x00] UID                      (4 bytes)
//! [0x04] BCC = UID[0]^..^UID[3]   (1 byte)
//! [0x05] SAK                      (1 byte)
//! [0x06] ATQA                     (2 bytes)
//! [0x08] Manufacturer data        (8 bytes)
//! ```

use std::ops::Range;

use crate::codec::bcc;
use crate::codec::value::BLOCK_LEN;

/// Byte range of the UID.
pub const UID: Range<usize> = 0..4;
/// Offset of the BCC byte.
pub const BCC: usize = 4;
/// Offset of the SAK byte.
pub const SAK: usize = 5;
/// Byte range of the ATQA.
pub const ATQA: Range<usize> = 6..8;

/// Nibble range of the UID in the block's hex rendering.
pub const UID_NIBBLES: Range<usize> = 0..8;
/// Nibble range of the BCC in the block's hex rendering.
pub const BCC_NIBBLES: Range<usize> = 8..10;

/// Borrowed manufacturer block.
#[derive(Debug, Clone, Copy)]
pub struct Manufacturer<'a> {
    raw: &'a [u8; BLOCK_LEN],
}

impl<'a> Manufacturer<'a> {
    pub(crate) fn new(raw: &'a [u8; BLOCK_LEN]) -> Self {
        Self { raw }
    }

    /// Four-byte UID.
    pub fn uid(&self) -> [u8; 4] {
        [self.raw[0], self.raw[1], self.raw[2], self.raw[3]]
    }

    /// Stored BCC.
    pub fn bcc(&self) -> u8 {
        self.raw[BCC]
    }

    /// Whether the stored BCC matches the UID.
    pub fn bcc_valid(&self) -> bool {
        bcc::derive(&self.raw[UID]) == self.bcc()
    }

    /// Select acknowledge.
    pub fn sak(&self) -> u8 {
        self.raw[SAK]
    }

    /// Answer to request, in dump byte order.
    pub fn atqa(&self) -> [u8; 2] {
        [self.raw[ATQA.start], self.raw[ATQA.start + 1]]
    }

    /// Manufacturer-defined trailing bytes.
    pub fn manufacturer_data(&self) -> &[u8] {
        &self.raw[ATQA.end..]
    }
}

/// Recompute the BCC in place from the UID.
pub(crate) fn refresh_bcc(raw: &mut [u8; BLOCK_LEN]) {
    raw[BCC] = bcc::derive(&raw[UID]);
}
