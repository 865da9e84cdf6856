//! Read-only view over a sector trailer.
//!
//! See [`crate::codec::access`] for the byte layout.

use std::ops::Range;

use crate::codec::access::{self, AccessBits, AccessBytes};
use crate::codec::value::BLOCK_LEN;

/// Byte range of Key A.
pub const KEY_A: Range<usize> = 0..6;
/// Byte range of the access-condition bytes.
pub const ACCESS: Range<usize> = 6..9;
/// Offset of the general purpose byte.
pub const GENERAL_PURPOSE: usize = 9;
/// Byte range of Key B.
pub const KEY_B: Range<usize> = 10..16;

/// Borrowed sector trailer.
#[derive(Debug, Clone, Copy)]
pub struct SectorTrailer<'a> {
    raw: &'a [u8; BLOCK_LEN],
}

impl<'a> SectorTrailer<'a> {
    pub(crate) fn new(raw: &'a [u8; BLOCK_LEN]) -> Self {
        Self { raw }
    }

    /// Key A. Real cards never return it on read, so dumps often hold
    /// zeros here unless the key was recovered.
    pub fn key_a(&self) -> [u8; 6] {
        self.raw[KEY_A].try_into().unwrap_or_default()
    }

    /// Access-condition bytes (trailer bytes 6..9).
    pub fn access_bytes(&self) -> AccessBytes {
        read_access(self.raw)
    }

    /// General purpose byte (trailer byte 9).
    pub fn general_purpose_byte(&self) -> u8 {
        self.raw[GENERAL_PURPOSE]
    }

    /// Key B.
    pub fn key_b(&self) -> [u8; 6] {
        self.raw[KEY_B].try_into().unwrap_or_default()
    }

    /// Decoded conditions of all four slots.
    pub fn conditions(&self) -> [AccessBits; access::SLOTS] {
        access::decode_all(&self.access_bytes())
    }
}

pub(crate) fn read_access(raw: &[u8; BLOCK_LEN]) -> AccessBytes {
    [raw[ACCESS.start], raw[ACCESS.start + 1], raw[ACCESS.start + 2]]
}

pub(crate) fn write_access(raw: &mut [u8; BLOCK_LEN], bytes: AccessBytes) {
    raw[ACCESS].copy_from_slice(&bytes);
}
