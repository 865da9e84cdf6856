//! Low-level nibble and bit primitives shared by the codecs and the card
//! image.
//!
//! Blocks are edited one hex digit at a time. Nibble `0` is the high half of
//! byte `0`, nibble `1` the low half, and so on, matching the order in which
//! a block is written out as a hex string.

use crate::{Error, Result};

/// Decode one ASCII hex digit, accepting either case.
#[inline]
pub(crate) fn hex_nibble(c: char) -> Result<u8> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(Error::InvalidDigit(c)),
    }
}

/// Decode a `'0'` / `'1'` character.
#[inline]
pub(crate) fn binary_digit(c: char) -> Result<bool> {
    match c {
        '0' => Ok(false),
        '1' => Ok(true),
        _ => Err(Error::InvalidDigit(c)),
    }
}

/// Overwrite the nibble at `index` (0 = high nibble of `bytes[0]`).
///
/// Returns [`Error::InvalidAddress`] if `index` is past the end of `bytes`.
#[inline]
pub(crate) fn set_nibble(bytes: &mut [u8], index: usize, value: u8) -> Result<()> {
    let byte = bytes.get_mut(index / 2).ok_or(Error::InvalidAddress)?;
    *byte = if index % 2 == 0 {
        (*byte & 0x0F) | (value << 4)
    } else {
        (*byte & 0xF0) | (value & 0x0F)
    };
    Ok(())
}

/// Test bit `bit` (0 = least significant) of `byte`.
#[inline]
pub(crate) fn bit(byte: u8, bit: u8) -> bool {
    byte & (1 << bit) != 0
}

/// Set or clear bit `bit` (0 = least significant) of `byte`.
#[inline]
pub(crate) fn put_bit(byte: &mut u8, bit: u8, value: bool) {
    if value {
        *byte |= 1 << bit;
    } else {
        *byte &= !(1 << bit);
    }
}

/// Lowercase hex rendering of a byte slice.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
