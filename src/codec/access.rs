//! Access conditions stored in a sector trailer.
//!
//! ## Trailer layout
//! ```text
//! [0x00] Key A                    (6 bytes)
//! [0x06] Access bytes             (3 bytes, see below)
//! [0x09] General purpose byte     (1 byte)
//! [0x0A] Key B                    (6 bytes)
//! ```
//!
//! ## Access bytes
//! Every slot `i` (0..=3) owns one access condition `C1 C2 C3`. Each bit is
//! stored twice, once as-is and once inverted:
//! ```text
//!          bit 7   6   5   4   3   2   1   0
//! byte 6:     ¬C2_3 ¬C2_2 ¬C2_1 ¬C2_0 ¬C1_3 ¬C1_2 ¬C1_1 ¬C1_0
//! byte 7:      C1_3  C1_2  C1_1  C1_0 ¬C3_3 ¬C3_2 ¬C3_1 ¬C3_0
//! byte 8:      C3_3  C3_2  C3_1  C3_0  C2_3  C2_2  C2_1  C2_0
//! ```
//!
//! Sectors with 4 blocks use slot `i` for block `i`. Sectors with 16 blocks
//! share the four slots between groups of five blocks (see [`access_slot`]).
//!
//! A slot whose inverted copy is not the exact complement of the direct copy
//! decodes as [`AccessBits::Corrupt`]. The card rejects such a trailer and
//! locks the sector, so corruption is surfaced, never repaired.

use std::fmt;

/// Number of access-condition bytes in a trailer (bytes 6..9).
pub const ACCESS_BYTES_LEN: usize = 3;

/// Number of access-condition slots per trailer.
pub const SLOTS: usize = 4;

/// Raw access-condition bytes as they appear at trailer offset 6.
pub type AccessBytes = [u8; ACCESS_BYTES_LEN];

/// Position of one stored bit: index into [`AccessBytes`] and bit number
/// (0 = least significant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitPos {
    byte: usize,
    bit: u8,
}

/// Direct and inverted storage of one condition bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitPair {
    direct: BitPos,
    inverted: BitPos,
}

const fn pair(direct: (usize, u8), inverted: (usize, u8)) -> BitPair {
    BitPair {
        direct: BitPos {
            byte: direct.0,
            bit: direct.1,
        },
        inverted: BitPos {
            byte: inverted.0,
            bit: inverted.1,
        },
    }
}

/// Storage positions of `[C1, C2, C3]` for every slot.
///
/// `SLOT_BITS[slot][n]` is where bit `n` of the condition for `slot` lives,
/// as `(byte, bit)` offsets into the access bytes.
const SLOT_BITS: [[BitPair; 3]; SLOTS] = [
    [pair((1, 4), (0, 0)), pair((2, 0), (0, 4)), pair((2, 4), (1, 0))],
    [pair((1, 5), (0, 1)), pair((2, 1), (0, 5)), pair((2, 5), (1, 1))],
    [pair((1, 6), (0, 2)), pair((2, 2), (0, 6)), pair((2, 6), (1, 2))],
    [pair((1, 7), (0, 3)), pair((2, 3), (0, 7)), pair((2, 7), (1, 3))],
];

/// Decoded access condition of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessBits {
    /// Consistent condition; `C1` is bit 2, `C3` is bit 0.
    Valid(u8),
    /// Direct and inverted copies disagree.
    Corrupt,
}

impl AccessBits {
    /// The 3-bit value, or [`None`] if corrupt.
    pub fn value(self) -> Option<u8> {
        match self {
            AccessBits::Valid(v) => Some(v),
            AccessBits::Corrupt => None,
        }
    }

    /// Whether the redundancy check passed.
    pub fn is_valid(self) -> bool {
        matches!(self, AccessBits::Valid(_))
    }

    /// Bit `position` of the condition (0 = `C1`, 2 = `C3`).
    pub fn bit(self, position: usize) -> Option<bool> {
        let v = self.value()?;
        (position < 3).then(|| v & (0b100 >> position) != 0)
    }

    /// Whether this condition makes a data block a value block
    /// (`000`, `001` or `110`).
    pub fn is_value_block(self) -> bool {
        matches!(self, AccessBits::Valid(0b000 | 0b001 | 0b110))
    }
}

impl fmt::Display for AccessBits {
    /// `C1C2C3` as binary digits, or `ERR`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessBits::Valid(v) => write!(f, "{v:03b}"),
            AccessBits::Corrupt => f.write_str("ERR"),
        }
    }
}

/// Map a block to its access-condition slot.
///
/// 4-block sectors map one to one. 16-block sectors group five blocks per
/// slot, which puts the trailer (block 15) alone in slot 3.
#[inline]
pub fn access_slot(blocks_in_sector: usize, block: usize) -> usize {
    if blocks_in_sector > SLOTS {
        block / 5
    } else {
        block
    }
}

#[inline]
fn read(bytes: &AccessBytes, pos: BitPos) -> bool {
    crate::utils::bit(bytes[pos.byte], pos.bit)
}

/// Decode the condition stored in `slot`.
///
/// # Panics
/// Panics if `slot >= 4`.
pub fn decode(bytes: &AccessBytes, slot: usize) -> AccessBits {
    let mut direct = 0u8;
    let mut restored = 0u8;
    for (n, pair) in SLOT_BITS[slot].iter().enumerate() {
        let shift = 2 - n;
        direct |= u8::from(read(bytes, pair.direct)) << shift;
        restored |= u8::from(!read(bytes, pair.inverted)) << shift;
    }
    if direct == restored {
        AccessBits::Valid(direct)
    } else {
        AccessBits::Corrupt
    }
}

/// Decode all four slots.
pub fn decode_all(bytes: &AccessBytes) -> [AccessBits; SLOTS] {
    std::array::from_fn(|slot| decode(bytes, slot))
}

/// Write bit `position` (0 = `C1`) of the condition in `slot`.
///
/// The direct copy receives `value` and the inverted copy its complement.
/// The remaining bits of the slot are left as they are, so a slot that was
/// already corrupt elsewhere stays corrupt.
///
/// # Panics
/// Panics if `slot >= 4` or `position >= 3`.
pub fn encode(bytes: AccessBytes, slot: usize, position: usize, value: bool) -> AccessBytes {
    let pair = SLOT_BITS[slot][position];
    let mut out = bytes;
    crate::utils::put_bit(&mut out[pair.direct.byte], pair.direct.bit, value);
    crate::utils::put_bit(&mut out[pair.inverted.byte], pair.inverted.bit, !value);
    out
}

/// Encode a whole set of conditions from scratch.
pub fn encode_all(conditions: [u8; SLOTS]) -> AccessBytes {
    let mut out = [0u8; ACCESS_BYTES_LEN];
    for (slot, cond) in conditions.into_iter().enumerate() {
        for position in 0..3 {
            out = encode(out, slot, position, cond & (0b100 >> position) != 0);
        }
    }
    out
}
