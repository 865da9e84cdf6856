//! Value blocks.
//!
//! A data block whose access condition is `000`, `001` or `110` may be used
//! by the card as a value block: a signed counter that supports increment,
//! decrement, transfer and restore. The counter and a one-byte address are
//! stored redundantly.
//!
//! ## Layout
//! ```text
//! [0x00] value                    (i32 LE)
//! [0x04] ¬value                   (4 bytes)
//! [0x08] value                    (i32 LE)
//! [0x0C] address                  (1 byte)
//! [0x0D] ¬address                 (1 byte)
//! [0x0E] address                  (1 byte)
//! [0x0F] ¬address                 (1 byte)
//! ```

use std::fmt;

/// Size of a block in bytes.
pub const BLOCK_LEN: usize = 16;

/// Result of checking a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockStatus {
    /// The block is consistent, or the value-block rule does not apply.
    #[default]
    Ok,
    /// The block is under a value-block condition but its redundant copies
    /// disagree.
    Warning,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Ok => f.write_str("OK"),
            BlockStatus::Warning => f.write_str("WARN"),
        }
    }
}

/// A well-formed value block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueBlock {
    /// Signed counter.
    pub value: i32,
    /// Address byte, used by backup management on the reader side.
    pub address: u8,
}

impl ValueBlock {
    /// Decode `block`, returning [`None`] if any redundant copy disagrees.
    pub fn parse(block: &[u8; BLOCK_LEN]) -> Option<Self> {
        let value: [u8; 4] = block[0..4].try_into().ok()?;
        let value_inv: [u8; 4] = block[4..8].try_into().ok()?;
        let value_rep: [u8; 4] = block[8..12].try_into().ok()?;
        let [addr, addr_inv, addr_rep, addr_inv_rep] = [block[12], block[13], block[14], block[15]];

        let value_ok = value == value_inv.map(|b| !b) && value == value_rep;
        let addr_ok = addr == !addr_inv && addr == addr_rep && addr == !addr_inv_rep;

        (value_ok && addr_ok).then(|| Self {
            value: i32::from_le_bytes(value),
            address: addr,
        })
    }

    /// Serialize into the 16-byte layout.
    pub fn to_bytes(&self) -> [u8; BLOCK_LEN] {
        let v = self.value.to_le_bytes();
        let a = self.address;
        let mut out = [0u8; BLOCK_LEN];
        out[0..4].copy_from_slice(&v);
        out[4..8].copy_from_slice(&v.map(|b| !b));
        out[8..12].copy_from_slice(&v);
        out[12..16].copy_from_slice(&[a, !a, a, !a]);
        out
    }
}

/// Check `block` against the value-block layout.
pub fn validate(block: &[u8; BLOCK_LEN]) -> BlockStatus {
    match ValueBlock::parse(block) {
        Some(_) => BlockStatus::Ok,
        None => BlockStatus::Warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_block() {
        let block = [
            0x64, 0x00, 0x00, 0x00, 0x9B, 0xFF, 0xFF, 0xFF, 0x64, 0x00, 0x00, 0x00, 0x05, 0xFA,
            0x05, 0xFA,
        ];
        assert_eq!(validate(&block), BlockStatus::Ok);
        assert_eq!(
            ValueBlock::parse(&block),
            Some(ValueBlock {
                value: 100,
                address: 5
            })
        );
    }

    #[test]
    fn negative_value_layout() {
        let vb = ValueBlock {
            value: -1,
            address: 0,
        };
        let bytes = vb.to_bytes();
        assert_eq!(&bytes[0..8], &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);
        assert_eq!(ValueBlock::parse(&bytes), Some(vb));
    }

    #[test]
    fn every_redundancy_rule_is_checked() {
        let good = ValueBlock {
            value: 0x1234_5678,
            address: 0x42,
        }
        .to_bytes();

        // One byte from each of the five redundant copies.
        for offset in [4, 8, 13, 14, 15] {
            let mut bad = good;
            bad[offset] ^= 0x01;
            assert_eq!(validate(&bad), BlockStatus::Warning, "offset {offset}");
        }
    }

    #[test]
    fn all_zero_block_is_not_a_value_block() {
        assert_eq!(validate(&[0u8; BLOCK_LEN]), BlockStatus::Warning);
    }
}
