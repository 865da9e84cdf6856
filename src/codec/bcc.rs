//! Block check character (BCC) of the manufacturer block.
//!
//! The BCC stored at byte 4 of block 0 is the XOR of the four UID bytes.
//! Readers compare it during anticollision, so a UID edit without a matching
//! BCC produces a dump that cannot be written back to a card.

/// XOR of all identifier bytes.
#[inline]
pub fn derive(uid: &[u8]) -> u8 {
    uid.iter().fold(0, |acc, b| acc ^ b)
}
