//! What each access condition allows.
//!
//! Conditions mean different things for data blocks and for the trailer.
//! The tables below follow the MIFARE Classic datasheet; `A/B` means either
//! key authenticates the operation.
//!
//! ## Data blocks
//! | C1C2C3 | read | write | increment | decrement, transfer, restore |
//! |--------|------|-------|-----------|------------------------------|
//! | 000    | A/B  | A/B   | A/B       | A/B                          |
//! | 001    | A/B  | -     | -         | A/B                          |
//! | 010    | A/B  | -     | -         | -                            |
//! | 011    | B    | B     | -         | -                            |
//! | 100    | A/B  | B     | -         | -                            |
//! | 101    | B    | -     | -         | -                            |
//! | 110    | A/B  | B     | B         | A/B                          |
//! | 111    | -    | -     | -         | -                            |
//!
//! ## Sector trailer
//! | C1C2C3 | Key A r/w | access bits r/w | Key B r/w |
//! |--------|-----------|-----------------|-----------|
//! | 000    | - / A     | A / -           | A / A     |
//! | 001    | - / A     | A / A           | A / A     |
//! | 010    | - / -     | A / -           | A / -     |
//! | 011    | - / B     | A/B / B         | - / B     |
//! | 100    | - / B     | A/B / -         | - / B     |
//! | 101    | - / -     | A/B / B         | - / -     |
//! | 110    | - / -     | A/B / -         | - / -     |
//! | 111    | - / -     | A/B / -         | - / -     |
//!
//! Key A can never be read back; dumps therefore usually show it as
//! whatever the dumping tool filled in.

use std::fmt;

use crate::card::layout::BlockKind;
use crate::codec::access::AccessBits;
use KeyAccess::{Both, KeyA, KeyB, Never};

/// Which key authorizes an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAccess {
    /// The operation is never allowed.
    Never,
    /// Key A only.
    KeyA,
    /// Key B only.
    KeyB,
    /// Either key.
    Both,
}

impl fmt::Display for KeyAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            KeyAccess::Never => "-",
            KeyAccess::KeyA => "A",
            KeyAccess::KeyB => "B",
            KeyAccess::Both => "A/B",
        })
    }
}

/// Permissions on a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPermissions {
    /// Read the block.
    pub read: KeyAccess,
    /// Write the block.
    pub write: KeyAccess,
    /// Increment a value block.
    pub increment: KeyAccess,
    /// Decrement, transfer and restore.
    pub decrement: KeyAccess,
    /// Short summary of the condition.
    pub summary: &'static str,
}

/// Permissions on the parts of a sector trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerPermissions {
    /// Read Key A (always [`KeyAccess::Never`]).
    pub key_a_read: KeyAccess,
    /// Write Key A.
    pub key_a_write: KeyAccess,
    /// Read the access bytes.
    pub access_read: KeyAccess,
    /// Write the access bytes.
    pub access_write: KeyAccess,
    /// Read Key B.
    pub key_b_read: KeyAccess,
    /// Write Key B.
    pub key_b_write: KeyAccess,
    /// Short summary of the condition.
    pub summary: &'static str,
}

const fn data(
    read: KeyAccess,
    write: KeyAccess,
    increment: KeyAccess,
    decrement: KeyAccess,
    summary: &'static str,
) -> DataPermissions {
    DataPermissions {
        read,
        write,
        increment,
        decrement,
        summary,
    }
}

const fn trailer(
    [key_a_read, key_a_write, access_read, access_write, key_b_read, key_b_write]: [KeyAccess; 6],
    summary: &'static str,
) -> TrailerPermissions {
    TrailerPermissions {
        key_a_read,
        key_a_write,
        access_read,
        access_write,
        key_b_read,
        key_b_write,
        summary,
    }
}

const DATA: [DataPermissions; 8] = [
    data(Both, Both, Both, Both, "all all (transport mode)"),
    data(Both, Never, Never, Both, "read and d/t/r all"),
    data(Both, Never, Never, Never, "read all"),
    data(KeyB, KeyB, Never, Never, "read and write B only"),
    data(Both, KeyB, Never, Never, "read all and write B only"),
    data(KeyB, Never, Never, Never, "read only B"),
    data(Both, KeyB, KeyB, Both, "read and d/t/r all, w/i B"),
    data(Never, Never, Never, Never, "none"),
];

const TRAILER: [TrailerPermissions; 8] = [
    trailer(
        [Never, KeyA, KeyA, Never, KeyA, KeyA],
        "read all by A and write B by A",
    ),
    trailer(
        [Never, KeyA, KeyA, KeyA, KeyA, KeyA],
        "all all by A (transport mode)",
    ),
    trailer(
        [Never, Never, KeyA, Never, KeyA, Never],
        "read ACC and B by A",
    ),
    trailer(
        [Never, KeyB, Both, KeyB, Never, KeyB],
        "read ACC by all and write all by B",
    ),
    trailer(
        [Never, KeyB, Both, Never, Never, KeyB],
        "read ACC by all and write keys by B",
    ),
    trailer(
        [Never, Never, Both, KeyB, Never, Never],
        "read ACC by all and write ACC by B",
    ),
    trailer([Never, Never, Both, Never, Never, Never], "read ACC by all"),
    trailer([Never, Never, Both, Never, Never, Never], "read ACC by all"),
];

/// Data-block permissions for a 3-bit condition (higher bits are ignored).
///
/// ```
/// use mfdedit::permissions::{KeyAccess, data_permissions};
///
/// let p = data_permissions(0b110);
/// assert_eq!((p.read, p.write, p.increment), (KeyAccess::Both, KeyAccess::KeyB, KeyAccess::KeyB));
/// assert_eq!(p.decrement, KeyAccess::Both);
/// ```
pub fn data_permissions(condition: u8) -> DataPermissions {
    DATA[usize::from(condition & 0b111)]
}

/// Trailer permissions for a 3-bit condition (higher bits are ignored).
pub fn trailer_permissions(condition: u8) -> TrailerPermissions {
    TRAILER[usize::from(condition & 0b111)]
}

impl fmt::Display for DataPermissions {
    /// One `|`-separated line: read, write, increment, d/t/r, summary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:^7}|{:^7}|{:^7}|{:^7}| {}",
            self.read, self.write, self.increment, self.decrement, self.summary
        )
    }
}

impl fmt::Display for TrailerPermissions {
    /// One `|`-separated line: Key A r/w, access bits r/w, Key B r/w, summary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:^3}|{:^3}|{:^3}|{:^3}|{:^3}|{:^3}| {}",
            self.key_a_read,
            self.key_a_write,
            self.access_read,
            self.access_write,
            self.key_b_read,
            self.key_b_write,
            self.summary
        )
    }
}

/// Help text for a block of `kind` under `access`.
///
/// Empty for corrupt conditions: nothing can be said about them.
pub fn describe(kind: BlockKind, access: AccessBits) -> String {
    match (kind, access.value()) {
        (BlockKind::Manufacturer, _) => "manufacturer block".to_string(),
        (_, None) => String::new(),
        (BlockKind::Data, Some(c)) => data_permissions(c).to_string(),
        (BlockKind::SectorTrailer, Some(c)) => trailer_permissions(c).to_string(),
    }
}
