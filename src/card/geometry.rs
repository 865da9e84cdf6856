//! Sector and block geometry of the supported card sizes.
//!
//! | Variant | Dump size | Sectors | Blocks |
//! |---------|-----------|---------|--------|
//! | Mini    | 320 B     | 5 × 4   | 20     |
//! | 1K      | 1024 B    | 16 × 4  | 64     |
//! | 4K      | 4096 B    | 32 × 4 + 8 × 16 | 256 |
//!
//! The dump size is the only discriminator: there is no header or magic.

use crate::codec::value::BLOCK_LEN;
use crate::{Error, Result};

/// Blocks per sector for sectors `0..32`.
pub const SMALL_SECTOR_BLOCKS: usize = 4;
/// Blocks per sector for sectors `32..40` (4K only).
pub const LARGE_SECTOR_BLOCKS: usize = 16;
/// Number of leading 4-block sectors before 16-block sectors begin.
pub const SMALL_SECTOR_LIMIT: usize = 32;

/// Card variant, determined by dump size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardGeometry {
    /// MIFARE Classic Mini (320 bytes).
    Mini,
    /// MIFARE Classic 1K (1024 bytes).
    Classic1K,
    /// MIFARE Classic 4K (4096 bytes).
    Classic4K,
}

impl CardGeometry {
    /// Identify the variant from a dump length.
    ///
    /// Returns [`Error::InvalidSize`] for anything other than 320, 1024 or
    /// 4096.
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            320 => Ok(Self::Mini),
            1024 => Ok(Self::Classic1K),
            4096 => Ok(Self::Classic4K),
            _ => Err(Error::InvalidSize(len)),
        }
    }

    /// Total dump size in bytes.
    pub fn dump_len(self) -> usize {
        self.total_blocks() * BLOCK_LEN
    }

    /// Number of sectors.
    pub fn sector_count(self) -> usize {
        match self {
            Self::Mini => 5,
            Self::Classic1K => 16,
            Self::Classic4K => 40,
        }
    }

    /// Number of blocks in `sector`, trailer included.
    ///
    /// Depends only on the sector index; callers must check that `sector` is
    /// below [`Self::sector_count`].
    pub fn blocks_in_sector(self, sector: usize) -> usize {
        if sector < SMALL_SECTOR_LIMIT {
            SMALL_SECTOR_BLOCKS
        } else {
            LARGE_SECTOR_BLOCKS
        }
    }

    /// Absolute index of the first block of `sector`.
    pub fn first_block_of_sector(self, sector: usize) -> usize {
        if sector < SMALL_SECTOR_LIMIT {
            sector * SMALL_SECTOR_BLOCKS
        } else {
            SMALL_SECTOR_LIMIT * SMALL_SECTOR_BLOCKS
                + (sector - SMALL_SECTOR_LIMIT) * LARGE_SECTOR_BLOCKS
        }
    }

    /// Total number of blocks.
    pub fn total_blocks(self) -> usize {
        self.first_block_of_sector(self.sector_count())
    }

    /// Human-readable card name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mini => "MIFARE Classic Mini",
            Self::Classic1K => "MIFARE Classic 1K",
            Self::Classic4K => "MIFARE Classic 4K",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_sizes() {
        assert_eq!(CardGeometry::from_len(320).unwrap(), CardGeometry::Mini);
        assert_eq!(CardGeometry::from_len(1024).unwrap(), CardGeometry::Classic1K);
        assert_eq!(CardGeometry::from_len(4096).unwrap(), CardGeometry::Classic4K);
        for len in [0, 319, 321, 1023, 1025, 4095, 4097] {
            assert!(matches!(
                CardGeometry::from_len(len),
                Err(Error::InvalidSize(l)) if l == len
            ));
        }
    }

    #[test]
    fn block_counts_match_dump_size() {
        for geometry in [
            CardGeometry::Mini,
            CardGeometry::Classic1K,
            CardGeometry::Classic4K,
        ] {
            let sum: usize = (0..geometry.sector_count())
                .map(|s| geometry.blocks_in_sector(s))
                .sum();
            assert_eq!(sum, geometry.total_blocks());
            assert_eq!(CardGeometry::from_len(geometry.dump_len()).unwrap(), geometry);
        }
        assert_eq!(CardGeometry::Classic4K.total_blocks(), 256);
    }

    #[test]
    fn sector_offsets_in_4k() {
        let g = CardGeometry::Classic4K;
        assert_eq!(g.first_block_of_sector(31), 124);
        assert_eq!(g.first_block_of_sector(32), 128);
        assert_eq!(g.first_block_of_sector(33), 144);
        assert_eq!(g.first_block_of_sector(39), 240);
        assert_eq!(g.blocks_in_sector(31), 4);
        assert_eq!(g.blocks_in_sector(32), 16);
    }

    #[test]
    fn offsets_agree_with_block_counts() {
        for g in [CardGeometry::Mini, CardGeometry::Classic1K, CardGeometry::Classic4K] {
            for sector in 0..g.sector_count() {
                assert_eq!(
                    g.first_block_of_sector(sector + 1),
                    g.first_block_of_sector(sector) + g.blocks_in_sector(sector),
                    "{} sector {sector}",
                    g.name()
                );
            }
        }
    }
}
