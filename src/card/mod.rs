//! In-memory card image: parsed blocks plus the tables derived from them.
//!
//! ## Derived tables
//! * **Access table** - one [`AccessBits`] per block, trailer included,
//!   decoded from that sector's trailer.
//! * **Status table** - one [`BlockStatus`] per block. Blocks under a
//!   value-block condition are checked with [`value::validate`]; the
//!   manufacturer block and trailers are always [`BlockStatus::Ok`].
//!
//! Both tables are rebuilt from scratch after parsing and after every edit.
//! A card has at most 256 blocks, so a rebuild is cheap and an edit to a
//! trailer can never leave a stale entry behind.
//!
//! ## Editing
//! All mutation happens one unit at a time: a hex nibble of a block
//! ([`CardImage::edit_hex_nibble`]) or one bit of one access condition
//! ([`CardImage::edit_access_bit`]). Inconsistent results (corrupt access
//! bits, broken value blocks) are allowed and reported, never refused.

pub mod geometry;
pub mod layout;
pub mod manufacturer;
pub mod trailer;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::codec::access::{self, AccessBits};
use crate::codec::value::{self, BLOCK_LEN, BlockStatus};
use crate::utils::{binary_digit, hex_nibble, set_nibble, to_hex};
use crate::{Error, Result};
use geometry::CardGeometry;
use layout::{AddressingMap, BlockKind};
use manufacturer::Manufacturer;
use trailer::SectorTrailer;

/// One 16-byte block.
pub type Block = [u8; BLOCK_LEN];

/// Number of hex digits in a rendered block.
pub const NIBBLES_PER_BLOCK: usize = BLOCK_LEN * 2;

/// Parsed dump with its derived access and status tables.
#[derive(Debug, Clone)]
pub struct CardImage {
    geometry: CardGeometry,
    sectors: Vec<Vec<Block>>,
    access: Vec<Vec<AccessBits>>,
    status: Vec<Vec<BlockStatus>>,
    layout: AddressingMap,
    path: Option<PathBuf>,
    dirty: bool,
}

impl CardImage {
    /// Parse a raw dump.
    ///
    /// Returns [`Error::InvalidSize`] unless `data` is 320, 1024 or 4096
    /// bytes long.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let geometry = CardGeometry::from_len(data.len())?;

        let mut chunks = data.chunks_exact(BLOCK_LEN);
        let sectors = (0..geometry.sector_count())
            .map(|sector| {
                chunks
                    .by_ref()
                    .take(geometry.blocks_in_sector(sector))
                    .map(|chunk| {
                        let mut block = [0u8; BLOCK_LEN];
                        block.copy_from_slice(chunk);
                        block
                    })
                    .collect::<Vec<Block>>()
            })
            .collect();

        debug!(
            "{}: {} sectors, {} blocks",
            geometry.name(),
            geometry.sector_count(),
            geometry.total_blocks()
        );

        let mut image = Self {
            geometry,
            sectors,
            access: Vec::new(),
            status: Vec::new(),
            layout: AddressingMap::new(geometry),
            path: None,
            dirty: false,
        };
        image.rebuild();

        let corrupt = image.corrupt_conditions().count();
        let warnings = image.warnings().count();
        if corrupt > 0 {
            warn!("{corrupt} block(s) have corrupt access conditions");
        }
        if warnings > 0 {
            warn!("{warnings} value block(s) fail the redundancy check");
        }

        Ok(image)
    }

    /// Read and parse a dump file. The path is remembered for [`Self::save`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening dump: {}", path.display());
        let data = fs::read(path)?;
        let mut image = Self::parse(&data)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Card variant.
    pub fn geometry(&self) -> CardGeometry {
        self.geometry
    }

    /// Row addressing for presentation.
    pub fn layout(&self) -> &AddressingMap {
        &self.layout
    }

    /// Number of sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Blocks grouped by sector.
    pub fn sectors(&self) -> &[Vec<Block>] {
        &self.sectors
    }

    /// Raw bytes of one block.
    pub fn block(&self, sector: usize, block: usize) -> Option<&Block> {
        self.sectors.get(sector)?.get(block)
    }

    /// Lowercase hex rendering of one block (32 characters).
    pub fn block_hex(&self, sector: usize, block: usize) -> Option<String> {
        self.block(sector, block).map(|b| to_hex(b))
    }

    /// Decoded access condition of one block.
    pub fn access(&self, sector: usize, block: usize) -> Option<AccessBits> {
        self.access.get(sector)?.get(block).copied()
    }

    /// Value-block status of one block.
    pub fn status(&self, sector: usize, block: usize) -> Option<BlockStatus> {
        self.status.get(sector)?.get(block).copied()
    }

    /// Full access table, indexed `[sector][block]`.
    pub fn access_table(&self) -> &[Vec<AccessBits>] {
        &self.access
    }

    /// Full status table, indexed `[sector][block]`.
    pub fn status_table(&self) -> &[Vec<BlockStatus>] {
        &self.status
    }

    /// Manufacturer block fields.
    pub fn manufacturer(&self) -> Manufacturer<'_> {
        Manufacturer::new(&self.sectors[0][0])
    }

    /// Trailer of `sector`.
    pub fn trailer(&self, sector: usize) -> Option<SectorTrailer<'_>> {
        self.sectors.get(sector)?.last().map(SectorTrailer::new)
    }

    /// `(sector, block)` of every block whose access condition is corrupt.
    pub fn corrupt_conditions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        cells(&self.access).filter_map(|(s, b, a)| (!a.is_valid()).then_some((s, b)))
    }

    /// `(sector, block)` of every block that fails the value-block check.
    pub fn warnings(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        cells(&self.status)
            .filter_map(|(s, b, st)| (*st == BlockStatus::Warning).then_some((s, b)))
    }

    /// Whether the image has edits not yet serialized or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File the image was opened from or last saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a presentation layer may offer nibble `nibble` of a block
    /// for editing.
    ///
    /// The BCC nibbles of the manufacturer block are derived from the UID
    /// and therefore read-only.
    pub fn is_nibble_editable(&self, sector: usize, block: usize, nibble: usize) -> bool {
        self.block(sector, block).is_some()
            && nibble < NIBBLES_PER_BLOCK
            && !(sector == 0 && block == 0 && manufacturer::BCC_NIBBLES.contains(&nibble))
    }

    /// Replace one hex digit of a block.
    ///
    /// `nibble` counts hex digits from the start of the block. Editing the
    /// UID of the manufacturer block recomputes its BCC. The image is left
    /// untouched on error.
    pub fn edit_hex_nibble(
        &mut self,
        sector: usize,
        block: usize,
        nibble: usize,
        digit: char,
    ) -> Result<()> {
        if self.block(sector, block).is_none() || nibble >= NIBBLES_PER_BLOCK {
            return Err(Error::InvalidAddress);
        }
        if !self.is_nibble_editable(sector, block, nibble) {
            return Err(Error::ReadOnly);
        }
        let value = hex_nibble(digit)?;

        let raw = &mut self.sectors[sector][block];
        set_nibble(raw, nibble, value)?;
        if sector == 0 && block == 0 && manufacturer::UID_NIBBLES.contains(&nibble) {
            manufacturer::refresh_bcc(raw);
            trace!("BCC updated to {:02x}", raw[manufacturer::BCC]);
        }
        trace!("sector {sector} block {block} nibble {nibble} := {digit}");

        self.rebuild();
        self.dirty = true;
        Ok(())
    }

    /// Set bit `position` (0 = `C1`, 2 = `C3`) of the access condition that
    /// governs `block` of `sector` to `digit` (`'0'` or `'1'`).
    ///
    /// Only the direct bit and its inverted copy in the trailer change; the
    /// other bits of the condition keep their current (possibly corrupt)
    /// state. In 16-block sectors the change applies to the whole group of
    /// blocks sharing the slot.
    pub fn edit_access_bit(
        &mut self,
        sector: usize,
        block: usize,
        position: usize,
        digit: char,
    ) -> Result<()> {
        let count = self.sectors.get(sector).map_or(0, Vec::len);
        if block >= count || position >= 3 {
            return Err(Error::InvalidAddress);
        }
        let value = binary_digit(digit)?;

        let slot = access::access_slot(count, block);
        let raw = &mut self.sectors[sector][count - 1];
        let bytes = access::encode(trailer::read_access(raw), slot, position, value);
        trailer::write_access(raw, bytes);
        trace!("sector {sector} slot {slot} bit {position} := {digit}");

        self.rebuild();
        self.dirty = true;
        Ok(())
    }

    /// Raw dump bytes in original order, without touching the dirty flag.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.sectors.iter().flatten().flatten().copied().collect()
    }

    /// Raw dump bytes in original order. Clears the dirty flag.
    pub fn serialize(&mut self) -> Vec<u8> {
        self.dirty = false;
        self.to_bytes()
    }

    /// Write the image back to the file it was opened from.
    ///
    /// Returns [`Error::NoPath`] for images built with [`Self::parse`].
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoPath)?;
        self.save_as(path)
    }

    /// Write the image to `path` and make it the new backing file.
    ///
    /// On failure the dirty flag and backing path are left unchanged.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())?;
        info!("Saved dump: {}", path.display());
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Recompute the access and status tables from the raw blocks.
    fn rebuild(&mut self) {
        self.access = self
            .sectors
            .iter()
            .map(|blocks| {
                let count = blocks.len();
                let bytes = trailer::read_access(&blocks[count - 1]);
                (0..count)
                    .map(|b| access::decode(&bytes, access::access_slot(count, b)))
                    .collect()
            })
            .collect();

        self.status = self
            .sectors
            .iter()
            .enumerate()
            .map(|(s, blocks)| {
                blocks
                    .iter()
                    .enumerate()
                    .map(|(b, raw)| {
                        match BlockKind::classify(s, b, blocks.len()) {
                            BlockKind::Manufacturer | BlockKind::SectorTrailer => BlockStatus::Ok,
                            BlockKind::Data if self.access[s][b].is_value_block() => {
                                value::validate(raw)
                            }
                            BlockKind::Data => BlockStatus::Ok,
                        }
                    })
                    .collect()
            })
            .collect();

        debug!("tables rebuilt for {} sectors", self.sectors.len());
    }
}

/// Flatten a `[sector][block]` table into `(sector, block, cell)`.
fn cells<T>(table: &[Vec<T>]) -> impl Iterator<Item = (usize, usize, &T)> {
    table
        .iter()
        .enumerate()
        .flat_map(|(s, row)| row.iter().enumerate().map(move |(b, cell)| (s, b, cell)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::value::ValueBlock;

    /// 1K dump with factory-default trailers and a valid manufacturer block.
    fn transport_1k() -> Vec<u8> {
        let mut data = vec![0u8; 1024];
        for sector in 0..16 {
            let t = sector * 64 + 48;
            data[t..t + 6].fill(0xFF);
            data[t + 6..t + 10].copy_from_slice(&[0xFF, 0x07, 0x80, 0x69]);
            data[t + 10..t + 16].fill(0xFF);
        }
        data[0..8].copy_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x04, 0x08, 0x04, 0x00]);
        data
    }

    #[test]
    fn rejects_bad_sizes() {
        for len in [319, 321, 1023, 1025, 4095, 4097] {
            assert!(matches!(
                CardImage::parse(&vec![0u8; len]),
                Err(Error::InvalidSize(_))
            ));
        }
    }

    #[test]
    fn all_zero_trailers_decode_as_corrupt() {
        let image = CardImage::parse(&[0u8; 1024]).unwrap();
        assert_eq!(image.sector_count(), 16);
        for row in image.access_table() {
            assert_eq!(row.len(), 4);
            for a in row {
                assert_eq!(a.to_string(), "ERR");
            }
        }
        assert_eq!(image.corrupt_conditions().count(), 64);
        assert_eq!(image.warnings().count(), 0);
    }

    #[test]
    fn transport_trailers_decode() {
        let image = CardImage::parse(&transport_1k()).unwrap();
        for row in image.access_table() {
            let rendered: Vec<String> = row.iter().map(ToString::to_string).collect();
            assert_eq!(rendered, ["000", "000", "000", "001"]);
        }
        // Condition 000 makes every zero data block a broken value block,
        // except the manufacturer block.
        assert_eq!(image.status(0, 0), Some(BlockStatus::Ok));
        assert_eq!(image.status(0, 1), Some(BlockStatus::Warning));
        assert_eq!(image.status(0, 3), Some(BlockStatus::Ok));
        assert_eq!(image.warnings().count(), 16 * 3 - 1);
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let data = transport_1k();
        let mut image = CardImage::parse(&data).unwrap();
        assert!(!image.is_dirty());
        assert_eq!(image.serialize(), data);
    }

    #[test]
    fn uid_edit_updates_bcc() {
        let mut image = CardImage::parse(&transport_1k()).unwrap();
        image.edit_hex_nibble(0, 0, 1, 'f').unwrap();
        let m = image.manufacturer();
        assert_eq!(m.uid(), [0x0F, 0x02, 0x03, 0x04]);
        assert_eq!(m.bcc(), 0x0F ^ 0x02 ^ 0x03 ^ 0x04);
        assert!(image.is_dirty());

        // Outside the UID the BCC is left alone.
        image.edit_hex_nibble(0, 0, 10, 'a').unwrap();
        assert_eq!(image.manufacturer().sak(), 0xA8);
        assert_eq!(image.manufacturer().bcc(), 0x0F ^ 0x02 ^ 0x03 ^ 0x04);
    }

    #[test]
    fn bcc_nibbles_are_read_only() {
        let mut image = CardImage::parse(&transport_1k()).unwrap();
        assert!(!image.is_nibble_editable(0, 0, 8));
        assert!(!image.is_nibble_editable(0, 0, 9));
        assert!(image.is_nibble_editable(0, 1, 8));
        assert!(matches!(
            image.edit_hex_nibble(0, 0, 8, '0'),
            Err(Error::ReadOnly)
        ));
        assert!(!image.is_dirty());
    }

    #[test]
    fn rejects_bad_edits_without_changes() {
        let data = transport_1k();
        let mut image = CardImage::parse(&data).unwrap();
        assert!(matches!(
            image.edit_hex_nibble(16, 0, 0, '0'),
            Err(Error::InvalidAddress)
        ));
        assert!(matches!(
            image.edit_hex_nibble(1, 4, 0, '0'),
            Err(Error::InvalidAddress)
        ));
        assert!(matches!(
            image.edit_hex_nibble(1, 0, 32, '0'),
            Err(Error::InvalidAddress)
        ));
        assert!(matches!(
            image.edit_hex_nibble(1, 0, 0, 'x'),
            Err(Error::InvalidDigit('x'))
        ));
        assert!(matches!(
            image.edit_access_bit(1, 0, 3, '1'),
            Err(Error::InvalidAddress)
        ));
        assert!(matches!(
            image.edit_access_bit(1, 0, 0, '2'),
            Err(Error::InvalidDigit('2'))
        ));
        assert!(!image.is_dirty());
        assert_eq!(image.to_bytes(), data);
    }

    #[test]
    fn trailer_nibble_edit_redecodes_sector() {
        let mut image = CardImage::parse(&transport_1k()).unwrap();
        // Access byte 6 is nibbles 12..14 of the trailer; break ¬C1 of slot 0.
        image.edit_hex_nibble(2, 3, 13, 'e').unwrap();
        assert_eq!(image.access(2, 0), Some(AccessBits::Corrupt));
        assert_eq!(image.access(2, 1), Some(AccessBits::Valid(0)));
        assert_eq!(image.status(2, 0), Some(BlockStatus::Ok));
        // Other sectors are unaffected.
        assert_eq!(image.access(1, 0), Some(AccessBits::Valid(0)));
    }

    #[test]
    fn access_bit_edit_rewrites_trailer() {
        let mut image = CardImage::parse(&transport_1k()).unwrap();
        image.edit_access_bit(1, 2, 0, '1').unwrap();
        assert_eq!(image.access(1, 2), Some(AccessBits::Valid(0b100)));
        assert_eq!(image.trailer(1).unwrap().access_bytes(), [0xFB, 0x47, 0x80]);
        assert_eq!(image.status(1, 2), Some(BlockStatus::Ok));
        assert!(image.is_dirty());

        image.serialize();
        assert!(!image.is_dirty());
    }

    #[test]
    fn value_block_under_value_condition() {
        let mut data = transport_1k();
        // Sector 1 blocks: 0 → 110, rest stay 000; trailer stays 001.
        let vb = ValueBlock {
            value: 1000,
            address: 4,
        };
        data[64..80].copy_from_slice(&vb.to_bytes());
        let mut image = CardImage::parse(&data).unwrap();
        for position in [0, 1] {
            image.edit_access_bit(1, 0, position, '1').unwrap();
        }
        assert_eq!(image.access(1, 0).unwrap().to_string(), "110");
        assert_eq!(image.status(1, 0), Some(BlockStatus::Ok));

        // Break the inverted value copy.
        image.edit_hex_nibble(1, 0, 8, '0').unwrap();
        assert_eq!(image.status(1, 0), Some(BlockStatus::Warning));

        // Condition 101 is not a value-block condition.
        image.edit_access_bit(1, 0, 1, '0').unwrap();
        image.edit_access_bit(1, 0, 2, '1').unwrap();
        assert_eq!(image.access(1, 0).unwrap().to_string(), "101");
        assert_eq!(image.status(1, 0), Some(BlockStatus::Ok));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut image = CardImage::parse(&transport_1k()).unwrap();
        let access = image.access_table().to_vec();
        let status = image.status_table().to_vec();
        image.rebuild();
        assert_eq!(image.access_table(), access.as_slice());
        assert_eq!(image.status_table(), status.as_slice());
    }

    #[test]
    fn large_sector_groups_share_a_slot() {
        let mut data = vec![0u8; 4096];
        for sector in 0..40 {
            let (first, count) = if sector < 32 {
                (sector * 4, 4)
            } else {
                (128 + (sector - 32) * 16, 16)
            };
            let t = (first + count - 1) * 16;
            data[t + 6..t + 9].copy_from_slice(&[0x78, 0x77, 0x88]);
        }
        let mut image = CardImage::parse(&data).unwrap();
        assert_eq!(image.sectors()[32].len(), 16);
        assert_eq!(image.access(32, 15).unwrap().to_string(), "011");

        // Block 7 lives in slot 1 together with blocks 5..=9.
        image.edit_access_bit(32, 7, 2, '1').unwrap();
        for b in 0..16 {
            let expected = match b {
                5..=9 => "101",
                15 => "011",
                _ => "100",
            };
            assert_eq!(image.access(32, b).unwrap().to_string(), expected, "block {b}");
        }
    }
}
