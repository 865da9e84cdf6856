//! Flat row addressing over the sector/block hierarchy.
//!
//! A presentation layer lists blocks one per row. [`AddressingMap`] gives it
//! the `(sector, block)` behind every row and tells it which rule to apply
//! when rendering: manufacturer fields, trailer keys and access bytes, or
//! plain data.

use super::geometry::CardGeometry;

/// What a block holds, by position alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Sector 0, block 0: UID, BCC, SAK, ATQA and manufacturer data.
    Manufacturer,
    /// Ordinary data (or value) block.
    Data,
    /// Last block of a sector: Key A, access bytes, Key B.
    SectorTrailer,
}

impl BlockKind {
    /// Classify block `block` of `sector`, which holds `blocks_in_sector`
    /// blocks.
    pub fn classify(sector: usize, block: usize, blocks_in_sector: usize) -> Self {
        if block + 1 == blocks_in_sector {
            Self::SectorTrailer
        } else if sector == 0 && block == 0 {
            Self::Manufacturer
        } else {
            Self::Data
        }
    }
}

/// One addressable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    /// Sector index.
    pub sector: usize,
    /// Block index within the sector.
    pub block: usize,
    /// Block index counted from the start of the dump.
    pub absolute: usize,
    /// Content classification.
    pub kind: BlockKind,
}

/// Ordered rows for every block of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressingMap {
    rows: Vec<Row>,
}

impl AddressingMap {
    /// Build the map for `geometry`.
    pub fn new(geometry: CardGeometry) -> Self {
        let mut rows = Vec::with_capacity(geometry.total_blocks());
        for sector in 0..geometry.sector_count() {
            let count = geometry.blocks_in_sector(sector);
            let first = geometry.first_block_of_sector(sector);
            rows.extend((0..count).map(|block| Row {
                sector,
                block,
                absolute: first + block,
                kind: BlockKind::classify(sector, block, count),
            }));
        }
        Self { rows }
    }

    /// All rows in dump order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Iterate over all rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Row for an absolute block index.
    pub fn get(&self, absolute: usize) -> Option<&Row> {
        self.rows.get(absolute)
    }

    /// Absolute index of `(sector, block)`, if it exists.
    pub fn position(&self, sector: usize, block: usize) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.sector == sector && r.block == block)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false` for a parsed card.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
