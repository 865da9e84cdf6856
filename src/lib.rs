//! **mfdedit** - viewer and editor for MIFARE Classic card dumps.
//!
//! A dump is the raw contents of a card, block after block, with no header:
//! 320 bytes (Mini), 1024 bytes (1K) or 4096 bytes (4K). This library parses
//! it into sectors and blocks, decodes the redundant fields the card relies
//! on, and applies single-nibble or single-bit edits while keeping every
//! derived field consistent.
//!
//! # Modules
//! | Module | Contents |
//! |--------|----------|
//! | [`card`]        | [`CardImage`]: parse, inspect, edit, serialize, save |
//! | [`codec`]       | Access-bit, value-block and BCC codecs (pure functions) |
//! | [`permissions`] | What each access condition allows for data blocks and trailers |
//! | [`table`]       | Plain-text table rendering of a card image |
//!
//! # Example
//! ```
//! use mfdedit::CardImage;
//!
//! let mut image = CardImage::parse(&[0u8; 1024])?;
//! image.edit_hex_nibble(0, 0, 0, 'a')?;
//! assert_eq!(image.manufacturer().bcc(), 0xa0);
//! assert_eq!(image.serialize().len(), 1024);
//! # Ok::<(), mfdedit::Error>(())
//! ```

pub mod card;
pub mod codec;
pub mod error;
pub mod permissions;
pub mod table;
pub mod utils;

pub use card::CardImage;
pub use error::{Error, Result};
