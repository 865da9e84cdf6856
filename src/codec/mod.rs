//! Bit-level redundancy codecs used by MIFARE Classic dumps.
//!
//! Everything here is a pure function over byte arrays. The stateful side
//! (which block gets checked under which rule, when tables are rebuilt) lives
//! in [`crate::card::CardImage`].
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`access`] | Sector trailer access conditions: 3 bits per slot, stored direct and inverted |
//! | [`value`]  | Value block layout: value ×3 (one inverted), address ×4 (two inverted) |
//! | [`bcc`]    | Block check character of the manufacturer block UID |
//!
//! None of the decoders can fail. Corruption is reported in-band as
//! [`access::AccessBits::Corrupt`] or [`value::BlockStatus::Warning`], since a
//! damaged card is still a dump worth viewing and editing.

pub mod access;
pub mod bcc;
pub mod value;
