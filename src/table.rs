//! Plain-text table of a card image.
//!
//! ```text
//! | Sector | Block |               Data               | Access | ! | Access bits help ...
//! ```
//!
//! One row per block, with the sector number printed on the third row of
//! each sector and a separator line between sectors. Blocks that fail the
//! value-block check carry a `!` in their own column; corrupt access
//! conditions show as `ERR` with an empty help column.

use crate::card::CardImage;
use crate::codec::value::BlockStatus;
use crate::permissions;

const HELP_WIDTH: usize = 61;

fn line(sector: &str, block: &str, data: &str, access: &str, flag: &str, help: &str) -> String {
    format!(
        "|{sector:^8}|{block:^7}|{data:^34}|{access:^8}|{flag:^3}| {help:<width$}|",
        width = HELP_WIDTH
    )
}

/// Column headings: the block columns plus three help-column captions
/// (data block operations, trailer parts, trailer read/write pairs).
pub fn header() -> [String; 4] {
    let data_ops = format!(
        "{:^7}|{:^7}|{:^7}|{:^7}| {}",
        "r", "w", "i", "d/t/r", "operations for data block"
    );
    let trailer_parts = format!(
        "{:^7}|{:^7}|{:^7}| {}",
        "Key A", "ACC", "Key B", "operation on part of sector trailer"
    );
    let trailer_rw = format!(
        "{:^3}|{:^3}|{:^3}|{:^3}|{:^3}|{:^3}| {}",
        "r", "w", "r", "w", "r", "w", "operation for part of sector trailer"
    );
    [
        line("Sector", "Block", "Data", "Access", "!", "Access bits help"),
        line("", "", "", "", "", &data_ops),
        line("", "", "", "", "", &trailer_parts),
        line("", "", "", "", "", &trailer_rw),
    ]
}

/// Horizontal rule as wide as a table row.
pub fn separator() -> String {
    "-".repeat(header()[0].chars().count())
}

/// Render the whole image: rule, header, rule, rows, rule.
pub fn render(image: &CardImage) -> Vec<String> {
    let rule = separator();
    let mut out = vec![rule.clone()];
    out.extend(header());
    out.push(rule.clone());

    for (i, row) in image.layout().iter().enumerate() {
        if i > 0 && row.block == 0 {
            out.push(rule.clone());
        }
        let Some(access) = image.access(row.sector, row.block) else {
            continue;
        };
        let status = image.status(row.sector, row.block).unwrap_or_default();
        let data = image.block_hex(row.sector, row.block).unwrap_or_default();
        let sector = if row.block == 2 {
            row.sector.to_string()
        } else {
            String::new()
        };
        let flag = if status == BlockStatus::Warning { "!" } else { "" };
        out.push(line(
            &sector,
            &row.absolute.to_string(),
            &data,
            &access.to_string(),
            flag,
            &permissions::describe(row.kind, access),
        ));
    }

    out.push(rule);
    out
}

/// One-line summary: card type, UID, BCC state and problem counts.
pub fn summary(image: &CardImage) -> String {
    let m = image.manufacturer();
    let uid = crate::utils::to_hex(&m.uid());
    format!(
        "{} | UID {} | BCC {:02x} ({}) | {} corrupt access condition(s) | {} value block warning(s)",
        image.geometry().name(),
        uid,
        m.bcc(),
        if m.bcc_valid() { "ok" } else { "mismatch" },
        image.corrupt_conditions().count(),
        image.warnings().count(),
    )
}
