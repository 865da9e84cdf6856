//! mfdedit command line
//!
//! Prints a MIFARE Classic dump as a table and applies scripted edits.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use mfdedit::{CardImage, table};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mfdedit")]
#[command(about = "Editor and viewer for MIFARE Classic card dumps")]
struct Args {
    /// Dump file (320, 1024 or 4096 bytes)
    file: PathBuf,

    /// Print the dump and exit without editing
    #[arg(short, long)]
    view: bool,

    /// Set one hex digit: SECTOR:BLOCK:NIBBLE=DIGIT (repeatable)
    #[arg(long = "hex", value_name = "S:B:N=C")]
    hex: Vec<Edit>,

    /// Set one access bit: SECTOR:BLOCK:BIT=0|1 (repeatable)
    #[arg(long = "acc", value_name = "S:B:P=V")]
    acc: Vec<Edit>,

    /// Write the result here instead of back to FILE
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// One scripted edit: three indices and a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edit {
    sector: usize,
    block: usize,
    index: usize,
    digit: char,
}

impl FromStr for Edit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, digit) = s
            .split_once('=')
            .ok_or_else(|| format!("expected S:B:N=C, got '{s}'"))?;
        let mut chars = digit.chars();
        let (Some(digit), None) = (chars.next(), chars.next()) else {
            return Err(format!("expected a single character after '=', got '{digit}'"));
        };
        let parts = address
            .split(':')
            .map(|p| p.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid index in '{address}': {e}"))?;
        let [sector, block, index] = parts[..] else {
            return Err(format!("expected three ':'-separated indices, got '{address}'"));
        };
        Ok(Self {
            sector,
            block,
            index,
            digit,
        })
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}={}", self.sector, self.block, self.index, self.digit)
    }
}

/// An edit together with the flag it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Hex(Edit),
    Acc(Edit),
}

impl Op {
    fn apply(self, image: &mut CardImage) -> anyhow::Result<()> {
        match self {
            Op::Hex(e) => image
                .edit_hex_nibble(e.sector, e.block, e.index, e.digit)
                .with_context(|| format!("--hex {e}")),
            Op::Acc(e) => image
                .edit_access_bit(e.sector, e.block, e.index, e.digit)
                .with_context(|| format!("--acc {e}")),
        }
    }
}

/// `--hex` and `--acc` edits merged back into command-line order.
fn ordered_edits(args: &Args, matches: &ArgMatches) -> Vec<Op> {
    let hex = matches
        .indices_of("hex")
        .into_iter()
        .flatten()
        .zip(args.hex.iter().copied().map(Op::Hex));
    let acc = matches
        .indices_of("acc")
        .into_iter()
        .flatten()
        .zip(args.acc.iter().copied().map(Op::Acc));
    let mut ops: Vec<(usize, Op)> = hex.chain(acc).collect();
    ops.sort_by_key(|&(index, _)| index);
    ops.into_iter().map(|(_, op)| op).collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let mut image = CardImage::open(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    if args.view {
        print(&image);
        return Ok(());
    }

    let ops = ordered_edits(&args, &matches);
    for op in &ops {
        op.apply(&mut image)?;
    }

    print(&image);

    if !image.is_dirty() && args.output.is_none() {
        return Ok(());
    }

    match &args.output {
        Some(path) => image
            .save_as(path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => image
            .save()
            .with_context(|| format!("failed to write {}", args.file.display()))?,
    }
    info!("{} edit(s) saved", ops.len());
    Ok(())
}

fn print(image: &CardImage) {
    println!("{}", table::summary(image));
    for line in table::render(image) {
        println!("{line}");
    }
}
