use anyhow::{Context, Result};
use clap::Parser;

use chess::evaluation::RewardParams;
use chess::puzzle::{read_puzzles, test_puzzles};

/// Score the engine against a puzzle corpus.
#[derive(Parser, Debug)]
struct Args {
    /// CSV file of puzzle records.
    #[arg(long)]
    file: String,

    /// Search depth in plies.
    #[arg(long, default_value_t = 3)]
    depth: u32,

    /// Number of puzzles to run (0 = all).
    #[arg(long, default_value_t = 0)]
    count: usize,

    /// Worker thread count.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Load a tuned RewardParams set from this JSON file instead of using
    /// the defaults.
    #[arg(long)]
    params: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let puzzles = read_puzzles(&args.file)
        .with_context(|| format!("failed to read puzzle file {}", args.file))?;
    let params = match &args.params {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read params file {path}"))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse params file {path}"))?
        }
        None => RewardParams::default(),
    };

    let total = if args.count == 0 {
        puzzles.len()
    } else {
        args.count.min(puzzles.len())
    };
    println!("Running {total} puzzles at depth {} across {} threads", args.depth, args.threads);

    let passes = test_puzzles(
        &puzzles,
        args.depth,
        args.count,
        args.threads,
        &params,
        |done, total, passes_so_far| {
            println!("  {done}/{total} complete, {passes_so_far} passed so far");
        },
    );

    println!("\nFinal: {passes}/{total} puzzles passed");
    Ok(())
}
