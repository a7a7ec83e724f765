// Self-play weight tuning: plays each of a handful of `RewardParams`
// variations against a baseline and reports which nudges won more games.
// The only place in this crate that reaches for `rand` — `best_move`
// itself must stay deterministic, so randomness only ever picks *which*
// variations to try, never which move to play.
//
// No `clap` here: unlike the puzzle harness this tool has only two optional
// flags, so it keeps the teacher's hand-rolled `std::env::args` style.

use anyhow::{Context, Result};
use chess::evaluation::RewardParams;
use chess::piece::Colour;
use chess::position::Position;
use chess::rules::{is_checkmate, is_stalemate};
use chess::search::best_move;
use rand::Rng;

const MAX_MOVES: u32 = 150;
const GAMES_PER_MATCHUP: usize = 6;
const TUNE_DEPTH: u32 = 1;

#[derive(Debug)]
struct MatchResult {
    a_wins: u32,
    b_wins: u32,
    draws: u32,
}

fn play_game(white: &RewardParams, black: &RewardParams) -> &'static str {
    let mut position = Position::default();
    let mut side = Colour::White;

    for _ in 0..MAX_MOVES {
        if is_checkmate(&position, side) {
            return if side == Colour::White { "black" } else { "white" };
        }
        if is_stalemate(&position, side)
            || position.halfmove_clock >= 100
            || position.count_repetitions() >= 3
        {
            return "draw";
        }
        let params = if side == Colour::White { white } else { black };
        match best_move(&position, side, TUNE_DEPTH, params) {
            Some(mv) => {
                chess::rules::apply_move(&mut position, &mv);
                side = side.opposite();
            }
            None => return "draw",
        }
    }
    "draw"
}

fn run_matchup(label: &str, variant: &RewardParams, baseline: &RewardParams) -> MatchResult {
    let mut result = MatchResult {
        a_wins: 0,
        b_wins: 0,
        draws: 0,
    };
    let half = GAMES_PER_MATCHUP / 2;

    for _ in 0..half {
        match play_game(variant, baseline) {
            "white" => result.a_wins += 1,
            "black" => result.b_wins += 1,
            _ => result.draws += 1,
        }
    }
    for _ in 0..half {
        match play_game(baseline, variant) {
            "white" => result.b_wins += 1,
            "black" => result.a_wins += 1,
            _ => result.draws += 1,
        }
    }

    println!(
        "  {label} vs baseline: variant wins {}, baseline wins {}, draws {} (out of {GAMES_PER_MATCHUP})",
        result.a_wins, result.b_wins, result.draws
    );
    result
}

fn jittered(base: f64, rng: &mut impl Rng) -> f64 {
    let factor = rng.gen_range(0.5..1.5);
    base * factor
}

struct CliArgs {
    params_path: Option<String>,
    save_path: Option<String>,
}

fn parse_args() -> CliArgs {
    let mut params_path = None;
    let mut save_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--params" => params_path = args.next(),
            "--save-params" => save_path = args.next(),
            other => eprintln!("ignoring unrecognised argument: {other}"),
        }
    }
    CliArgs {
        params_path,
        save_path,
    }
}

fn load_baseline(path: &str) -> Result<RewardParams> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read params file {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse params file {path}"))
}

fn main() -> Result<()> {
    let cli = parse_args();
    let baseline = match &cli.params_path {
        Some(path) => load_baseline(path)?,
        None => RewardParams::default(),
    };
    let mut rng = rand::thread_rng();

    println!("=== Evaluator weight tuning (self-play) ===");
    println!(
        "Games per matchup: {GAMES_PER_MATCHUP}, max moves per game: {MAX_MOVES}, depth: {TUNE_DEPTH}\n"
    );

    let variations: Vec<(&str, RewardParams)> = vec![
        ("centre_pawn_bonus", {
            let mut p = baseline.clone();
            p.centre_pawn_bonus = jittered(baseline.centre_pawn_bonus, &mut rng);
            p
        }),
        ("slider_mobility_per_square", {
            let mut p = baseline.clone();
            p.slider_mobility_per_square = jittered(baseline.slider_mobility_per_square, &mut rng);
            p
        }),
        ("king_adjacent_attack_bonus", {
            let mut p = baseline.clone();
            p.king_adjacent_attack_bonus = jittered(baseline.king_adjacent_attack_bonus, &mut rng);
            p
        }),
        ("pawn_promotion_delayed_weight", {
            let mut p = baseline.clone();
            p.pawn_promotion_delayed_weight =
                jittered(baseline.pawn_promotion_delayed_weight, &mut rng);
            p
        }),
        ("knight_edge_penalty", {
            let mut p = baseline.clone();
            p.knight_edge_penalty = jittered(baseline.knight_edge_penalty, &mut rng);
            p
        }),
    ];

    println!("--- Each variation vs baseline ---\n");
    let mut scores: Vec<(&str, i32)> = Vec::new();
    for (label, variant) in &variations {
        let result = run_matchup(label, variant, &baseline);
        scores.push((label, result.a_wins as i32 - result.b_wins as i32));
    }

    scores.sort_by_key(|b| std::cmp::Reverse(b.1));
    println!("\n--- Rankings (net wins vs baseline) ---\n");
    for (label, net) in &scores {
        let indicator = if *net > 0 { "+" } else if *net < 0 { "" } else { " " };
        println!("  {indicator}{net:>3}  {label}");
    }

    if let Some(path) = &cli.save_path {
        let (winner_label, _) = scores[0];
        let winner = &variations
            .iter()
            .find(|(label, _)| *label == winner_label)
            .expect("winner label came from variations")
            .1;
        let text = serde_json::to_string_pretty(winner)?;
        std::fs::write(path, text).with_context(|| format!("failed to write params file {path}"))?;
        println!("\nSaved winning variant ({winner_label}) to {path}");
    }

    Ok(())
}
