// =============================================================================
// Puzzle harness — scores the engine over a Lichess-style puzzle corpus,
// spreading the work over a fixed worker pool.
//
// Grounded in the teacher's threading shape (a long-lived worker owning its
// own state and reporting progress out-of-band), adapted from that file's
// `mpsc` command channel to a simpler work-stealing cursor: puzzles are
// run-to-completion with no inbound commands, so there is nothing for a
// channel to carry that an atomic counter doesn't already give us.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::Deserialize;

use crate::board::Board;
use crate::evaluation::RewardParams;
use crate::moves::Move;
use crate::piece::{Colour, Piece, PieceKind};
use crate::position::Position;
use crate::rules::{is_checkmate, try_execute_uci};
use crate::search::best_move;

#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleRecord {
    #[serde(rename = "PuzzleId")]
    pub puzzle_id: String,
    #[serde(rename = "FEN")]
    pub fen: String,
    #[serde(rename = "Moves")]
    pub moves: String,
    #[serde(rename = "Rating")]
    pub rating: Option<u32>,
    #[serde(rename = "RatingDeviation")]
    pub rating_deviation: Option<u32>,
    #[serde(rename = "Popularity")]
    pub popularity: Option<i32>,
    #[serde(rename = "NbPlays")]
    pub nb_plays: Option<u32>,
    #[serde(rename = "Themes")]
    pub themes: Option<String>,
    #[serde(rename = "GameUrl")]
    pub game_url: Option<String>,
    #[serde(rename = "OpeningTags")]
    pub opening_tags: Option<String>,
}

/// Read puzzle records from a CSV file in the Lichess puzzle export shape.
/// Unparseable rows are skipped rather than failing the whole read, since a
/// puzzle corpus is a bulk artifact and one malformed line shouldn't sink
/// the rest of it.
pub fn read_puzzles(path: &str) -> anyhow::Result<Vec<PuzzleRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize::<PuzzleRecord>().flatten() {
        records.push(record);
    }
    Ok(records)
}

/// Decode the piece-placement and active-colour FEN fields only, per this
/// project's external-interface contract; castling/en-passant/clock fields
/// are ignored.
pub fn decode_fen(fen: &str) -> Option<(Board, Colour)> {
    let mut fields = fen.split_whitespace();
    let placement = fields.next()?;
    let active_colour = fields.next().unwrap_or("w");

    let mut board = Board::empty();
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return None;
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top;
        let mut file = 0usize;
        for ch in rank_str.chars() {
            if file >= 8 {
                return None;
            }
            if let Some(skip) = ch.to_digit(10) {
                file += skip as usize;
                continue;
            }
            let colour = if ch.is_uppercase() {
                Colour::White
            } else {
                Colour::Black
            };
            let kind = match ch.to_ascii_lowercase() {
                'p' => PieceKind::Pawn,
                'n' => PieceKind::Knight,
                'b' => PieceKind::Bishop,
                'r' => PieceKind::Rook,
                'q' => PieceKind::Queen,
                'k' => PieceKind::King,
                _ => return None,
            };
            board.squares[rank][file] = Some(Piece::new(kind, colour));
            file += 1;
        }
        if file != 8 {
            return None;
        }
    }

    let colour = match active_colour {
        "w" | "W" => Colour::White,
        "b" | "B" => Colour::Black,
        _ => return None,
    };
    Some((board, colour))
}

/// Run the per-puzzle protocol against one record, searching to
/// `search_depth` plies.
pub fn solve_puzzle(record: &PuzzleRecord, search_depth: u32, params: &RewardParams) -> bool {
    let Some((board, mut side_to_move)) = decode_fen(&record.fen) else {
        return false;
    };
    let mut position = Position::new(board);

    let mut tokens = record.moves.split_whitespace();

    let Some(setup) = tokens.next() else {
        return false;
    };
    if !try_execute_uci(&mut position, setup) {
        return false;
    }
    side_to_move = side_to_move.opposite();

    loop {
        let Some(expected_token) = tokens.next() else {
            return true;
        };
        let expected = match Move::from_uci(expected_token) {
            Some(mv) => mv,
            None => return false,
        };

        let Some(engine_move) = best_move(&position, side_to_move, search_depth, params) else {
            return false;
        };

        if engine_move == expected {
            crate::rules::apply_move(&mut position, &engine_move);
        } else {
            let mut candidate = position.clone();
            crate::rules::apply_move(&mut candidate, &engine_move);
            if is_checkmate(&candidate, side_to_move.opposite()) {
                return true;
            }
            return false;
        }
        side_to_move = side_to_move.opposite();

        match tokens.next() {
            None => return true,
            Some(reply) => {
                if !try_execute_uci(&mut position, reply) {
                    return false;
                }
                side_to_move = side_to_move.opposite();
            }
        }
    }
}

/// Score `puzzles` (the first `count`, or all of them if `count` is 0) over
/// a fixed pool of `threads` workers, invoking `progress` every few
/// completions with `(completed, total, passes_so_far)`. Returns the number
/// of puzzles passed.
pub fn test_puzzles(
    puzzles: &[PuzzleRecord],
    search_depth: u32,
    count: usize,
    threads: usize,
    params: &RewardParams,
    progress: impl Fn(usize, usize, usize) + Sync,
) -> usize {
    let total = if count == 0 {
        puzzles.len()
    } else {
        count.min(puzzles.len())
    };
    let puzzles = &puzzles[..total];

    let next_index = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);
    let passes = AtomicUsize::new(0);
    let results = Mutex::new(vec![false; total]);

    const PROGRESS_INTERVAL: usize = 5;

    std::thread::scope(|scope| {
        for _ in 0..threads.max(1) {
            scope.spawn(|| loop {
                let i = next_index.fetch_add(1, Ordering::SeqCst);
                if i >= total {
                    break;
                }
                let passed = solve_puzzle(&puzzles[i], search_depth, params);
                {
                    let mut results = results.lock().unwrap();
                    results[i] = passed;
                }
                if passed {
                    passes.fetch_add(1, Ordering::SeqCst);
                }
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if done.is_multiple_of(PROGRESS_INTERVAL) || done == total {
                    progress(done, total, passes.load(Ordering::SeqCst));
                }
            });
        }
    });

    passes.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_starting_position_fen() {
        let (board, colour) =
            decode_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(board, Board::starting_position());
        assert_eq!(colour, Colour::White);
    }

    #[test]
    fn decode_fen_rejects_malformed_placement() {
        assert!(decode_fen("not-a-fen w - - 0 1").is_none());
    }

    #[test]
    fn solves_a_one_move_mating_puzzle() {
        // Black shuffles a spare pawn, then White mates with Qa1-a7#.
        let record = PuzzleRecord {
            puzzle_id: "t1".into(),
            fen: "k7/7p/1K6/8/8/8/8/Q7 b - - 0 1".into(),
            moves: "h7h6 a1a7".into(),
            rating: None,
            rating_deviation: None,
            popularity: None,
            nb_plays: None,
            themes: None,
            game_url: None,
            opening_tags: None,
        };
        let params = RewardParams::default();
        assert!(solve_puzzle(&record, 2, &params));
    }

    #[test]
    fn pool_scores_every_puzzle_exactly_once() {
        let record = PuzzleRecord {
            puzzle_id: "t1".into(),
            fen: "k7/7p/1K6/8/8/8/8/Q7 b - - 0 1".into(),
            moves: "h7h6 a1a7".into(),
            rating: None,
            rating_deviation: None,
            popularity: None,
            nb_plays: None,
            themes: None,
            game_url: None,
            opening_tags: None,
        };
        let puzzles = vec![record; 9];
        let params = RewardParams::default();
        let passes = test_puzzles(&puzzles, 2, 0, 4, &params, |_, _, _| {});
        assert_eq!(passes, 9);
    }
}
