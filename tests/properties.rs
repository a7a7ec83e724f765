// Property tests for the universally-quantified invariants: every concrete
// scenario instead lives as an inline #[cfg(test)] unit test next to the
// code it exercises.

use proptest::prelude::*;

use chess::board::Board;
use chess::evaluation::{evaluate, RewardParams};
use chess::piece::{Colour, Piece, PieceKind};
use chess::position::Position;
use chess::rules::{generate_moves, is_checkmate, is_stalemate};
use chess::search::search_best_sequence;

fn is_in_check(position: &Position, colour: Colour) -> bool {
    position.board.is_in_check(colour)
}

/// Walk up to `steps.len()` random legal moves from the starting position,
/// picking at each ply whichever move the next byte indexes into. Stops
/// early if the side to move has no legal moves.
fn walk_random_position(steps: &[u8]) -> (Position, Colour) {
    let mut position = Position::default();
    let mut colour = Colour::White;
    for &step in steps {
        let moves = generate_moves(&position, colour);
        if moves.is_empty() {
            break;
        }
        let mv = moves[step as usize % moves.len()];
        chess::rules::apply_move(&mut position, &mv);
        colour = colour.opposite();
    }
    (position, colour)
}

proptest! {
    #[test]
    fn every_generated_move_leaves_mover_not_in_check(steps in prop::collection::vec(any::<u8>(), 0..8)) {
        let (position, colour) = walk_random_position(&steps);
        for mv in generate_moves(&position, colour) {
            let mut after = position.clone();
            chess::rules::apply_move(&mut after, &mv);
            prop_assert!(!is_in_check(&after, colour));
        }
    }

    #[test]
    fn checkmate_implies_check_and_no_moves(steps in prop::collection::vec(any::<u8>(), 0..8)) {
        let (position, colour) = walk_random_position(&steps);
        if is_checkmate(&position, colour) {
            prop_assert!(is_in_check(&position, colour));
            prop_assert!(generate_moves(&position, colour).is_empty());
        }
    }

    #[test]
    fn stalemate_implies_no_check_and_no_moves(steps in prop::collection::vec(any::<u8>(), 0..8)) {
        let (position, colour) = walk_random_position(&steps);
        if is_stalemate(&position, colour) {
            prop_assert!(!is_in_check(&position, colour));
            prop_assert!(generate_moves(&position, colour).is_empty());
        }
    }

    #[test]
    fn mirrored_lone_kings_evaluate_to_zero(file in 0usize..8, rank in 0usize..8) {
        // Mirroring the black king across the rank axis makes the position
        // a true reflection: every positional term the evaluator applies
        // to one king has an equal-and-opposite counterpart on the other.
        let mut board = Board::empty();
        board.squares[rank][file] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[7 - rank][file] = Some(Piece::new(PieceKind::King, Colour::Black));
        let position = Position::new(board);
        let params = RewardParams::default();
        prop_assert_eq!(evaluate(&position, &params), 0.0);
    }

    #[test]
    fn best_move_score_is_deterministic(steps in prop::collection::vec(any::<u8>(), 0..8)) {
        let (position, colour) = walk_random_position(&steps);
        let params = RewardParams::default();
        let first = search_best_sequence(&position, colour, 2, &params);
        let second = search_best_sequence(&position, colour, 2, &params);
        prop_assert_eq!(first.score, second.score);
    }
}
