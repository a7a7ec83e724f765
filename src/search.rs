// =============================================================================
// Search kernel — negamax with alpha-beta pruning over the rules engine and
// evaluator. One `SearchState` per search (and, in the puzzle harness, one
// per worker thread): it owns the counters that make a run's work visible
// without reaching for shared mutable state inside the recursion itself.
// =============================================================================

use crate::board::is_in_endgame;
use crate::evaluation::{evaluate, RewardParams};
use crate::moves::{Move, MoveSequence};
use crate::piece::{Colour, PieceKind};
use crate::position::Position;
use crate::rules::{apply_move, generate_moves, is_checkmate, is_stalemate};

/// Sentinel magnitude for a forced mate. Comfortably larger than any
/// material-plus-positional score the evaluator can produce.
pub const CHECKMATE_SCORE: f64 = 1_000_000_000.0;

#[derive(Clone, Debug)]
pub struct SearchState {
    pub position: Position,
    pub current_depth: u32,
    pub evaluations: u64,
    pub tt_hits: u64,
    pub alpha_beta_prunes: u64,
    pub static_prunes: u64,
}

impl SearchState {
    pub fn new(position: Position) -> Self {
        SearchState {
            position,
            current_depth: 0,
            evaluations: 0,
            tt_hits: 0,
            alpha_beta_prunes: 0,
            static_prunes: 0,
        }
    }
}

fn signed(colour: Colour) -> f64 {
    if colour == Colour::White {
        1.0
    } else {
        -1.0
    }
}

fn evaluate_from_perspective(position: &Position, colour: Colour, params: &RewardParams) -> f64 {
    signed(colour) * evaluate(position, params)
}

fn chebyshev(a: (usize, usize), b: (usize, usize)) -> i32 {
    (a.0 as i32 - b.0 as i32).abs().max((a.1 as i32 - b.1 as i32).abs())
}

/// Depth-0 (root) endgame advancement bonus: reward a non-pawn, non-king
/// piece for stepping closer to the enemy king in an endgame, as long as its
/// destination isn't attacked by the opponent in the resulting position.
/// Non-positive reductions in distance yield 0.
fn endgame_advancement_bonus(
    position: &Position,
    child_position: &Position,
    mv: &Move,
    colour: Colour,
) -> f64 {
    if !is_in_endgame(&position.board) {
        return 0.0;
    }
    let Some(piece) = position.board.squares[mv.from_rank][mv.from_file] else {
        return 0.0;
    };
    if matches!(piece.kind, PieceKind::Pawn | PieceKind::King) {
        return 0.0;
    }
    let Some(enemy_king) = position.board.find_king(colour.opposite()) else {
        return 0.0;
    };
    if child_position
        .board
        .is_square_attacked_by(mv.to_file, mv.to_rank, colour.opposite())
    {
        return 0.0;
    }

    let distance_before = chebyshev((mv.from_file, mv.from_rank), enemy_king);
    let distance_after = chebyshev((mv.to_file, mv.to_rank), enemy_king);
    let bonus = (distance_before - distance_after) as f64 * (5.0 - distance_after as f64);
    bonus.max(0.0)
}

/// Negamax search from `position`, with `colour` to move. `max_depth` is the
/// depth the top-level driver started the search at; it never changes across
/// the recursion and identifies the root (`depth == max_depth`) for the
/// endgame advancement bonus. The returned `MoveSequence.score` is from
/// `colour`'s perspective: positive is good for the side to move at this
/// node.
#[allow(clippy::too_many_arguments)]
pub fn negamax(
    state: &mut SearchState,
    position: &Position,
    colour: Colour,
    depth: u32,
    max_depth: u32,
    alpha: f64,
    beta: f64,
    params: &RewardParams,
) -> MoveSequence {
    state.current_depth = depth;

    if is_checkmate(position, colour) {
        return MoveSequence::leaf(-CHECKMATE_SCORE);
    }
    if is_stalemate(position, colour) {
        return MoveSequence::leaf(0.0);
    }
    if position.count_repetitions() >= 3 {
        return MoveSequence::leaf(0.0);
    }
    if position.halfmove_clock >= 100 {
        return MoveSequence::leaf(0.0);
    }

    if depth == 0 {
        state.evaluations += 1;
        return MoveSequence::leaf(evaluate_from_perspective(position, colour, params));
    }

    let moves = generate_moves(position, colour);
    if moves.is_empty() {
        state.evaluations += 1;
        return MoveSequence::leaf(evaluate_from_perspective(position, colour, params));
    }

    let mut alpha = alpha;
    let mut best: Option<MoveSequence> = None;

    for mv in moves.iter() {
        let mut child_position = position.clone();
        apply_move(&mut child_position, mv);

        if let Some(current_best) = best.as_ref() {
            let static_score = evaluate_from_perspective(&child_position, colour, params);
            if static_score < current_best.score - params.static_futility_prune_margin {
                state.static_prunes += 1;
                continue;
            }
        }

        let child = negamax(
            state,
            &child_position,
            colour.opposite(),
            depth - 1,
            max_depth,
            -beta,
            -alpha,
            params,
        );
        let mut value = -child.score;

        if depth == max_depth {
            value += endgame_advancement_bonus(position, &child_position, mv, colour);
        }

        if best.as_ref().is_none_or(|b| value > b.score) {
            best = Some(MoveSequence::prepended(*mv, &child, value));
        }
        if value > alpha {
            alpha = value;
        }
        if alpha >= beta {
            state.alpha_beta_prunes += 1;
            break;
        }
    }

    best.unwrap_or_else(|| {
        let mv = moves[0];
        let mut applied = position.clone();
        apply_move(&mut applied, &mv);
        let score = evaluate_from_perspective(&applied, colour, params);
        MoveSequence::single(mv, score)
    })
}

/// Top-level driver: search `position` to `depth` plies for `colour` and
/// return the best sequence found. `moves` is non-empty as long as any
/// legal move exists for `colour`.
pub fn search_best_sequence(
    position: &Position,
    colour: Colour,
    depth: u32,
    params: &RewardParams,
) -> MoveSequence {
    let mut state = SearchState::new(position.clone());
    negamax(
        &mut state,
        position,
        colour,
        depth,
        depth,
        -CHECKMATE_SCORE * 2.0,
        CHECKMATE_SCORE * 2.0,
        params,
    )
}

/// Single-shot analysis: search `position` to `depth` plies for `colour` and
/// return only the move at the root of the best sequence found, if any
/// legal move exists.
pub fn best_move(position: &Position, colour: Colour, depth: u32, params: &RewardParams) -> Option<Move> {
    search_best_sequence(position, colour, depth, params)
        .moves
        .first()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece::{Piece, PieceKind};

    #[test]
    fn finds_mate_in_one() {
        let mut board = Board::empty();
        board.squares[5][5] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[0][6] = Some(Piece::new(PieceKind::Queen, Colour::White));
        board.squares[7][7] = Some(Piece::new(PieceKind::King, Colour::Black));
        let position = Position::new(board);
        let params = RewardParams::default();

        let mv = best_move(&position, Colour::White, 2, &params).expect("a move exists");
        let mut result = position.clone();
        apply_move(&mut result, &mv);
        assert!(is_checkmate(&result, Colour::Black));
    }

    #[test]
    fn prefers_capturing_hanging_queen() {
        let mut board = Board::empty();
        board.squares[0][4] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[7][4] = Some(Piece::new(PieceKind::King, Colour::Black));
        board.squares[0][0] = Some(Piece::new(PieceKind::Rook, Colour::White));
        board.squares[7][0] = Some(Piece::new(PieceKind::Queen, Colour::Black));
        let position = Position::new(board);
        let params = RewardParams::default();

        let mv = best_move(&position, Colour::White, 2, &params).expect("a move exists");
        assert_eq!((mv.to_file, mv.to_rank), (0, 7));
    }

    #[test]
    fn stalemate_scores_as_draw() {
        let mut board = Board::empty();
        board.squares[7][0] = Some(Piece::new(PieceKind::King, Colour::Black));
        board.squares[5][2] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[5][1] = Some(Piece::new(PieceKind::Queen, Colour::White));
        let position = Position::new(board);
        let params = RewardParams::default();
        let mut state = SearchState::new(position.clone());
        let result = negamax(
            &mut state,
            &position,
            Colour::Black,
            0,
            0,
            -CHECKMATE_SCORE,
            CHECKMATE_SCORE,
            &params,
        );
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn best_move_returns_none_without_legal_moves() {
        // Classic back-rank mate: the king's own pawns block every escape
        // square and nothing can capture or block the checking rook.
        let mut board = Board::empty();
        board.squares[0][7] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[1][5] = Some(Piece::new(PieceKind::Pawn, Colour::White));
        board.squares[1][6] = Some(Piece::new(PieceKind::Pawn, Colour::White));
        board.squares[1][7] = Some(Piece::new(PieceKind::Pawn, Colour::White));
        board.squares[0][0] = Some(Piece::new(PieceKind::Rook, Colour::Black));
        board.squares[7][0] = Some(Piece::new(PieceKind::King, Colour::Black));
        let position = Position::new(board);
        let params = RewardParams::default();
        assert!(is_checkmate(&position, Colour::White));
        assert!(best_move(&position, Colour::White, 2, &params).is_none());
    }

    #[test]
    fn search_best_sequence_reports_a_nonempty_principal_variation() {
        let position = Position::default();
        let params = RewardParams::default();
        let sequence = search_best_sequence(&position, Colour::White, 1, &params);
        assert!(!sequence.moves.is_empty());
        assert!(sequence.score.is_finite());
    }
}
