// =============================================================================
// Evaluator — a static scoring function over a `Position`, parameterised by
// `RewardParams` so the weights can be tuned (see `bin/tune.rs`) without
// touching this module.
//
// The score is always from White's perspective: positive favours White,
// negative favours Black. The search kernel negates it per side to move.
// =============================================================================

use std::collections::HashSet;

use crate::board::{is_in_endgame, Board};
use crate::piece::{Colour, Piece, PieceKind};
use crate::position::Position;
use crate::rules::is_stalemate;
use serde::{Deserialize, Serialize};

pub type Pst = [[f64; 8]; 8];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardParams {
    pub pawn_value: f64,
    pub knight_value: f64,
    pub bishop_value: f64,
    pub rook_value: f64,
    pub queen_value: f64,
    pub king_value: f64,

    pub pst_pawn: Pst,
    pub pst_knight: Pst,
    pub pst_bishop: Pst,
    pub pst_rook: Pst,
    pub pst_queen: Pst,
    pub pst_king_middlegame: Pst,
    pub pst_king_endgame: Pst,
    /// Per-kind multiplier applied on top of the raw table value, indexed by
    /// `PieceKind::index()`.
    pub pst_scale: [f64; 6],
    pub global_position_table_scale: f64,

    pub development_bonus: f64,
    pub castling_bonus: f64,
    pub king_hasmoved_penalty: f64,
    pub king_center_exposure_penalty: f64,
    pub king_adjacent_attack_bonus: f64,

    pub centre_pawn_bonus: f64,
    pub undefended_centre_pawn_penalty: f64,
    pub pawn_promotion_immediate_distance: usize,
    pub pawn_promotion_immediate_weight: f64,
    pub pawn_promotion_delayed_distance: usize,
    pub pawn_promotion_delayed_weight: f64,

    pub knight_backstop_penalty: f64,
    pub knight_edge_penalty: f64,

    pub slider_mobility_per_square: f64,

    pub check_bonus_black: f64,
    pub check_penalty_white: f64,
    pub stalemate_white_penalty: f64,
    pub stalemate_black_penalty: f64,

    pub static_futility_prune_margin: f64,
}

fn generate_pst<F: Fn(usize, usize) -> f64>(f: F) -> Pst {
    let mut table = [[0.0; 8]; 8];
    for (file, column) in table.iter_mut().enumerate() {
        for (rank, cell) in column.iter_mut().enumerate() {
            *cell = f(file, rank);
        }
    }
    table
}

fn centrality(file: usize, rank: usize) -> f64 {
    let fc = (file as f64 - 3.5).abs();
    let rc = (rank as f64 - 3.5).abs();
    3.5 - fc.max(rc)
}

impl Default for RewardParams {
    fn default() -> Self {
        RewardParams {
            pawn_value: 100.0,
            knight_value: 320.0,
            bishop_value: 330.0,
            rook_value: 500.0,
            queen_value: 900.0,
            king_value: 0.0,

            pst_pawn: generate_pst(|_file, rank| rank as f64 * 4.0),
            pst_knight: generate_pst(|file, rank| centrality(file, rank) * 4.0),
            pst_bishop: generate_pst(|file, rank| centrality(file, rank) * 2.5),
            pst_rook: generate_pst(|_file, rank| if rank == 6 { 10.0 } else { 0.0 }),
            pst_queen: generate_pst(|file, rank| centrality(file, rank) * 1.5),
            pst_king_middlegame: generate_pst(|file, rank| -centrality(file, rank) * 6.0 - rank as f64 * 2.0),
            pst_king_endgame: generate_pst(|file, rank| centrality(file, rank) * 6.0),
            pst_scale: [1.0; 6],
            global_position_table_scale: 1.0,

            development_bonus: 6.0,
            castling_bonus: 40.0,
            king_hasmoved_penalty: 15.0,
            king_center_exposure_penalty: 20.0,
            king_adjacent_attack_bonus: 8.0,

            centre_pawn_bonus: 15.0,
            undefended_centre_pawn_penalty: 10.0,
            pawn_promotion_immediate_distance: 1,
            pawn_promotion_immediate_weight: 120.0,
            pawn_promotion_delayed_distance: 3,
            pawn_promotion_delayed_weight: 25.0,

            knight_backstop_penalty: 12.0,
            knight_edge_penalty: 8.0,

            slider_mobility_per_square: 3.0,

            check_bonus_black: 18.0,
            check_penalty_white: 18.0,
            stalemate_white_penalty: 0.0,
            stalemate_black_penalty: 0.0,

            static_futility_prune_margin: 150.0,
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

fn piece_value(kind: PieceKind, params: &RewardParams) -> f64 {
    match kind {
        PieceKind::Pawn => params.pawn_value,
        PieceKind::Knight => params.knight_value,
        PieceKind::Bishop => params.bishop_value,
        PieceKind::Rook => params.rook_value,
        PieceKind::Queen => params.queen_value,
        PieceKind::King => params.king_value,
    }
}

fn pst_value(
    kind: PieceKind,
    colour: Colour,
    file: usize,
    rank: usize,
    endgame: bool,
    params: &RewardParams,
) -> f64 {
    let table = match kind {
        PieceKind::Pawn => &params.pst_pawn,
        PieceKind::Knight => &params.pst_knight,
        PieceKind::Bishop => &params.pst_bishop,
        PieceKind::Rook => &params.pst_rook,
        PieceKind::Queen => &params.pst_queen,
        PieceKind::King if endgame => &params.pst_king_endgame,
        PieceKind::King => &params.pst_king_middlegame,
    };
    // Tables are authored from White's perspective; Black reads the mirrored
    // rank.
    let effective_rank = if colour == Colour::White { rank } else { 7 - rank };
    table[file][effective_rank] * params.pst_scale[kind.index()]
}

const CENTRE_SQUARES: [(usize, usize); 4] = [(3, 3), (3, 4), (4, 3), (4, 4)];

/// Squares threatened by pawns and sliders, kept per side. Populated while
/// scoring those pieces, consumed afterwards by king safety — knight and
/// king attacks deliberately don't feed it, matching the narrower "attack
/// map" this evaluator's king-safety term is defined over.
#[derive(Default)]
struct AttackMaps {
    white: HashSet<(usize, usize)>,
    black: HashSet<(usize, usize)>,
}

impl AttackMaps {
    fn for_colour(&mut self, colour: Colour) -> &mut HashSet<(usize, usize)> {
        match colour {
            Colour::White => &mut self.white,
            Colour::Black => &mut self.black,
        }
    }

    fn attacking(&self, colour: Colour) -> &HashSet<(usize, usize)> {
        match colour {
            Colour::White => &self.white,
            Colour::Black => &self.black,
        }
    }
}

fn eval_pawn(
    board: &Board,
    file: usize,
    rank: usize,
    colour: Colour,
    params: &RewardParams,
    attacks: &mut AttackMaps,
) -> f64 {
    let sign = signed(colour);
    let mut score = 0.0;

    if CENTRE_SQUARES.contains(&(file, rank)) {
        score += sign * params.centre_pawn_bonus;

        let behind_rank = if colour == Colour::White {
            rank.checked_sub(1)
        } else {
            Some(rank + 1)
        };
        let defended = behind_rank.is_some_and(|br| {
            [-1i32, 1].iter().any(|df| {
                let f = file as i32 + df;
                Board::in_bounds(br as i32, f)
                    && board
                        .piece_at(f as usize, br)
                        .is_some_and(|p| p.colour == colour && p.kind == PieceKind::Pawn)
            })
        });
        if !defended {
            score -= sign * params.undefended_centre_pawn_penalty;
        }
    }

    let distance_to_promotion = if colour == Colour::White {
        7 - rank
    } else {
        rank
    };
    if distance_to_promotion <= params.pawn_promotion_immediate_distance {
        score += sign * params.pawn_promotion_immediate_weight;
    } else if distance_to_promotion <= params.pawn_promotion_delayed_distance {
        score += sign * params.pawn_promotion_delayed_weight;
    }

    let own_attacks = attacks.for_colour(colour);
    let forward: i32 = if colour == Colour::White { 1 } else { -1 };
    for df in [-1i32, 1] {
        let f = file as i32 + df;
        let r = rank as i32 + forward;
        if Board::in_bounds(r, f) {
            own_attacks.insert((f as usize, r as usize));
        }
    }

    score
}

fn eval_knight_placement(file: usize, rank: usize, colour: Colour, params: &RewardParams) -> f64 {
    let sign = signed(colour);
    let mut score = 0.0;
    let home_rank = if colour == Colour::White { 0 } else { 7 };
    if rank == home_rank && (2..=5).contains(&file) {
        score -= sign * params.knight_backstop_penalty;
    }
    if file == 0 || file == 7 {
        score -= sign * params.knight_edge_penalty;
    }
    score
}

const SLIDER_DIRECTIONS_BISHOP: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const SLIDER_DIRECTIONS_ROOK: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const SLIDER_DIRECTIONS_QUEEN: [(i32, i32); 8] = [
    (1, 1), (1, -1), (-1, 1), (-1, -1),
    (0, 1), (0, -1), (1, 0), (-1, 0),
];

fn eval_slider_mobility(
    board: &Board,
    file: usize,
    rank: usize,
    kind: PieceKind,
    colour: Colour,
    params: &RewardParams,
    attacks: &mut AttackMaps,
) -> f64 {
    let directions: &[(i32, i32)] = match kind {
        PieceKind::Bishop => &SLIDER_DIRECTIONS_BISHOP,
        PieceKind::Rook => &SLIDER_DIRECTIONS_ROOK,
        PieceKind::Queen => &SLIDER_DIRECTIONS_QUEEN,
        _ => return 0.0,
    };
    let attacks = attacks.for_colour(colour);

    let mut mobility = 0;
    for (df, dr) in directions {
        let mut f = file as i32 + df;
        let mut r = rank as i32 + dr;
        while Board::in_bounds(r, f) {
            attacks.insert((f as usize, r as usize));
            if board.piece_at(f as usize, r as usize).is_some() {
                break;
            }
            mobility += 1;
            f += df;
            r += dr;
        }
    }

    signed(colour) * mobility as f64 * params.slider_mobility_per_square
}

fn eval_king_development(piece: Piece, params: &RewardParams) -> f64 {
    if piece.has_moved {
        -signed(piece.colour) * params.development_bonus
    } else {
        0.0
    }
}

fn eval_king_safety(board: &Board, params: &RewardParams, attacks: &AttackMaps) -> f64 {
    let mut score = 0.0;
    for &colour in &[Colour::White, Colour::Black] {
        let sign = signed(colour);
        if let Some((file, rank)) = board.find_king(colour) {
            if let Some(king) = board.piece_at(file, rank) {
                if king.has_moved {
                    let home_rank = if colour == Colour::White { 0 } else { 7 };
                    if rank == home_rank && (file == 6 || file == 2) {
                        score += sign * params.castling_bonus;
                    } else {
                        score -= sign * params.king_hasmoved_penalty;
                    }
                }
            }
            if (3..=4).contains(&file) && (2..=5).contains(&rank) {
                score -= sign * params.king_center_exposure_penalty;
            }

            let opponent_attacks = attacks.attacking(colour.opposite());
            let mut attacked_neighbours = 0;
            for df in -1i32..=1 {
                for dr in -1i32..=1 {
                    if df == 0 && dr == 0 {
                        continue;
                    }
                    let f = file as i32 + df;
                    let r = rank as i32 + dr;
                    if Board::in_bounds(r, f) && opponent_attacks.contains(&(f as usize, r as usize)) {
                        attacked_neighbours += 1;
                    }
                }
            }
            score -= sign * attacked_neighbours as f64 * params.king_adjacent_attack_bonus;
        }
    }
    score
}

fn global_position_bonus(board: &Board) -> f64 {
    let mut score = 0.0;
    for &(file, rank) in &CENTRE_SQUARES {
        if let Some(p) = board.piece_at(file, rank) {
            score += signed(p.colour);
        }
    }
    score
}

fn eval_terminal_adjustments(position: &Position, params: &RewardParams) -> f64 {
    let board = &position.board;
    let mut score = 0.0;
    if board.is_in_check(Colour::Black) {
        score += params.check_bonus_black;
    }
    if board.is_in_check(Colour::White) {
        score -= params.check_penalty_white;
    }
    score
}

/// Static evaluation of `position`, always from White's perspective.
pub fn evaluate(position: &Position, params: &RewardParams) -> f64 {
    let board = &position.board;
    let endgame = is_in_endgame(board);
    let mut score = params.global_position_table_scale * global_position_bonus(board);
    let mut attacks = AttackMaps::default();

    for rank in 0..8usize {
        for file in 0..8usize {
            let Some(piece) = board.squares[rank][file] else {
                continue;
            };
            let sign = signed(piece.colour);

            score += sign * piece_value(piece.kind, params);
            score += sign * pst_value(piece.kind, piece.colour, file, rank, endgame, params);

            match piece.kind {
                PieceKind::Pawn => {
                    score += eval_pawn(board, file, rank, piece.colour, params, &mut attacks);
                }
                PieceKind::Knight => {
                    score += eval_knight_placement(file, rank, piece.colour, params);
                }
                PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                    score += eval_slider_mobility(
                        board,
                        file,
                        rank,
                        piece.kind,
                        piece.colour,
                        params,
                        &mut attacks,
                    );
                }
                PieceKind::King => {
                    score += eval_king_development(piece, params);
                }
            }
        }
    }

    score += eval_king_safety(board, params, &attacks);
    score += eval_terminal_adjustments(position, params);

    // The search kernel handles checkmate/stalemate/repetition/50-move as
    // terminal tests before ever reaching a leaf evaluation. This clamp only
    // matters when `evaluate` is called directly at the search horizon,
    // where a stalemated side's material lead would otherwise look real.
    if is_stalemate(position, Colour::White) && score > params.stalemate_white_penalty {
        score = params.stalemate_white_penalty;
    }
    if is_stalemate(position, Colour::Black) && score < params.stalemate_black_penalty {
        score = params.stalemate_black_penalty;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn starting_position_is_symmetric() {
        let params = RewardParams::default();
        let position = Position::default();
        assert_eq!(evaluate(&position, &params), 0.0);
    }

    #[test]
    fn extra_queen_favours_white() {
        let params = RewardParams::default();
        let mut board = Board::empty();
        board.squares[0][4] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[7][4] = Some(Piece::new(PieceKind::King, Colour::Black));
        board.squares[3][3] = Some(Piece::new(PieceKind::Queen, Colour::White));
        let position = Position::new(board);
        assert!(evaluate(&position, &params) > 0.0);
    }

    #[test]
    fn advanced_pawn_near_promotion_is_valued_highly() {
        let params = RewardParams::default();
        let mut board = Board::empty();
        board.squares[0][4] = Some(Piece::new(PieceKind::King, Colour::White));
        board.squares[7][4] = Some(Piece::new(PieceKind::King, Colour::Black));
        board.squares[6][0] = Some(Piece::new(PieceKind::Pawn, Colour::White));
        let position = Position::new(board);
        let score = evaluate(&position, &params);
        assert!(score > params.pawn_value);
    }
}
