use chess::evaluation::RewardParams;
use chess::piece::Colour;
use chess::position::Position;
use chess::rules::{is_checkmate, is_stalemate};
use chess::search::best_move;

const MAX_MOVES: u32 = 150;
const DEPTH: u32 = 2;

fn main() {
    let params = RewardParams::default();
    let mut position = Position::default();
    let mut side = Colour::White;
    let mut move_count = 0;

    let result = loop {
        if is_checkmate(&position, side) {
            break format!("{:?} is checkmated", side);
        }
        if is_stalemate(&position, side) {
            break "draw by stalemate".to_string();
        }
        if position.halfmove_clock >= 100 {
            break "draw by fifty-move rule".to_string();
        }
        if position.count_repetitions() >= 3 {
            break "draw by repetition".to_string();
        }
        if move_count >= MAX_MOVES {
            break "move limit reached".to_string();
        }

        match best_move(&position, side, DEPTH, &params) {
            Some(mv) => {
                chess::rules::apply_move(&mut position, &mv);
                move_count += 1;
                side = side.opposite();
            }
            None => break "no legal move found".to_string(),
        }
    };

    eprintln!("Game over after {move_count} moves: {result}");
}
