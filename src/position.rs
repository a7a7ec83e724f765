// =============================================================================
// Position — a Board plus the game-state the rules engine and search need
// beyond pure piece geometry: the last move played (for en-passant), the
// halfmove clock (for the 50-move rule), and a bounded history of prior
// boards (for threefold repetition).
//
// `side_to_move` is deliberately not stored here — every entry point that
// needs it takes the side as an explicit parameter, matching the search's
// own convention (and the data model's "lifted explicit state" principle).
// =============================================================================

use crate::board::Board;
use crate::moves::Move;

/// Oldest entries are discarded once history exceeds this many boards.
pub const MAX_HISTORY: usize = 200;

#[derive(Clone, Debug)]
pub struct Position {
    pub board: Board,
    pub last_move: Option<Move>,
    pub halfmove_clock: u32,
    pub history: Vec<Board>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(Board::starting_position())
    }
}

impl Position {
    pub fn new(board: Board) -> Self {
        let mut position = Position {
            board,
            last_move: None,
            halfmove_clock: 0,
            history: Vec::new(),
        };
        position.push_history();
        position
    }

    /// Append the current board to history, trimming the oldest entry once
    /// the bound is exceeded.
    pub fn push_history(&mut self) {
        self.history.push(self.board.clone());
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    /// How many times does the current board appear in history (including
    /// itself)? Threefold repetition is `count_repetitions(..) >= 3`.
    pub fn count_repetitions(&self) -> usize {
        self.history.iter().filter(|b| **b == self.board).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let mut position = Position::default();
        for _ in 0..(MAX_HISTORY + 50) {
            position.push_history();
        }
        assert_eq!(position.history.len(), MAX_HISTORY);
    }

    #[test]
    fn fresh_position_has_one_occurrence() {
        let position = Position::default();
        assert_eq!(position.count_repetitions(), 1);
    }
}
