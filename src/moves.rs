use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::piece::PieceKind;

/// An upper bound on legal moves in any reachable chess position (the true
/// bound is 218; 224 is kept as a round, safe buffer).
pub const MAX_MOVES: usize = 224;

pub type MoveList = ArrayVec<Move, MAX_MOVES>;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Move {
    pub from_file: usize,
    pub from_rank: usize,
    pub to_file: usize,
    pub to_rank: usize,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from_file: usize, from_rank: usize, to_file: usize, to_rank: usize) -> Self {
        Move {
            from_file,
            from_rank,
            to_file,
            to_rank,
            promotion: None,
        }
    }

    /// Convert to pure coordinate ("UCI") notation, e.g. "e2e4", "a7a8q".
    pub fn to_uci(&self) -> String {
        let fc = (b'a' + self.from_file as u8) as char;
        let fr = (b'1' + self.from_rank as u8) as char;
        let tc = (b'a' + self.to_file as u8) as char;
        let tr = (b'1' + self.to_rank as u8) as char;
        let promo = match self.promotion {
            Some(PieceKind::Queen) => "q",
            Some(PieceKind::Rook) => "r",
            Some(PieceKind::Bishop) => "b",
            Some(PieceKind::Knight) => "n",
            _ => "",
        };
        format!("{fc}{fr}{tc}{tr}{promo}")
    }

    /// Parse pure coordinate notation. `None` on anything malformed —
    /// callers treat this the same as any other input-format failure.
    pub fn from_uci(s: &str) -> Option<Move> {
        let bytes = s.as_bytes();
        if bytes.len() < 4 {
            return None;
        }
        if !(b'a'..=b'h').contains(&bytes[0])
            || !(b'1'..=b'8').contains(&bytes[1])
            || !(b'a'..=b'h').contains(&bytes[2])
            || !(b'1'..=b'8').contains(&bytes[3])
        {
            return None;
        }
        let from_file = (bytes[0] - b'a') as usize;
        let from_rank = (bytes[1] - b'1') as usize;
        let to_file = (bytes[2] - b'a') as usize;
        let to_rank = (bytes[3] - b'1') as usize;
        let promotion = if bytes.len() > 4 {
            match bytes[4].to_ascii_lowercase() {
                b'q' => Some(PieceKind::Queen),
                b'r' => Some(PieceKind::Rook),
                b'b' => Some(PieceKind::Bishop),
                b'n' => Some(PieceKind::Knight),
                _ => return None,
            }
        } else {
            None
        };
        Some(Move {
            from_file,
            from_rank,
            to_file,
            to_rank,
            promotion,
        })
    }
}

/// The search's best principal variation: a sequence of moves plus the score
/// it leads to, from the root player's perspective.
#[derive(Clone, Debug)]
pub struct MoveSequence {
    pub moves: ArrayVec<Move, MAX_MOVES>,
    pub score: f64,
}

impl MoveSequence {
    pub fn leaf(score: f64) -> Self {
        MoveSequence {
            moves: ArrayVec::new(),
            score,
        }
    }

    /// A sequence consisting of a single move.
    pub fn single(mv: Move, score: f64) -> Self {
        let mut moves = ArrayVec::new();
        let _ = moves.try_push(mv);
        MoveSequence { moves, score }
    }

    /// Prepend `mv` to `child`'s sequence, truncating at `MAX_MOVES`.
    pub fn prepended(mv: Move, child: &MoveSequence, score: f64) -> Self {
        let mut moves = ArrayVec::new();
        let _ = moves.try_push(mv);
        for &m in child.moves.iter() {
            if moves.try_push(m).is_err() {
                break;
            }
        }
        MoveSequence { moves, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_roundtrip() {
        let mv = Move::from_uci("e2e4").unwrap();
        assert_eq!(mv.to_uci(), "e2e4");

        let promo = Move::from_uci("e7e8q").unwrap();
        assert_eq!(promo.promotion, Some(PieceKind::Queen));
        assert_eq!(promo.to_uci(), "e7e8q");
    }

    #[test]
    fn from_uci_rejects_malformed_input() {
        assert!(Move::from_uci("").is_none());
        assert!(Move::from_uci("z9z9").is_none());
        assert!(Move::from_uci("e2e9").is_none());
    }
}
