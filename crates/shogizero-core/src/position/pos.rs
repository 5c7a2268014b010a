//! 局面本体

use std::fmt;

use crate::types::{Color, Hand, Move, Piece, Square};

/// 指し手の適用に失敗したときのエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// USI表記として解釈できない
    #[error("malformed move notation: {0:?}")]
    Malformed(String),

    /// 表記は正しいが現局面で合法手ではない
    #[error("illegal move {mv} in position {sfen}")]
    Illegal { mv: String, sfen: String },
}

/// 局面
///
/// 盤面配列・両者の手駒・手番・手数（SFEN の手数欄と同じく開始局面で1）を持つ。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub(super) board: [Option<Piece>; Square::NUM],
    pub(super) hands: [Hand; Color::NUM],
    pub(super) side_to_move: Color,
    pub(super) ply: u32,
}

impl Position {
    /// 駒のない空の局面（先手番・1手目）
    pub fn new() -> Self {
        Position {
            board: [None; Square::NUM],
            hands: [Hand::EMPTY; Color::NUM],
            side_to_move: Color::Black,
            ply: 1,
        }
    }

    /// 平手の開始局面
    pub fn hirate() -> Self {
        let mut pos = Position::new();
        pos.set_hirate();
        pos
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 手数（SFEN の4番目のフィールド）
    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    #[inline]
    pub fn hand(&self, color: Color) -> &Hand {
        &self.hands[color.index()]
    }

    /// 玉の升（玉がいない局面では `None`）
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| {
            self.piece_on(sq)
                .is_some_and(|p| p.color == color && p.piece_type == crate::types::PieceType::King)
        })
    }

    /// 指し手を実行する（合法性は呼び出し側で保証すること）
    pub fn do_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        match mv {
            Move::Normal { from, to, promote } => {
                let Some(piece) = self.board[from.index()].take() else {
                    debug_assert!(false, "no piece on {from} for {mv}");
                    return;
                };
                if let Some(captured) = self.board[to.index()] {
                    self.hands[us.index()].add(captured.piece_type);
                }
                let piece_type = if promote {
                    piece.piece_type.promote().unwrap_or(piece.piece_type)
                } else {
                    piece.piece_type
                };
                self.board[to.index()] = Some(Piece::new(us, piece_type));
            }
            Move::Drop { piece_type, to } => {
                self.hands[us.index()].remove(piece_type);
                self.board[to.index()] = Some(Piece::new(us, piece_type));
            }
        }
        self.side_to_move = !us;
        self.ply += 1;
    }

    /// 指し手を実行した後の局面を返す（自身は変更しない）
    pub fn after(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.do_move(mv);
        next
    }

    /// USI表記の指し手を合法性を確認したうえで実行する
    pub fn try_move(&mut self, usi: &str) -> Result<Move, MoveError> {
        let mv = Move::from_usi(usi).ok_or_else(|| MoveError::Malformed(usi.to_string()))?;
        if !self.is_legal(mv) {
            return Err(MoveError::Illegal {
                mv: usi.to_string(),
                sfen: self.to_sfen(),
            });
        }
        self.do_move(mv);
        Ok(mv)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::hirate()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_sfen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    #[test]
    fn test_do_move_capture_goes_to_hand() {
        let mut pos = Position::hirate();
        for usi in ["7g7f", "3c3d", "8h2b+"] {
            pos.try_move(usi).unwrap();
        }
        assert_eq!(pos.hand(Color::Black).count(PieceType::Bishop), 1);
        let sq = Square::from_usi("2b").unwrap();
        assert_eq!(pos.piece_on(sq), Some(Piece::new(Color::Black, PieceType::Horse)));
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.ply(), 4);
    }

    #[test]
    fn test_try_move_errors() {
        let mut pos = Position::hirate();
        assert!(matches!(pos.try_move("xx"), Err(MoveError::Malformed(_))));
        assert!(matches!(pos.try_move("7g7e"), Err(MoveError::Illegal { .. })));
        // 失敗した場合は局面が変わらない
        assert_eq!(pos, Position::hirate());
    }

    #[test]
    fn test_after_does_not_mutate() {
        let pos = Position::hirate();
        let next = pos.after(Move::from_usi("2g2f").unwrap());
        assert_ne!(pos, next);
        assert_eq!(pos.ply(), 1);
        assert_eq!(next.ply(), 2);
    }

    #[test]
    fn test_king_square() {
        let pos = Position::hirate();
        assert_eq!(pos.king_square(Color::Black).map(|s| s.to_usi()), Some("5i".to_string()));
        assert_eq!(pos.king_square(Color::White).map(|s| s.to_usi()), Some("5a".to_string()));
        assert_eq!(Position::new().king_square(Color::Black), None);
    }
}
