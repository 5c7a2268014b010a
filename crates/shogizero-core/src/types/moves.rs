//! 指し手（Move）

use super::{PieceType, Square};

/// 指し手
///
/// 盤上の駒の移動（成り指定つき）と駒打ちの2種類。手番は局面側が持つため含めない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Normal { from: Square, to: Square, promote: bool },
    Drop { piece_type: PieceType, to: Square },
}

impl Move {
    /// 移動先の升
    #[inline]
    pub const fn to(self) -> Square {
        match self {
            Move::Normal { to, .. } | Move::Drop { to, .. } => to,
        }
    }

    #[inline]
    pub const fn is_drop(self) -> bool {
        matches!(self, Move::Drop { .. })
    }

    /// USI形式から変換（例: "7g7f", "8h2b+", "P*5e"）
    ///
    /// 構文だけを検査し、合法性は見ない。打てない駒種（玉・成駒）の駒打ちは `None`。
    pub fn from_usi(s: &str) -> Option<Move> {
        if !s.is_ascii() {
            return None;
        }
        let bytes = s.as_bytes();
        match bytes.len() {
            4 if bytes[1] == b'*' => {
                let c = bytes[0] as char;
                if !c.is_ascii_uppercase() {
                    return None;
                }
                let piece_type = PieceType::from_base_char(c)?;
                if !piece_type.is_hand_piece() {
                    return None;
                }
                let to = Square::from_usi(&s[2..4])?;
                Some(Move::Drop { piece_type, to })
            }
            4 | 5 => {
                let promote = match bytes.get(4) {
                    None => false,
                    Some(b'+') => true,
                    Some(_) => return None,
                };
                let from = Square::from_usi(&s[0..2])?;
                let to = Square::from_usi(&s[2..4])?;
                if from == to {
                    return None;
                }
                Some(Move::Normal { from, to, promote })
            }
            _ => None,
        }
    }

    /// USI形式の文字列
    pub fn to_usi(self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Move::Normal { from, to, promote } => {
                write!(f, "{from}{to}{}", if promote { "+" } else { "" })
            }
            Move::Drop { piece_type, to } => write!(f, "{}*{to}", piece_type.base_char()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_usi_roundtrip() {
        for usi in ["7g7f", "8h2b+", "P*5e", "R*1a"] {
            let mv = Move::from_usi(usi).unwrap();
            assert_eq!(mv.to_usi(), usi);
        }
    }

    #[test]
    fn test_move_usi_rejects_malformed() {
        assert_eq!(Move::from_usi(""), None);
        assert_eq!(Move::from_usi("7g7g"), None);
        assert_eq!(Move::from_usi("7g7f="), None);
        assert_eq!(Move::from_usi("K*5e"), None);
        assert_eq!(Move::from_usi("p*5e"), None);
        assert_eq!(Move::from_usi("resign"), None);
        assert_eq!(Move::from_usi("７g7f"), None);
    }

    #[test]
    fn test_move_drop_fields() {
        let mv = Move::from_usi("G*3c").unwrap();
        assert!(mv.is_drop());
        assert_eq!(mv.to().to_usi(), "3c");
    }
}
