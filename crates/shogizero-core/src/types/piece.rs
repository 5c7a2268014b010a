//! 駒種（PieceType）と駒（Piece）

use super::Color;

/// 駒種
///
/// 生駒 → 成駒の順。成駒は `生駒 + 8` の関係にある（金・玉は成れない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 1,
    Lance = 2,
    Knight = 3,
    Silver = 4,
    Bishop = 5,
    Rook = 6,
    Gold = 7,
    King = 8,
    ProPawn = 9,
    ProLance = 10,
    ProKnight = 11,
    ProSilver = 12,
    Horse = 13,
    Dragon = 14,
}

impl PieceType {
    /// 手駒になりうる駒種（SFEN の持ち駒出力順: 飛角金銀桂香歩）
    pub const HAND_ORDER: [PieceType; 7] = [
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Gold,
        PieceType::Silver,
        PieceType::Knight,
        PieceType::Lance,
        PieceType::Pawn,
    ];

    /// 成駒かどうか
    #[inline]
    pub const fn is_promoted(self) -> bool {
        self as u8 >= PieceType::ProPawn as u8
    }

    /// 成れる駒種かどうか
    #[inline]
    pub const fn can_promote(self) -> bool {
        (self as u8) <= PieceType::Rook as u8
    }

    /// 成った駒種
    pub const fn promote(self) -> Option<PieceType> {
        match self {
            PieceType::Pawn => Some(PieceType::ProPawn),
            PieceType::Lance => Some(PieceType::ProLance),
            PieceType::Knight => Some(PieceType::ProKnight),
            PieceType::Silver => Some(PieceType::ProSilver),
            PieceType::Bishop => Some(PieceType::Horse),
            PieceType::Rook => Some(PieceType::Dragon),
            _ => None,
        }
    }

    /// 生駒に戻した駒種（取られて手駒になるときに使う）
    pub const fn unpromote(self) -> PieceType {
        match self {
            PieceType::ProPawn => PieceType::Pawn,
            PieceType::ProLance => PieceType::Lance,
            PieceType::ProKnight => PieceType::Knight,
            PieceType::ProSilver => PieceType::Silver,
            PieceType::Horse => PieceType::Bishop,
            PieceType::Dragon => PieceType::Rook,
            other => other,
        }
    }

    /// 手駒として持てる駒種か
    #[inline]
    pub const fn is_hand_piece(self) -> bool {
        !self.is_promoted() && !matches!(self, PieceType::King)
    }

    /// 生駒のSFEN文字（大文字）
    pub const fn base_char(self) -> char {
        match self.unpromote() {
            PieceType::Pawn => 'P',
            PieceType::Lance => 'L',
            PieceType::Knight => 'N',
            PieceType::Silver => 'S',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Gold => 'G',
            _ => 'K',
        }
    }

    /// SFEN文字（大小文字どちらでも可）から生駒の駒種へ
    pub fn from_base_char(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'L' => Some(PieceType::Lance),
            'N' => Some(PieceType::Knight),
            'S' => Some(PieceType::Silver),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'G' => Some(PieceType::Gold),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// 手駒配列のインデックス（歩=0 … 金=6）
    #[inline]
    pub(crate) const fn hand_index(self) -> usize {
        self as usize - 1
    }
}

/// 盤上の駒（手番 + 駒種）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, piece_type: PieceType) -> Piece {
        Piece { color, piece_type }
    }

    /// SFEN表記（例: "P", "+p", "k"）
    pub fn to_sfen(self) -> String {
        let c = self.piece_type.base_char();
        let c = match self.color {
            Color::Black => c,
            Color::White => c.to_ascii_lowercase(),
        };
        if self.piece_type.is_promoted() {
            format!("+{c}")
        } else {
            c.to_string()
        }
    }

    /// SFEN文字と成フラグから駒を作る（大文字が先手）
    pub fn from_sfen(c: char, promoted: bool) -> Option<Piece> {
        let base = PieceType::from_base_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::Black
        } else {
            Color::White
        };
        let piece_type = if promoted { base.promote()? } else { base };
        Some(Piece::new(color, piece_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_unpromote() {
        assert_eq!(PieceType::Bishop.promote(), Some(PieceType::Horse));
        assert_eq!(PieceType::Gold.promote(), None);
        assert_eq!(PieceType::Dragon.unpromote(), PieceType::Rook);
        assert!(PieceType::ProSilver.is_promoted());
        assert!(!PieceType::King.can_promote());
    }

    #[test]
    fn test_piece_sfen() {
        assert_eq!(Piece::new(Color::Black, PieceType::ProPawn).to_sfen(), "+P");
        assert_eq!(Piece::new(Color::White, PieceType::King).to_sfen(), "k");
        assert_eq!(
            Piece::from_sfen('s', true),
            Some(Piece::new(Color::White, PieceType::ProSilver))
        );
        // 金・玉は成れない
        assert_eq!(Piece::from_sfen('G', true), None);
        assert_eq!(Piece::from_sfen('x', false), None);
    }

    #[test]
    fn test_hand_piece() {
        assert!(PieceType::Pawn.is_hand_piece());
        assert!(PieceType::Gold.is_hand_piece());
        assert!(!PieceType::King.is_hand_piece());
        assert!(!PieceType::Horse.is_hand_piece());
    }
}
