//! 手番（Color）

/// 手番（先手/後手）
///
/// SFEN の手番表記に合わせ、先手を `Black`（`b`・大文字の駒）、後手を `White`
/// （`w`・小文字の駒）とする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// 手番の数
    pub const NUM: usize = 2;

    /// 全ての手番（先手→後手の順）
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    /// 相手番を返す
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 前進方向の段の増分（先手は1段目方向なので -1）
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::Black => -1,
            Color::White => 1,
        }
    }

    /// SFEN の手番文字
    #[inline]
    pub const fn to_sfen_char(self) -> char {
        match self {
            Color::Black => 'b',
            Color::White => 'w',
        }
    }

    /// SFEN の手番文字から変換
    #[inline]
    pub fn from_sfen_char(c: char) -> Option<Color> {
        match c {
            'b' => Some(Color::Black),
            'w' => Some(Color::White),
            _ => None,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opponent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(!Color::White, Color::Black);
    }

    #[test]
    fn test_color_sfen_char() {
        assert_eq!(Color::Black.to_sfen_char(), 'b');
        assert_eq!(Color::from_sfen_char('w'), Some(Color::White));
        assert_eq!(Color::from_sfen_char('x'), None);
    }

    #[test]
    fn test_color_forward() {
        // 先手は段番号が小さくなる方向へ進む
        assert_eq!(Color::Black.forward(), -1);
        assert_eq!(Color::White.forward(), 1);
    }
}
