//! 升（Square）

use super::{File, Rank};

/// 升（0-80）
///
/// インデックスは `file * 9 + rank`。1一が0、9九が80。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// 升の数
    pub const NUM: usize = 81;

    /// 筋と段から升を作る
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Square {
        Square(file as u8 * 9 + rank as u8)
    }

    /// u8から升に変換
    #[inline]
    pub const fn from_u8(n: u8) -> Option<Square> {
        if (n as usize) < Self::NUM {
            Some(Square(n))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 / 9) as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 % 9) as usize]
    }

    /// 盤面を180度回転した升
    #[inline]
    pub const fn inverse(self) -> Square {
        Square(80 - self.0)
    }

    /// 筋・段方向にずらした升（盤外なら `None`）
    ///
    /// `df` は筋番号の増分、`dr` は段番号の増分。
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let f = self.file() as i8 + df;
        let r = self.rank() as i8 + dr;
        if (0..9).contains(&f) && (0..9).contains(&r) {
            Some(Square((f * 9 + r) as u8))
        } else {
            None
        }
    }

    /// 全ての升を返すイテレータ
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::NUM as u8).map(Square)
    }

    /// USI形式（例: "7g"）に変換
    pub fn to_usi(self) -> String {
        let mut s = String::with_capacity(2);
        s.push(self.file().to_usi_char());
        s.push(self.rank().to_usi_char());
        s
    }

    /// USI形式（例: "7g"）から変換
    pub fn from_usi(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = File::from_usi_char(chars.next()?)?;
        let rank = Rank::from_usi_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square::new(file, rank))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file().to_usi_char(), self.rank().to_usi_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_usi_roundtrip() {
        let sq = Square::from_usi("7g").unwrap();
        assert_eq!(sq.file(), File::File7);
        assert_eq!(sq.rank(), Rank::Rank7);
        assert_eq!(sq.to_usi(), "7g");
        assert_eq!(Square::from_usi("0a"), None);
        assert_eq!(Square::from_usi("7g+"), None);
    }

    #[test]
    fn test_square_inverse() {
        let sq = Square::from_usi("7g").unwrap();
        assert_eq!(sq.inverse().to_usi(), "3c");
        assert_eq!(Square::from_usi("5e").unwrap().inverse().to_usi(), "5e");
    }

    #[test]
    fn test_square_offset() {
        let sq = Square::from_usi("1a").unwrap();
        assert_eq!(sq.offset(0, -1), None);
        assert_eq!(sq.offset(-1, 0), None);
        assert_eq!(sq.offset(1, 1).map(|s| s.to_usi()), Some("2b".to_string()));
    }
}
