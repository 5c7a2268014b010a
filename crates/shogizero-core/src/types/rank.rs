//! 段（Rank）

use super::Color;

/// 段（1段〜9段）
///
/// 1段目が後手陣の最奥（USI の `a`）、9段目が先手陣の最奥（`i`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    Rank1 = 0,
    Rank2 = 1,
    Rank3 = 2,
    Rank4 = 3,
    Rank5 = 4,
    Rank6 = 5,
    Rank7 = 6,
    Rank8 = 7,
    Rank9 = 8,
}

impl Rank {
    /// 段の数
    pub const NUM: usize = 9;

    /// 全ての段
    pub const ALL: [Rank; 9] = [
        Rank::Rank1,
        Rank::Rank2,
        Rank::Rank3,
        Rank::Rank4,
        Rank::Rank5,
        Rank::Rank6,
        Rank::Rank7,
        Rank::Rank8,
        Rank::Rank9,
    ];

    /// u8からRankに変換
    #[inline]
    pub const fn from_u8(n: u8) -> Option<Rank> {
        if n < 9 { Some(Rank::ALL[n as usize]) } else { None }
    }

    /// インデックスとして使用
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 相対段（先手から見た段）
    #[inline]
    pub const fn relative(self, color: Color) -> Rank {
        match color {
            Color::Black => self,
            Color::White => Rank::ALL[8 - self as usize],
        }
    }

    /// 成れる段かどうか（先手視点で1-3段、後手視点で7-9段）
    #[inline]
    pub const fn can_promote(self, color: Color) -> bool {
        (self.relative(color) as u8) <= (Rank::Rank3 as u8)
    }

    /// 歩・香が行き所を失う段（相対1段目）
    #[inline]
    pub const fn is_last(self, color: Color) -> bool {
        matches!(self.relative(color), Rank::Rank1)
    }

    /// 桂が行き所を失う段（相対1-2段目）
    #[inline]
    pub const fn is_last_two(self, color: Color) -> bool {
        matches!(self.relative(color), Rank::Rank1 | Rank::Rank2)
    }

    /// USI形式の文字（'a'-'i'）に変換
    #[inline]
    pub const fn to_usi_char(self) -> char {
        (b'a' + self as u8) as char
    }

    /// USI形式の文字からRankに変換
    #[inline]
    pub const fn from_usi_char(c: char) -> Option<Rank> {
        if !c.is_ascii() {
            return None;
        }
        Rank::from_u8((c as u8).wrapping_sub(b'a'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_usi() {
        assert_eq!(Rank::Rank1.to_usi_char(), 'a');
        assert_eq!(Rank::Rank9.to_usi_char(), 'i');
        assert_eq!(Rank::from_usi_char('i'), Some(Rank::Rank9));
        assert_eq!(Rank::from_usi_char('j'), None);
        assert_eq!(Rank::from_usi_char('一'), None);
    }

    #[test]
    fn test_rank_can_promote() {
        assert!(Rank::Rank3.can_promote(Color::Black));
        assert!(!Rank::Rank4.can_promote(Color::Black));
        assert!(!Rank::Rank6.can_promote(Color::White));
        assert!(Rank::Rank7.can_promote(Color::White));
    }

    #[test]
    fn test_rank_dead_zones() {
        assert!(Rank::Rank1.is_last(Color::Black));
        assert!(Rank::Rank9.is_last(Color::White));
        assert!(Rank::Rank2.is_last_two(Color::Black));
        assert!(!Rank::Rank3.is_last_two(Color::Black));
        assert!(Rank::Rank8.is_last_two(Color::White));
    }

    #[test]
    fn test_rank_relative() {
        assert_eq!(Rank::Rank1.relative(Color::White), Rank::Rank9);
        assert_eq!(Rank::Rank5.relative(Color::White), Rank::Rank5);
    }
}
