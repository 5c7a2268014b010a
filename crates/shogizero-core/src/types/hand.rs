//! 手駒（Hand）

use super::PieceType;

/// 片方の手番の手駒枚数（歩・香・桂・銀・角・飛・金）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hand([u8; 7]);

impl Hand {
    /// 空の手駒
    pub const EMPTY: Hand = Hand([0; 7]);

    /// 駒種ごとの枚数。手駒にならない駒種は常に0。
    #[inline]
    pub fn count(&self, pt: PieceType) -> u8 {
        if pt.is_hand_piece() {
            self.0[pt.hand_index()]
        } else {
            0
        }
    }

    #[inline]
    pub fn has(&self, pt: PieceType) -> bool {
        self.count(pt) > 0
    }

    /// 枚数を設定する
    #[inline]
    pub fn set(&mut self, pt: PieceType, n: u8) {
        debug_assert!(pt.is_hand_piece(), "not a hand piece: {pt:?}");
        self.0[pt.hand_index()] = n;
    }

    /// 1枚加える（成駒は生駒に戻して加える）
    #[inline]
    pub fn add(&mut self, pt: PieceType) {
        let base = pt.unpromote();
        debug_assert!(base.is_hand_piece(), "not a hand piece: {pt:?}");
        self.0[base.hand_index()] += 1;
    }

    /// 1枚減らす
    #[inline]
    pub fn remove(&mut self, pt: PieceType) {
        debug_assert!(self.has(pt), "no {pt:?} in hand");
        self.0[pt.hand_index()] -= 1;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }
}
