//! 駒記号とインデックスの対応表
//!
//! ネットワーク入力の平面番号を決める静的な全単射。並び順を変えると
//! 既存の学習データと互換性がなくなるので注意。

/// 盤上の駒記号（先手の生駒・成駒、続いて後手の生駒・成駒）
pub const PIECES: [&str; NUM_PIECES] = [
    "K", "R", "B", "G", "S", "N", "L", "P", "+R", "+B", "+S", "+N", "+L", "+P", //
    "k", "r", "b", "g", "s", "n", "l", "p", "+r", "+b", "+s", "+n", "+l", "+p",
];

/// 盤上の駒記号の種類数
pub const NUM_PIECES: usize = 28;

/// 手駒になりうる駒記号（玉と成駒を除く）
pub const HAND_PIECES: [char; NUM_HAND_PIECES] =
    ['R', 'B', 'G', 'S', 'N', 'L', 'P', 'r', 'b', 'g', 's', 'n', 'l', 'p'];

/// 手駒記号の種類数
pub const NUM_HAND_PIECES: usize = 14;

/// 成駒を表す '+' と駒文字の組から平面番号へ
pub fn piece_index_of(promoted: bool, letter: char) -> Option<usize> {
    PIECES.iter().position(|p| {
        let mut chars = p.chars();
        match (promoted, chars.next(), chars.next()) {
            (true, Some('+'), Some(c)) => c == letter,
            (false, Some(c), None) => c == letter,
            _ => false,
        }
    })
}

/// 手駒記号から平面番号へ
pub fn hand_piece_index(symbol: char) -> Option<usize> {
    HAND_PIECES.iter().position(|&p| p == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_index_is_bijective() {
        for (i, symbol) in PIECES.iter().enumerate() {
            let promoted = symbol.starts_with('+');
            let letter = symbol.chars().last().unwrap();
            assert_eq!(piece_index_of(promoted, letter), Some(i));
        }
        let mut sorted = PIECES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), NUM_PIECES);
    }

    #[test]
    fn test_piece_index_of() {
        assert_eq!(piece_index_of(false, 'K'), Some(0));
        assert_eq!(piece_index_of(true, 'P'), Some(13));
        assert_eq!(piece_index_of(false, 'p'), Some(21));
        assert_eq!(piece_index_of(true, 'p'), Some(27));
        assert_eq!(piece_index_of(true, 'G'), None);
        assert_eq!(piece_index_of(false, 'x'), None);
    }

    #[test]
    fn test_hand_piece_index() {
        assert_eq!(hand_piece_index('R'), Some(0));
        assert_eq!(hand_piece_index('p'), Some(13));
        assert_eq!(hand_piece_index('K'), None);
        for (i, &symbol) in HAND_PIECES.iter().enumerate() {
            assert_eq!(hand_piece_index(symbol), Some(i));
        }
    }
}
