//! 指し手ラベル表
//!
//! 9x9 盤上で幾何的にありうる USI 指し手すべてに固定の番号を振る。
//! 方策（指し手ごとの重み）を密なベクトルに変換するときに使う。
//!
//! - 盤上の移動: 8方向の直線移動と桂馬跳び（先後両方向）。どちらかの升が敵陣なら "+" 付きも含む
//! - 駒打ち: 飛角金銀桂香歩 × 81升

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::types::{PieceType, Square};

static MOVE_LABELS: LazyLock<MoveLabels> = LazyLock::new(MoveLabels::build);

/// USI 指し手と番号の対応表
#[derive(Debug)]
pub struct MoveLabels {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

const LINES: [(i8, i8); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
const KNIGHT_JUMPS: [(i8, i8); 4] = [(-1, -2), (1, -2), (-1, 2), (1, 2)];

/// 先手・後手どちらかの敵陣（1〜3段目または7〜9段目）
fn in_any_zone(sq: Square) -> bool {
    let r = sq.rank().index();
    r <= 2 || r >= 6
}

impl MoveLabels {
    /// 共有の表
    pub fn get() -> &'static MoveLabels {
        &MOVE_LABELS
    }

    fn build() -> MoveLabels {
        let mut labels = Vec::with_capacity(4096);
        for from in Square::all() {
            let mut targets = Vec::new();
            for (df, dr) in LINES {
                let mut cur = from;
                while let Some(to) = cur.offset(df, dr) {
                    targets.push(to);
                    cur = to;
                }
            }
            for (df, dr) in KNIGHT_JUMPS {
                if let Some(to) = from.offset(df, dr) {
                    targets.push(to);
                }
            }
            targets.sort_by_key(|sq| sq.index());
            for to in targets {
                let base = format!("{from}{to}");
                if in_any_zone(from) || in_any_zone(to) {
                    labels.push(format!("{base}+"));
                }
                labels.push(base);
            }
        }
        for pt in PieceType::HAND_ORDER {
            for to in Square::all() {
                labels.push(format!("{}*{to}", pt.base_char()));
            }
        }
        let index = labels.iter().enumerate().map(|(i, l)| (l.clone(), i)).collect();
        MoveLabels { labels, index }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// USI 指し手の番号
    pub fn index_of(&self, usi: &str) -> Option<usize> {
        self.index.get(usi).copied()
    }

    /// 番号から USI 指し手
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_labels_are_unique_and_indexed() {
        let labels = MoveLabels::get();
        assert!(!labels.is_empty());
        assert_eq!(labels.index.len(), labels.len());
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(labels.index_of(label), Some(i));
        }
        assert_eq!(labels.label(labels.len()), None);
    }

    #[test]
    fn test_legal_moves_are_covered() {
        let labels = MoveLabels::get();
        let mut pos = Position::new();
        for sfen in [
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1",
            "8l/1l+R2P3/p2pBG1pp/kps1p4/Nn1P2G2/P1P1P2PP/1PS6/1KSG3+r1/LN2+p3L w Sbgn3p 124",
            "8l/1l+R2P3/p2pBG1pp/kps1p4/Nn1P2G2/P1P1P2PP/1PS6/1KSG3+r1/LN2+p3L b Sbgn3p 124",
        ] {
            pos.set_sfen(sfen).unwrap();
            for mv in pos.legal_moves() {
                assert!(labels.index_of(&mv.to_usi()).is_some(), "{mv} missing");
            }
        }
    }

    #[test]
    fn test_known_labels() {
        let labels = MoveLabels::get();
        assert!(labels.index_of("7g7f").is_some());
        assert!(labels.index_of("8h2b+").is_some());
        assert!(labels.index_of("P*5e").is_some());
        // 5段目同士の移動は成れない
        assert!(labels.index_of("5e4e+").is_none());
        // 桂馬以外の跳びはない
        assert!(labels.index_of("5e3f").is_none());
        assert!(labels.index_of("K*5e").is_none());
    }
}
