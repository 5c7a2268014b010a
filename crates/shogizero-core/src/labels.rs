//! 学習データ（局面と方策・価値のラベル）

use serde::{Deserialize, Serialize};

use crate::encoder::{mirror_usi_move, SfenInfo};
use crate::move_labels::MoveLabels;

/// 1手分の学習データ
///
/// `policy` は指し手（USI）と重みの組。`value` は手番側から見た最終結果（+1 / 0 / -1）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub sfen: String,
    pub policy: Vec<(String, f32)>,
    pub value: f32,
}

impl LabeledExample {
    /// 方策を指し手ラベル表の順に並べた密なベクトル（表にない指し手は無視）
    pub fn policy_vector(&self, labels: &MoveLabels) -> Vec<f32> {
        let mut dense = vec![0.0; labels.len()];
        for (usi, weight) in &self.policy {
            if let Some(i) = labels.index_of(usi) {
                dense[i] += weight;
            }
        }
        dense
    }

    /// 正準入力と同じ向き（先手番）に揃えた方策
    pub fn canonical_policy(&self) -> Vec<(String, f32)> {
        let black_to_move =
            SfenInfo::parse(&self.sfen).map_or(true, |info| info.is_black_to_move());
        if black_to_move {
            return self.policy.clone();
        }
        self.policy
            .iter()
            .filter_map(|(usi, w)| mirror_usi_move(usi).map(|m| (m, *w)))
            .collect()
    }
}

/// 1手ごとの (局面, 方策) を溜めておき、終局後に結果を付けて確定させる
#[derive(Debug, Default, Clone)]
pub struct LabelBuilder {
    pending: Vec<(String, Vec<(String, f32)>)>,
}

impl LabelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 局面と方策を記録する
    pub fn record(&mut self, sfen: String, policy: Vec<(String, f32)>) {
        self.pending.push((sfen, policy));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// すべての記録に結果 `value` を付けて確定する
    pub fn finalize(self, value: f32) -> Vec<LabeledExample> {
        self.pending
            .into_iter()
            .map(|(sfen, policy)| LabeledExample {
                sfen,
                policy,
                value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::SFEN_HIRATE;

    #[test]
    fn test_finalize_applies_value_in_order() {
        let mut builder = LabelBuilder::new();
        builder.record("a".to_string(), vec![("7g7f".to_string(), 1.0)]);
        builder.record("b".to_string(), vec![("2g2f".to_string(), 1.0)]);
        assert_eq!(builder.len(), 2);
        let examples = builder.finalize(-1.0);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].sfen, "a");
        assert_eq!(examples[1].policy[0].0, "2g2f");
        assert!(examples.iter().all(|e| e.value == -1.0));
    }

    #[test]
    fn test_policy_vector() {
        let labels = MoveLabels::get();
        let example = LabeledExample {
            sfen: SFEN_HIRATE.to_string(),
            policy: vec![("7g7f".to_string(), 0.75), ("2g2f".to_string(), 0.25)],
            value: 1.0,
        };
        let dense = example.policy_vector(labels);
        assert_eq!(dense.len(), labels.len());
        assert_eq!(dense[labels.index_of("7g7f").unwrap()], 0.75);
        assert_eq!(dense.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_canonical_policy_mirrors_white_moves() {
        let black = LabeledExample {
            sfen: SFEN_HIRATE.to_string(),
            policy: vec![("7g7f".to_string(), 1.0)],
            value: 0.0,
        };
        assert_eq!(black.canonical_policy(), black.policy);

        let white = LabeledExample {
            sfen: "lnsgkgsnl/1r5b1/ppppppppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL w - 2".to_string(),
            policy: vec![("3c3d".to_string(), 1.0)],
            value: 0.0,
        };
        assert_eq!(white.canonical_policy(), vec![("7g7f".to_string(), 1.0)]);
    }
}
