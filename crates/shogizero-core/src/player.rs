//! 指し手を決めるプレイヤー
//!
//! - `SupervisedPlayer`: 棋譜の指し手をそのまま返し、one-hot の方策を記録する
//! - `SelfPlayPlayer`: 評価器の事前確率から温度付きで指し手を選び、事前確率を方策として記録する
//!
//! どちらも記録は `LabelBuilder` に溜め、`finish_game` で結果を付けて取り出す。

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::encoder::CanonicalInput;
use crate::labels::{LabelBuilder, LabeledExample};
use crate::position::SfenError;
use crate::state::GameState;
use crate::types::Move;

/// プレイヤーのエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("no recorded move supplied at ply {0}")]
    MissingMove(u32),

    #[error("evaluator returned {got} priors for {expected} legal moves")]
    PriorCount { expected: usize, got: usize },

    #[error(transparent)]
    Encode(#[from] SfenError),
}

/// 指し手を決めるプレイヤー
pub trait Player {
    /// 現局面で指す手（USI）を返す。`None` は投了
    ///
    /// `recorded` は棋譜上の指し手（棋譜再生時のみ）。
    fn action(
        &mut self,
        state: &GameState,
        recorded: Option<&str>,
    ) -> Result<Option<String>, PlayerError>;

    /// これまでに記録したラベル
    fn labels(&self) -> &LabelBuilder;

    /// 記録したラベルに結果を付けて取り出す（記録は空になる）
    fn finish_game(&mut self, value: f32) -> Vec<LabeledExample>;
}

/// 棋譜再生用のプレイヤー
#[derive(Debug, Default)]
pub struct SupervisedPlayer {
    labels: LabelBuilder,
}

impl SupervisedPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Player for SupervisedPlayer {
    fn action(
        &mut self,
        state: &GameState,
        recorded: Option<&str>,
    ) -> Result<Option<String>, PlayerError> {
        let mv = recorded.ok_or(PlayerError::MissingMove(state.position().ply()))?;
        self.labels.record(state.observation(), vec![(mv.to_string(), 1.0)]);
        Ok(Some(mv.to_string()))
    }

    fn labels(&self) -> &LabelBuilder {
        &self.labels
    }

    fn finish_game(&mut self, value: f32) -> Vec<LabeledExample> {
        std::mem::take(&mut self.labels).finalize(value)
    }
}

/// 評価器の出力
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// 合法手と同じ順の事前確率
    pub priors: Vec<f32>,
    /// 手番側から見た局面評価（-1..=1）
    pub value: f32,
}

/// 方策・価値ネットワークの境界
pub trait Evaluator {
    fn evaluate(&mut self, input: &CanonicalInput, legal_moves: &[Move]) -> Evaluation;
}

/// すべての合法手に等しい確率を返す評価器
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&mut self, _input: &CanonicalInput, legal_moves: &[Move]) -> Evaluation {
        let n = legal_moves.len().max(1) as f32;
        Evaluation {
            priors: vec![1.0 / n; legal_moves.len()],
            value: 0.0,
        }
    }
}

/// 自己対局用のプレイヤー
#[derive(Debug)]
pub struct SelfPlayPlayer<E: Evaluator> {
    evaluator: E,
    temperature: f32,
    rng: Xoshiro256PlusPlus,
    labels: LabelBuilder,
}

impl<E: Evaluator> SelfPlayPlayer<E> {
    /// `temperature` が 0 以下なら常に最大確率の手を選ぶ
    pub fn new(evaluator: E, temperature: f32, seed: u64) -> Self {
        SelfPlayPlayer {
            evaluator,
            temperature,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            labels: LabelBuilder::new(),
        }
    }

    fn select(&mut self, priors: &[f32]) -> usize {
        if self.temperature <= 0.0 {
            return argmax(priors);
        }
        let exponent = 1.0 / self.temperature;
        let weights: Vec<f32> = priors.iter().map(|p| p.max(0.0).powf(exponent)).collect();
        let total: f32 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return argmax(priors);
        }
        let mut threshold = self.rng.random::<f32>() * total;
        for (i, w) in weights.iter().enumerate() {
            if threshold < *w {
                return i;
            }
            threshold -= w;
        }
        weights.len() - 1
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

impl<E: Evaluator> Player for SelfPlayPlayer<E> {
    fn action(
        &mut self,
        state: &GameState,
        _recorded: Option<&str>,
    ) -> Result<Option<String>, PlayerError> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return Ok(None);
        }
        let input = state.canonical_input()?;
        let eval = self.evaluator.evaluate(&input, &legal);
        if eval.priors.len() != legal.len() {
            return Err(PlayerError::PriorCount {
                expected: legal.len(),
                got: eval.priors.len(),
            });
        }

        let total: f32 = eval.priors.iter().map(|p| p.max(0.0)).sum();
        let policy = legal
            .iter()
            .zip(&eval.priors)
            .map(|(mv, p)| {
                let w = if total > 0.0 {
                    p.max(0.0) / total
                } else {
                    1.0 / legal.len() as f32
                };
                (mv.to_usi(), w)
            })
            .collect();
        self.labels.record(state.observation(), policy);

        let chosen = self.select(&eval.priors);
        Ok(Some(legal[chosen].to_usi()))
    }

    fn labels(&self) -> &LabelBuilder {
        &self.labels
    }

    fn finish_game(&mut self, value: f32) -> Vec<LabeledExample> {
        std::mem::take(&mut self.labels).finalize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 指定した指し手に全確率を置く評価器
    struct FixedEvaluator(&'static str);

    impl Evaluator for FixedEvaluator {
        fn evaluate(&mut self, _input: &CanonicalInput, legal_moves: &[Move]) -> Evaluation {
            let priors = legal_moves
                .iter()
                .map(|mv| if mv.to_usi() == self.0 { 1.0 } else { 0.0 })
                .collect();
            Evaluation {
                priors,
                value: 0.5,
            }
        }
    }

    #[test]
    fn test_supervised_player_records_one_hot() {
        let state = GameState::new();
        let mut player = SupervisedPlayer::new();
        let mv = player.action(&state, Some("7g7f")).unwrap();
        assert_eq!(mv.as_deref(), Some("7g7f"));
        assert_eq!(player.labels().len(), 1);
        assert!(matches!(player.action(&state, None), Err(PlayerError::MissingMove(1))));

        let examples = player.finish_game(1.0);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].sfen, state.observation());
        assert_eq!(examples[0].policy, vec![("7g7f".to_string(), 1.0)]);
        assert_eq!(examples[0].value, 1.0);
        assert!(player.labels().is_empty());
    }

    #[test]
    fn test_selfplay_player_greedy() {
        let state = GameState::new();
        let mut player = SelfPlayPlayer::new(FixedEvaluator("2g2f"), 0.0, 1);
        assert_eq!(player.action(&state, None).unwrap().as_deref(), Some("2g2f"));
        let examples = player.finish_game(0.0);
        assert_eq!(examples[0].policy.len(), 30);
        let sum: f32 = examples[0].policy.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_selfplay_player_sampling_is_seeded() {
        let state = GameState::new();
        let picks = |seed| {
            let mut player = SelfPlayPlayer::new(UniformEvaluator, 1.0, seed);
            (0..8).map(|_| player.action(&state, None).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
        let legal: Vec<String> = state.legal_moves().into_iter().map(Move::to_usi).collect();
        for mv in picks(3).into_iter().flatten() {
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn test_selfplay_player_resigns_without_legal_moves() {
        let mut state = GameState::new();
        // 後手玉が詰んでいる局面（先手の金打ち後）
        state.update("4k4/4G4/4P4/9/9/9/9/9/4K4 w - 2").unwrap();
        assert!(state.legal_moves().is_empty());
        let mut player = SelfPlayPlayer::new(UniformEvaluator, 1.0, 0);
        assert_eq!(player.action(&state, None).unwrap(), None);
        assert!(player.labels().is_empty());
    }
}
