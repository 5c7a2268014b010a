//! shogizero の USI フロントエンド
//!
//! 一様評価器で指し手を返すだけの最小エンジン。棋譜再生や自己対局と同じ
//! `GameState` を使うため、GUI から局面遷移の動作確認ができる。

pub mod engine;
pub mod position;

pub use engine::{run, Flow, UsiEngine};
