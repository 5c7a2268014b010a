//! 学習データ生成ツール群
//!
//! 棋譜の読み込み、並列パイプライン、学習データファイルの入出力を提供する。
//! バイナリは `src/bin/` にある。

pub mod common;
pub mod config;
pub mod game_data;
pub mod kif;
pub mod pipeline;
pub mod self_play;
pub mod sl;
