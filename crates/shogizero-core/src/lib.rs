//! shogizero-core: 将棋の対局状態と学習データ生成の中核
//!
//! - `types` / `position`: 駒・升・指し手と、合法手生成つきの局面
//! - `state`: 千日手カウントと勝敗を持つ対局状態
//! - `encoder`: 先手番視点に揃えたネットワーク入力
//! - `player` / `labels`: 指し手を決めるプレイヤーと学習ラベル
//! - `replay` / `selfplay`: 棋譜再生・自己対局による学習データ生成

pub mod encoder;
pub mod labels;
pub mod move_labels;
pub mod player;
pub mod position;
pub mod replay;
pub mod selfplay;
pub mod state;
pub mod tables;
pub mod types;

pub use encoder::{encode, CanonicalInput, SfenInfo};
pub use labels::{LabelBuilder, LabeledExample};
pub use player::{
    Evaluation, Evaluator, Player, PlayerError, SelfPlayPlayer, SupervisedPlayer, UniformEvaluator,
};
pub use position::{MoveError, Position, SfenError, SFEN_HIRATE};
pub use replay::{replay_game, GameOutput, RecordedGame, ReplayError};
pub use selfplay::play_selfplay_game;
pub use state::{GameState, Transition, Winner};
