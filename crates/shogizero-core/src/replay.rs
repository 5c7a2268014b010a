//! 棋譜再生による学習データ生成
//!
//! 先手・後手それぞれの `SupervisedPlayer` に棋譜の指し手を渡しながら局面を進め、
//! 棋譜の勝者から各プレイヤーの結果（+1 / -1 / 0）を決めてラベルを確定させる。
//! 最後に先手・後手の記録を交互に並べ直して手順どおりの列にする。

use log::debug;

use crate::labels::LabeledExample;
use crate::player::{Player, PlayerError, SupervisedPlayer};
use crate::position::MoveError;
use crate::state::{GameState, Transition, Winner};
use crate::types::Color;

/// 再生する棋譜
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedGame {
    pub game_id: String,
    /// USI 形式の指し手列（平手開始）
    pub moves: Vec<String>,
    pub winner: Winner,
    pub black_player: Option<String>,
    pub white_player: Option<String>,
    /// 終局理由（"投了" など、棋譜にあれば）
    pub termination: Option<String>,
}

impl RecordedGame {
    pub fn new(game_id: impl Into<String>, moves: Vec<String>, winner: Winner) -> Self {
        RecordedGame {
            game_id: game_id.into(),
            moves,
            winner,
            black_player: None,
            white_player: None,
            termination: None,
        }
    }
}

/// 手数の偶奇から勝者を決める（最後に指した側の勝ち）
///
/// 棋譜に結果が書かれていない場合の代用。投了以外の終局では誤ったラベルになりうる。
pub fn derive_winner_by_parity(num_moves: usize) -> Winner {
    if num_moves % 2 == 0 {
        Winner::White
    } else {
        Winner::Black
    }
}

/// 棋譜再生のエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplayError {
    #[error("empty move at ply {ply}")]
    EmptyMove { ply: usize },

    #[error("ply {ply}: {source}")]
    IllegalMove { ply: usize, source: MoveError },

    #[error("ply {ply}: {source}")]
    Player { ply: usize, source: PlayerError },

    #[error("game already finished before ply {ply}")]
    GameOver { ply: usize },
}

/// 1局分の結果
#[derive(Debug, Clone)]
pub struct GameOutput {
    /// 終局時の状態（勝者確定済み）
    pub state: GameState,
    /// 実際に指された手（USI）
    pub moves: Vec<String>,
    /// 手順どおりに並んだ学習データ
    pub examples: Vec<LabeledExample>,
}

impl GameOutput {
    pub fn winner(&self) -> Winner {
        self.state.winner().unwrap_or(Winner::Draw)
    }
}

/// 棋譜を再生して学習データを作る
///
/// 棋譜は検証済みとみなし、千日手による終局判定は行わない。
/// 非合法手や空の指し手はエラーとして返す（呼び出し側でその局だけ捨てる）。
pub fn replay_game(game: &RecordedGame) -> Result<GameOutput, ReplayError> {
    let mut state = GameState::new();
    let mut black = SupervisedPlayer::new();
    let mut white = SupervisedPlayer::new();
    let mut moves = Vec::with_capacity(game.moves.len());

    for (i, recorded) in game.moves.iter().enumerate() {
        let ply = i + 1;
        let player: &mut dyn Player = if state.black_to_move() {
            &mut black
        } else {
            &mut white
        };
        let action = player
            .action(&state, Some(recorded))
            .map_err(|source| ReplayError::Player { ply, source })?;
        match state.apply_move(action.as_deref(), false) {
            Transition::Applied(mv) | Transition::Repetition(mv) => moves.push(mv.to_usi()),
            Transition::IllegalMove(source) => return Err(ReplayError::IllegalMove { ply, source }),
            Transition::Resigned => return Err(ReplayError::EmptyMove { ply }),
            Transition::GameOver => return Err(ReplayError::GameOver { ply }),
        }
    }

    state.set_winner(game.winner);
    let black_value = game.winner.signed_for(Color::Black);
    let examples = interleave(black.finish_game(black_value), white.finish_game(-black_value));
    debug!(
        "replayed {}: {} plies, winner {}, {} examples",
        game.game_id,
        moves.len(),
        game.winner,
        examples.len()
    );
    Ok(GameOutput { state, moves, examples })
}

/// 先手の列と後手の列を交互に並べる（先手から）
pub fn interleave<T>(first: Vec<T>, second: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter();
    let mut second = second.into_iter();
    loop {
        match (first.next(), second.next()) {
            (None, None) => break,
            (a, b) => out.extend(a.into_iter().chain(b)),
        }
    }
    out
}
