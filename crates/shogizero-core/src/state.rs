//! 対局状態（局面・千日手カウント・勝敗）

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::encoder::{encode, CanonicalInput};
use crate::position::{MoveError, Position, SfenError};
use crate::types::{Color, Move};

/// 同一局面がこの回数現れたら千日手
pub const REPETITION_LIMIT: u32 = 4;

/// 対局結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Black,
    White,
    Draw,
}

impl Winner {
    /// 指定した手番の勝ち
    pub const fn of(color: Color) -> Winner {
        match color {
            Color::Black => Winner::Black,
            Color::White => Winner::White,
        }
    }

    /// 棋譜に付けられた勝者ラベル（"b" / "w" / その他は引き分け）
    pub fn from_label(label: &str) -> Winner {
        match label {
            "b" => Winner::Black,
            "w" => Winner::White,
            _ => Winner::Draw,
        }
    }

    /// `color` 側から見た結果（勝ち +1、負け -1、引き分け 0）
    pub fn signed_for(self, color: Color) -> f32 {
        match (self, color) {
            (Winner::Draw, _) => 0.0,
            (Winner::Black, Color::Black) | (Winner::White, Color::White) => 1.0,
            _ => -1.0,
        }
    }

    /// "1-0"（先手勝ち）/ "0-1"（後手勝ち）/ "1/2-1/2"
    pub const fn result_str(self) -> &'static str {
        match self {
            Winner::Black => "1-0",
            Winner::White => "0-1",
            Winner::Draw => "1/2-1/2",
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Winner::Black => "black",
            Winner::White => "white",
            Winner::Draw => "draw",
        };
        f.pad(s)
    }
}

/// `apply_move` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 指し手を適用した
    Applied(Move),
    /// 指し手を適用し、千日手で終局した
    Repetition(Move),
    /// 手番側の投了
    Resigned,
    /// 非合法手（反則負けとして投了と同じ扱い）
    IllegalMove(MoveError),
    /// 既に終局しているので何もしなかった
    GameOver,
}

impl Transition {
    /// 盤面が変化したか
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_) | Transition::Repetition(_))
    }
}

/// 対局状態
///
/// 局面に加えて、盤面部分の SFEN をキーにした出現回数・手数・勝敗を持つ。
/// 勝敗が決まった後は `apply_move` で状態が変わることはない。
/// 仮の局面を探索したい場合は `clone` で明示的に複製する。
#[derive(Debug, Clone)]
pub struct GameState {
    position: Position,
    repetition_counts: HashMap<String, u32>,
    halfmove_count: u32,
    winner: Option<Winner>,
    resigned: bool,
}

impl GameState {
    /// 平手の開始局面で初期化した状態
    pub fn new() -> Self {
        let mut state = GameState {
            position: Position::hirate(),
            repetition_counts: HashMap::new(),
            halfmove_count: 0,
            winner: None,
            resigned: false,
        };
        state.reset();
        state
    }

    /// 平手の開始局面から対局をやり直す
    pub fn reset(&mut self) -> &mut Self {
        self.position = Position::hirate();
        self.clear_history();
        self
    }

    /// 与えられた局面から対局をやり直す
    ///
    /// SFEN が不正な場合はエラーを返し、状態は変更しない。
    pub fn update(&mut self, sfen: &str) -> Result<&mut Self, SfenError> {
        let mut position = Position::new();
        position.set_sfen(sfen)?;
        self.position = position;
        self.clear_history();
        Ok(self)
    }

    fn clear_history(&mut self) {
        self.repetition_counts.clear();
        self.repetition_counts.insert(self.position.board_sfen(), 1);
        self.halfmove_count = 0;
        self.winner = None;
        self.resigned = false;
    }

    /// 指し手を1つ進める
    ///
    /// `None` または空文字列は手番側の投了、非合法手は反則負けとして扱う。
    /// 出現回数は常に数えるが、千日手による終局判定は `check_termination` のときだけ行う。
    pub fn apply_move(&mut self, usi: Option<&str>, check_termination: bool) -> Transition {
        if self.done() {
            return Transition::GameOver;
        }
        let usi = match usi {
            Some(s) if !s.is_empty() => s,
            _ => {
                self.resign();
                return Transition::Resigned;
            }
        };
        let mv = match self.position.try_move(usi) {
            Ok(mv) => mv,
            Err(e) => {
                self.resign();
                return Transition::IllegalMove(e);
            }
        };

        let count = self.repetition_counts.entry(self.position.board_sfen()).or_insert(0);
        *count += 1;
        if check_termination && *count >= REPETITION_LIMIT {
            self.winner = Some(Winner::Draw);
            return Transition::Repetition(mv);
        }
        self.halfmove_count += 1;
        Transition::Applied(mv)
    }

    /// 手番側の投了
    fn resign(&mut self) {
        self.resigned = true;
        self.winner = Some(Winner::of(!self.position.side_to_move()));
    }

    /// 引き分けとして終局させる（手数制限など）
    pub fn adjudicate(&mut self) {
        self.winner = Some(Winner::Draw);
    }

    /// 勝敗を外部から確定させる（棋譜の結果を反映する場合など）
    pub fn set_winner(&mut self, winner: Winner) {
        self.winner = Some(winner);
    }

    /// 現局面の SFEN
    pub fn observation(&self) -> String {
        self.position.to_sfen()
    }

    /// 現局面から1手で `target` の盤面になる指し手を探す
    ///
    /// `target` は SFEN 全体でも盤面部分だけでもよい。比較は盤面部分で行い、
    /// 複数該当する場合は最初に見つかったものを返す。
    pub fn delta_move(&self, target: &str) -> Option<String> {
        let target_board = target.split(' ').next()?;
        self.position
            .legal_moves()
            .into_iter()
            .find(|&mv| self.position.after(mv).board_sfen() == target_board)
            .map(Move::to_usi)
    }

    /// 正準入力（出現回数は反転前の現局面で数えた値を使う）
    pub fn canonical_input(&self) -> Result<CanonicalInput, SfenError> {
        encode(&self.observation(), self.repetition_count())
    }

    /// 現局面の出現回数
    pub fn repetition_count(&self) -> u32 {
        self.repetition_counts.get(&self.position.board_sfen()).copied().unwrap_or(0)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// 先手番か
    pub fn black_to_move(&self) -> bool {
        self.position.side_to_move() == Color::Black
    }

    pub fn done(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn resigned(&self) -> bool {
        self.resigned
    }

    pub fn halfmove_count(&self) -> u32 {
        self.halfmove_count
    }

    /// "1-0" / "0-1" / "1/2-1/2"（未終局なら `None`）
    pub fn result(&self) -> Option<&'static str> {
        self.winner.map(Winner::result_str)
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}
