//! 局面表現モジュール
//!
//! 将棋の局面を表現し、合法手の生成と手の実行を行う。
//!
//! - `Position`: 局面本体（盤面配列・手駒・手番・手数）
//! - SFEN形式の解析・出力（`SfenError`）
//! - 合法手生成と合法性判定（`MoveError`）
//!
//! `Position` は小さな値型で、仮の手を試すときは `after` で複製した局面に指す。
//! 盤面配列と手駒は `do_move` を通じてのみ更新され、常に互いに整合している。

mod movegen;
mod pos;
mod sfen;

pub use pos::{MoveError, Position};
pub use sfen::{SfenError, SFEN_HIRATE};
