//! 基本型モジュール
//!
//! 手番・筋・段・升・駒・手駒・指し手といった、局面表現の最小単位を定義する。
//! いずれも `Copy` な値型で、USI / SFEN 表記との相互変換を持つ。

mod color;
mod file;
mod hand;
mod moves;
mod piece;
mod rank;
mod square;

pub use color::Color;
pub use file::File;
pub use hand::Hand;
pub use moves::Move;
pub use piece::{Piece, PieceType};
pub use rank::Rank;
pub use square::Square;
