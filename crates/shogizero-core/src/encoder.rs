//! ネットワーク入力（正準入力）の生成
//!
//! 局面を常に「先手番」から見た形に揃えてから `(44, 9, 9)` の平面に展開する。
//! 後手番の局面は盤面を180度回転し、駒の先後（大文字/小文字）と手番を入れ替える。
//!
//! 平面の並び:
//! - 0..28: 盤上の駒（`tables::PIECES` の順、one-hot）
//! - 28..42: 手駒の枚数（`tables::HAND_PIECES` の順、全升に同じ値）
//! - 42: 現局面の出現回数
//! - 43: 手数（SFEN の手数欄）

use crate::position::SfenError;
use crate::tables::{hand_piece_index, piece_index_of, NUM_HAND_PIECES, NUM_PIECES};
use crate::types::Move;

/// 平面数
pub const NUM_PLANES: usize = NUM_PIECES + NUM_HAND_PIECES + 2;

/// 1平面の升数
pub const PLANE_SIZE: usize = 81;

/// 出現回数の平面番号
pub const REPETITION_PLANE: usize = NUM_PIECES + NUM_HAND_PIECES;

/// 手数の平面番号
pub const MOVE_NUMBER_PLANE: usize = REPETITION_PLANE + 1;

/// SFEN をフィールドごとに分けたもの
///
/// 反転は文字列レベルで行い、数値フィールドには手を触れない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfenInfo {
    board: String,
    turn: String,
    hand: String,
    counters: Vec<String>,
    move_number: u32,
}

impl SfenInfo {
    /// "board turn hand move_number" 形式を分解する
    pub fn parse(sfen: &str) -> Result<Self, SfenError> {
        let fields: Vec<&str> = sfen.split(' ').collect();
        let board = fields
            .first()
            .filter(|s| !s.is_empty())
            .ok_or(SfenError::MissingField("board"))?;
        let turn = fields.get(1).ok_or(SfenError::MissingField("side to move"))?;
        let hand = fields.get(2).ok_or(SfenError::MissingField("hand"))?;
        let counter = fields.get(3).ok_or(SfenError::MissingField("move number"))?;
        if *turn != "b" && *turn != "w" {
            return Err(SfenError::InvalidSide(turn.to_string()));
        }
        let move_number =
            counter.parse::<u32>().map_err(|_| SfenError::InvalidPly(counter.to_string()))?;
        Ok(SfenInfo {
            board: board.to_string(),
            turn: turn.to_string(),
            hand: hand.to_string(),
            counters: fields[3..].iter().map(|s| s.to_string()).collect(),
            move_number,
        })
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn turn(&self) -> &str {
        &self.turn
    }

    pub fn hand(&self) -> &str {
        &self.hand
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// 先手番（正準の向き）か
    pub fn is_black_to_move(&self) -> bool {
        self.turn == "b"
    }

    /// 元の SFEN 文字列に戻す
    pub fn to_sfen(&self) -> String {
        let mut parts = vec![self.board.as_str(), self.turn.as_str(), self.hand.as_str()];
        parts.extend(self.counters.iter().map(String::as_str));
        parts.join(" ")
    }

    /// 先後を入れ替えた SFEN 情報
    ///
    /// 盤面は180度回転（段の並びと各段内のトークン列を反転）し、駒文字の大小を入れ替える。
    /// 手番は入れ替え、持ち駒は大小のみ入れ替える。2回適用すると元に戻る。
    pub fn mirror(&self) -> SfenInfo {
        let board = self
            .board
            .split('/')
            .rev()
            .map(|row| {
                let mut tokens = tokenize_row(row);
                tokens.reverse();
                swap_case(&tokens.concat())
            })
            .collect::<Vec<_>>()
            .join("/");
        let turn = match self.turn.as_str() {
            "b" => "w".to_string(),
            _ => "b".to_string(),
        };
        SfenInfo {
            board,
            turn,
            hand: swap_case(&self.hand),
            counters: self.counters.clone(),
            move_number: self.move_number,
        }
    }

    /// 盤面を駒インデックスの 9x9 配列に展開する（空き升は `None`）
    ///
    /// 行は SFEN の段の順（1段目から）、列は SFEN の並び（9筋から）。
    pub fn indexed_board(&self) -> Result<[[Option<usize>; 9]; 9], SfenError> {
        let mut grid = [[None; 9]; 9];
        let rows: Vec<&str> = self.board.split('/').collect();
        if rows.len() != 9 {
            return Err(SfenError::RankCount(rows.len()));
        }
        for (i, row) in rows.iter().enumerate() {
            let mut col = 0usize;
            for token in tokenize_row(row) {
                if let Ok(n) = token.parse::<usize>() {
                    col += n;
                    continue;
                }
                let mut chars = token.chars();
                let (promoted, letter) = match (chars.next(), chars.next()) {
                    (Some('+'), Some(c)) => (true, c),
                    (Some(c), None) => (false, c),
                    _ => return Err(SfenError::InvalidPiece(token)),
                };
                let idx = piece_index_of(promoted, letter).ok_or(SfenError::InvalidPiece(token))?;
                if col >= 9 {
                    return Err(SfenError::RankWidth {
                        rank: i + 1,
                        width: col + 1,
                    });
                }
                grid[i][col] = Some(idx);
                col += 1;
            }
            if col != 9 {
                return Err(SfenError::RankWidth {
                    rank: i + 1,
                    width: col,
                });
            }
        }
        Ok(grid)
    }

    /// 持ち駒を手駒インデックスごとの枚数に展開する
    ///
    /// `-` は持ち駒なし。駒文字の直前の数字はその駒の枚数（省略時は1）。
    pub fn indexed_hand(&self) -> Result<[u32; NUM_HAND_PIECES], SfenError> {
        let mut counts = [0u32; NUM_HAND_PIECES];
        let mut num: Option<u32> = None;
        for c in self.hand.chars() {
            if c == '-' {
                break;
            }
            if let Some(d) = c.to_digit(10) {
                num = Some(num.unwrap_or(0) * 10 + d);
                continue;
            }
            let idx = hand_piece_index(c).ok_or_else(|| SfenError::InvalidHand(self.hand.clone()))?;
            counts[idx] = num.take().unwrap_or(1);
        }
        Ok(counts)
    }
}

/// 盤面の1段をトークン（数字・駒文字・'+'付き駒文字）に分ける
fn tokenize_row(row: &str) -> Vec<String> {
    let mut tokens = Vec::with_capacity(9);
    let mut chars = row.chars();
    while let Some(c) = chars.next() {
        if c == '+' {
            let mut token = String::from('+');
            if let Some(next) = chars.next() {
                token.push(next);
            }
            tokens.push(token);
        } else {
            tokens.push(c.to_string());
        }
    }
    tokens
}

fn swap_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// 正準入力テンソル（`NUM_PLANES x 9 x 9`、行優先の f32）
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalInput {
    data: Vec<f32>,
}

impl CanonicalInput {
    /// テンソルの形状
    pub const SHAPE: [usize; 3] = [NUM_PLANES, 9, 9];

    /// SFEN情報（向き調整済み）と出現回数から作る
    pub fn create(info: &SfenInfo, repetition_count: u32) -> Result<Self, SfenError> {
        let mut data = vec![0.0f32; NUM_PLANES * PLANE_SIZE];

        let grid = info.indexed_board()?;
        for (i, row) in grid.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                if let Some(piece) = cell {
                    data[piece * PLANE_SIZE + i * 9 + j] = 1.0;
                }
            }
        }

        let hand = info.indexed_hand()?;
        for (idx, &count) in hand.iter().enumerate() {
            if count > 0 {
                let plane = NUM_PIECES + idx;
                data[plane * PLANE_SIZE..(plane + 1) * PLANE_SIZE].fill(count as f32);
            }
        }

        data[REPETITION_PLANE * PLANE_SIZE..(REPETITION_PLANE + 1) * PLANE_SIZE]
            .fill(repetition_count as f32);
        data[MOVE_NUMBER_PLANE * PLANE_SIZE..(MOVE_NUMBER_PLANE + 1) * PLANE_SIZE]
            .fill(info.move_number() as f32);

        Ok(CanonicalInput { data })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// 1平面（81要素）
    pub fn plane(&self, plane: usize) -> &[f32] {
        &self.data[plane * PLANE_SIZE..(plane + 1) * PLANE_SIZE]
    }

    /// (平面, 行, 列) の値
    pub fn get(&self, plane: usize, row: usize, col: usize) -> f32 {
        self.data[plane * PLANE_SIZE + row * 9 + col]
    }
}

/// SFEN と現局面の出現回数から正準入力を作る
///
/// 後手番なら反転してから展開する。出現回数は呼び出し側が反転前の局面で数えた値を渡す。
pub fn encode(sfen: &str, repetition_count: u32) -> Result<CanonicalInput, SfenError> {
    let info = SfenInfo::parse(sfen)?;
    let info = if info.is_black_to_move() {
        info
    } else {
        info.mirror()
    };
    CanonicalInput::create(&info, repetition_count)
}

/// USI指し手を盤面の180度回転に合わせて変換する（打つ駒の文字は大文字のまま）
pub fn mirror_usi_move(usi: &str) -> Option<String> {
    let mv = match Move::from_usi(usi)? {
        Move::Normal { from, to, promote } => Move::Normal {
            from: from.inverse(),
            to: to.inverse(),
            promote,
        },
        Move::Drop { piece_type, to } => Move::Drop {
            piece_type,
            to: to.inverse(),
        },
    };
    Some(mv.to_usi())
}
