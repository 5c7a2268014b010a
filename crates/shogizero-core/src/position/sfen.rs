//! SFEN形式の解析・出力

use super::Position;
use crate::types::{Color, File, Hand, Piece, PieceType, Rank, Square};

/// 平手初期局面
pub const SFEN_HIRATE: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// SFEN解析エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SfenError {
    #[error("missing SFEN field: {0}")]
    MissingField(&'static str),

    #[error("expected 9 ranks, got {0}")]
    RankCount(usize),

    #[error("rank {rank} covers {width} files (expected 9)")]
    RankWidth { rank: usize, width: usize },

    #[error("invalid piece token {0:?}")]
    InvalidPiece(String),

    #[error("invalid side to move {0:?}")]
    InvalidSide(String),

    #[error("invalid hand {0:?}")]
    InvalidHand(String),

    #[error("invalid move number {0:?}")]
    InvalidPly(String),

    /// 手番でない側の玉に王手がかかっている
    #[error("{0:?} king is in check but it is not {0:?}'s turn")]
    OpponentInCheck(Color),
}

impl Position {
    /// 平手初期局面にする
    pub fn set_hirate(&mut self) {
        // 定数文字列の解析は失敗しない
        if let Err(e) = self.set_sfen(SFEN_HIRATE) {
            debug_assert!(false, "SFEN_HIRATE must parse: {e}");
        }
    }

    /// SFEN文字列から局面を設定する
    ///
    /// 手数欄は省略可能（省略時は1）。失敗した場合は局面を変更しない。
    pub fn set_sfen(&mut self, sfen: &str) -> Result<(), SfenError> {
        let mut fields = sfen.split_whitespace();
        let board_str = fields.next().ok_or(SfenError::MissingField("board"))?;
        let side_str = fields.next().ok_or(SfenError::MissingField("side to move"))?;
        let hand_str = fields.next().ok_or(SfenError::MissingField("hand"))?;
        let ply = match fields.next() {
            Some(s) => s.parse::<u32>().map_err(|_| SfenError::InvalidPly(s.to_string()))?,
            None => 1,
        };

        let board = parse_board(board_str)?;
        let side_to_move = match side_str {
            "b" => Color::Black,
            "w" => Color::White,
            other => return Err(SfenError::InvalidSide(other.to_string())),
        };
        let hands = parse_hands(hand_str)?;

        let candidate = Position {
            board,
            hands,
            side_to_move,
            ply,
        };
        let them = !side_to_move;
        if candidate.king_square(them).is_some_and(|k| candidate.is_attacked(k, side_to_move)) {
            return Err(SfenError::OpponentInCheck(them));
        }
        *self = candidate;
        Ok(())
    }

    /// SFEN文字列を作る（"board side hand ply"）
    pub fn to_sfen(&self) -> String {
        format!(
            "{} {} {} {}",
            self.board_sfen(),
            self.side_to_move.to_sfen_char(),
            self.hand_sfen(),
            self.ply
        )
    }

    /// 盤面部分のみの SFEN（千日手判定のキーに使う）
    pub fn board_sfen(&self) -> String {
        let mut out = String::with_capacity(64);
        for (i, rank) in Rank::ALL.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for file in File::ALL.iter().rev() {
                match self.piece_on(Square::new(*file, *rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push_str(&piece.to_sfen());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }

    /// 持ち駒部分の SFEN（先手→後手、飛角金銀桂香歩の順）
    pub fn hand_sfen(&self) -> String {
        let mut out = String::new();
        for color in Color::ALL {
            let hand = self.hand(color);
            for pt in PieceType::HAND_ORDER {
                let n = hand.count(pt);
                if n == 0 {
                    continue;
                }
                if n > 1 {
                    out.push_str(&n.to_string());
                }
                out.push_str(&Piece::new(color, pt).to_sfen());
            }
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }
}

fn parse_board(s: &str) -> Result<[Option<Piece>; Square::NUM], SfenError> {
    let rows: Vec<&str> = s.split('/').collect();
    if rows.len() != Rank::NUM {
        return Err(SfenError::RankCount(rows.len()));
    }
    let mut board = [None; Square::NUM];
    for (rank_idx, row) in rows.iter().enumerate() {
        let rank = Rank::ALL[rank_idx];
        // 列は9筋から数える
        let mut col = 0usize;
        let mut chars = row.chars();
        while let Some(c) = chars.next() {
            if let Some(d) = c.to_digit(10) {
                if d == 0 {
                    return Err(SfenError::InvalidPiece(c.to_string()));
                }
                col += d as usize;
                continue;
            }
            let (token, promoted, letter) = if c == '+' {
                let next = chars.next().ok_or_else(|| SfenError::InvalidPiece("+".to_string()))?;
                (format!("+{next}"), true, next)
            } else {
                (c.to_string(), false, c)
            };
            let piece = Piece::from_sfen(letter, promoted).ok_or(SfenError::InvalidPiece(token))?;
            if col >= File::NUM {
                return Err(SfenError::RankWidth {
                    rank: rank_idx + 1,
                    width: col + 1,
                });
            }
            let file = File::ALL[File::NUM - 1 - col];
            board[Square::new(file, rank).index()] = Some(piece);
            col += 1;
        }
        if col != File::NUM {
            return Err(SfenError::RankWidth {
                rank: rank_idx + 1,
                width: col,
            });
        }
    }
    Ok(board)
}

fn parse_hands(s: &str) -> Result<[Hand; Color::NUM], SfenError> {
    let mut hands = [Hand::EMPTY; Color::NUM];
    if s == "-" {
        return Ok(hands);
    }
    let invalid = || SfenError::InvalidHand(s.to_string());
    let mut count: Option<u32> = None;
    for c in s.chars() {
        if let Some(d) = c.to_digit(10) {
            count = Some(count.unwrap_or(0) * 10 + d);
            if count.is_some_and(|n| n > 18) {
                return Err(invalid());
            }
            continue;
        }
        let pt = PieceType::from_base_char(c).ok_or_else(invalid)?;
        if !pt.is_hand_piece() {
            return Err(invalid());
        }
        let n = count.take().unwrap_or(1);
        if n == 0 {
            return Err(invalid());
        }
        let color = if c.is_ascii_uppercase() {
            Color::Black
        } else {
            Color::White
        };
        hands[color.index()].set(pt, n as u8);
    }
    if count.is_some() {
        return Err(invalid());
    }
    Ok(hands)
}
