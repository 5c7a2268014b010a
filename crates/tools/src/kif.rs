//! KIF 形式の棋譜の読み込み
//!
//! 平手の本譜のみを対象とし、指し手を USI 形式に変換する。
//! 変化（`変化：` 以降）は読まない。文字コードは UTF-8 か Shift_JIS（cp932）。
//!
//! 勝者は次の順で決める:
//! 1. 末尾の `まで…で先手の勝ち` などの結果行
//! 2. 終局理由（投了・詰みなら最後に指した側、千日手・持将棋・中断なら引き分け）
//! 3. どちらもなければ手数の偶奇（最後に指した側の勝ち）

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use encoding_rs::SHIFT_JIS;
use log::info;
use regex::Regex;

use shogizero_core::replay::{derive_winner_by_parity, RecordedGame};
use shogizero_core::state::Winner;
use shogizero_core::types::Color;

static MOVE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s+(.*)$").expect("valid regex"));

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:([１-９1-9])([一二三四五六七八九])|[同仝][\s　]*)(成香|成桂|成銀|[歩香桂銀金角飛玉王と杏圭全馬龍竜])(不成|成)?(打)?(?:\(([1-9])([1-9])\))?",
    )
    .expect("valid regex")
});

static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^まで(\d+)手で(?:(先手|後手|下手|上手)の(勝ち|反則勝ち|反則負け|入玉勝ち)|(千日手|持将棋))")
        .expect("valid regex")
});

/// 終局を表す語
const TERMINATIONS: [&str; 11] = [
    "投了", "詰み", "千日手", "持将棋", "中断", "反則勝ち", "反則負け", "切れ負け", "入玉勝ち", "不戦勝", "不戦敗",
];

/// 棋譜解析エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KifError {
    #[error("unsupported handicap: {0}")]
    UnsupportedHandicap(String),

    #[error("line {line}: cannot parse move {text:?}")]
    Move { line: usize, text: String },

    #[error("line {line}: 同 without a previous move")]
    SameWithoutPrevious { line: usize },
}

/// 棋譜ディレクトリから棋譜ファイルを名前順に列挙する
pub fn find_record_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = dir.join(pattern);
    let full = full.to_string_lossy();
    let mut files: Vec<PathBuf> = glob::glob(&full)
        .with_context(|| format!("invalid pattern {full}"))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// ファイル名から対局IDを作る（最初の '.' より前）
pub fn game_id_for(path: &Path) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// 棋譜ファイルを読み込んで解析する
pub fn load_kif(path: &Path) -> Result<RecordedGame> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = decode_record(bytes)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    let game = parse_kif(&text, &game_id_for(path))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(game)
}

/// 棋譜のバイト列を文字列にする（UTF-8 でなければ Shift_JIS とみなす）
pub fn decode_record(bytes: Vec<u8>) -> Result<String> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Ok(text),
        Err(e) => e.into_bytes(),
    };
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(&bytes);
    if had_errors {
        bail!("neither UTF-8 nor Shift_JIS");
    }
    Ok(text.into_owned())
}

fn kanji_rank(c: char) -> Option<char> {
    let idx = "一二三四五六七八九".chars().position(|k| k == c)?;
    Some((b'a' + idx as u8) as char)
}

fn file_digit(c: char) -> Option<char> {
    match c {
        '１'..='９' => char::from_u32('1' as u32 + (c as u32 - '１' as u32)),
        '1'..='9' => Some(c),
        _ => None,
    }
}

fn drop_letter(piece: &str) -> Option<char> {
    Some(match piece {
        "歩" => 'P',
        "香" => 'L',
        "桂" => 'N',
        "銀" => 'S',
        "金" => 'G',
        "角" => 'B',
        "飛" => 'R',
        _ => return None,
    })
}

/// 指し手部分（"７六歩(77)" など）を USI に変換する
fn parse_move(text: &str, prev_dst: Option<&str>, line: usize) -> Result<String, KifError> {
    let bad = || KifError::Move {
        line,
        text: text.to_string(),
    };
    let caps = MOVE_RE.captures(text).ok_or_else(bad)?;
    let dst = match (caps.get(1), caps.get(2)) {
        (Some(f), Some(r)) => {
            let file = f.as_str().chars().next().and_then(file_digit).ok_or_else(bad)?;
            let rank = r.as_str().chars().next().and_then(kanji_rank).ok_or_else(bad)?;
            format!("{file}{rank}")
        }
        _ => prev_dst.ok_or(KifError::SameWithoutPrevious { line })?.to_string(),
    };
    let piece = caps.get(3).map_or("", |m| m.as_str());
    let promote = caps.get(4).is_some_and(|m| m.as_str() == "成");

    if caps.get(5).is_some() {
        let letter = drop_letter(piece).ok_or_else(bad)?;
        return Ok(format!("{letter}*{dst}"));
    }
    match (caps.get(6), caps.get(7)) {
        (Some(f), Some(r)) => {
            let rank = r.as_str().parse::<u8>().map_err(|_| bad())?;
            let rank = (b'a' + rank - 1) as char;
            Ok(format!("{}{rank}{dst}{}", f.as_str(), if promote { "+" } else { "" }))
        }
        // 移動元がない表記は駒打ちとみなす（"打" の省略）
        _ => {
            let letter = drop_letter(piece).ok_or_else(bad)?;
            Ok(format!("{letter}*{dst}"))
        }
    }
}

/// 結果行から勝者を読む
fn parse_summary(line: &str) -> Option<Winner> {
    let caps = SUMMARY_RE.captures(line)?;
    if caps.get(4).is_some() {
        return Some(Winner::Draw);
    }
    let side = match caps.get(2)?.as_str() {
        "先手" | "下手" => Color::Black,
        _ => Color::White,
    };
    match caps.get(3)?.as_str() {
        "反則負け" => Some(Winner::of(!side)),
        _ => Some(Winner::of(side)),
    }
}

/// 終局理由から勝者を決める（`side_to_move` は終局時の手番）
fn winner_from_termination(termination: &str, side_to_move: Color) -> Option<Winner> {
    match termination {
        "投了" | "詰み" | "切れ負け" | "反則負け" | "不戦敗" => Some(Winner::of(!side_to_move)),
        "反則勝ち" | "入玉勝ち" | "不戦勝" => Some(Winner::of(side_to_move)),
        "千日手" | "持将棋" | "中断" => Some(Winner::Draw),
        _ => None,
    }
}

/// KIF テキストを解析する
pub fn parse_kif(text: &str, game_id: &str) -> Result<RecordedGame, KifError> {
    let mut moves: Vec<String> = Vec::new();
    let mut prev_dst: Option<String> = None;
    let mut black_player = None;
    let mut white_player = None;
    let mut termination: Option<String> = None;
    let mut summary: Option<Winner> = None;

    for (i, raw) in text.trim_start_matches('\u{feff}').lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with('*')
            || line.starts_with('&')
        {
            continue;
        }
        if line.starts_with("変化：") || line.starts_with("変化:") {
            break;
        }
        if let Some((key, value)) = line.split_once('：') {
            match key {
                "手合割" => {
                    if value.trim() != "平手" {
                        return Err(KifError::UnsupportedHandicap(value.trim().to_string()));
                    }
                }
                "先手" => black_player = Some(value.trim().to_string()),
                "後手" => white_player = Some(value.trim().to_string()),
                _ => {}
            }
            continue;
        }
        if line.starts_with("まで") {
            summary = parse_summary(line);
            continue;
        }
        let Some(caps) = MOVE_LINE_RE.captures(line) else {
            continue;
        };
        if termination.is_some() {
            continue;
        }
        let body = caps.get(2).map_or("", |m| m.as_str()).trim_start();
        if let Some(word) = TERMINATIONS.iter().find(|w| body.starts_with(**w)) {
            termination = Some(word.to_string());
            continue;
        }
        let usi = parse_move(body, prev_dst.as_deref(), line_no)?;
        prev_dst = Some(usi[2..4].to_string());
        moves.push(usi);
    }

    let side_to_move = if moves.len() % 2 == 0 {
        Color::Black
    } else {
        Color::White
    };
    let by_termination =
        || termination.as_deref().and_then(|t| winner_from_termination(t, side_to_move));
    let winner = match summary.or_else(by_termination) {
        Some(w) => w,
        None => {
            let w = derive_winner_by_parity(moves.len());
            info!("{game_id}: no result recorded, winner {w} derived from move count");
            w
        }
    };

    let mut game = RecordedGame::new(game_id, moves, winner);
    game.black_player = black_player;
    game.white_player = white_player;
    game.termination = termination;
    Ok(game)
}
