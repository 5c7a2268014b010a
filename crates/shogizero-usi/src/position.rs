//! `position` コマンドの解析と適用

use anyhow::{bail, Context, Result};
use log::warn;

use shogizero_core::state::{GameState, Transition};

/// `position` 行を分解した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPosition {
    pub startpos: bool,
    pub sfen: Option<String>,
    pub moves: Vec<String>,
}

/// `position ...` 形式の行をパースする
///
/// `sfen` の代わりに `fen` も受け付ける。先頭の `position` は省略できる。
pub fn parse_position_line(line: &str) -> Result<ParsedPosition> {
    let mut tokens = line.split_whitespace().peekable();
    if tokens.peek().is_some_and(|tok| *tok == "position") {
        tokens.next();
    }
    match tokens.next() {
        Some("startpos") => {
            let moves = parse_moves(tokens)?;
            Ok(ParsedPosition {
                startpos: true,
                sfen: None,
                moves,
            })
        }
        Some("sfen" | "fen") => {
            let mut sfen_tokens = Vec::new();
            while let Some(token) = tokens.next_if(|tok| *tok != "moves") {
                sfen_tokens.push(token);
            }
            if sfen_tokens.is_empty() {
                bail!("missing SFEN payload");
            }
            let moves = parse_moves(tokens)?;
            Ok(ParsedPosition {
                startpos: false,
                sfen: Some(sfen_tokens.join(" ")),
                moves,
            })
        }
        other => bail!("expected 'startpos' or 'sfen' after 'position', got {:?}", other),
    }
}

/// moves トークン以降を USI 形式の指し手列として回収する
pub fn parse_moves<'a, I>(iter: I) -> Result<Vec<String>>
where
    I: Iterator<Item = &'a str>,
{
    let mut iter = iter.peekable();
    match iter.peek() {
        Some(&"moves") => {
            iter.next();
            Ok(iter.map(|mv| mv.to_string()).collect())
        }
        Some(other) => bail!("expected 'moves' before move list, got '{other}'"),
        None => Ok(Vec::new()),
    }
}

/// 局面を設定し、指し手を終局判定なしで順に進める
///
/// 途中の手が非合法ならそこで止めてエラーを返す（状態はその手で終局扱いになる）。
pub fn apply_position(state: &mut GameState, parsed: &ParsedPosition) -> Result<()> {
    if parsed.startpos {
        state.reset();
    } else if let Some(sfen) = &parsed.sfen {
        state.update(sfen).with_context(|| format!("invalid sfen '{sfen}'"))?;
    } else {
        bail!("missing sfen payload");
    }
    for (i, mv) in parsed.moves.iter().enumerate() {
        match state.apply_move(Some(mv), false) {
            Transition::Applied(_) | Transition::Repetition(_) => {}
            Transition::IllegalMove(e) => bail!("illegal move '{mv}' at {}: {e}", i + 1),
            other => {
                warn!("move '{mv}' ignored: {other:?}");
                break;
            }
        }
    }
    Ok(())
}
