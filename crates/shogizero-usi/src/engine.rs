//! USI コマンドループ
//!
//! 標準入出力に限らず `BufRead` / `Write` の上で動く。UCI 風の別名
//! (`uci`, `ucinewgame`, `position fen`) も受け付ける。

use std::io::{BufRead, Write};

use anyhow::Result;
use log::{debug, info, warn};

use shogizero_core::player::{Player, SelfPlayPlayer, UniformEvaluator};
use shogizero_core::state::GameState;

use crate::position::{apply_position, parse_position_line};

pub const ENGINE_NAME: &str = "ShogiZero";
pub const ENGINE_AUTHOR: &str = "ShogiZero";

/// コマンド処理後にループを続けるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// USI エンジン本体
pub struct UsiEngine {
    state: GameState,
    player: SelfPlayPlayer<UniformEvaluator>,
}

impl UsiEngine {
    /// `temperature` が 0 なら同じ局面に対して常に同じ手を返す
    pub fn new(temperature: f32, seed: u64) -> Self {
        UsiEngine {
            state: GameState::new(),
            player: SelfPlayPlayer::new(UniformEvaluator, temperature, seed),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// 1行分のコマンドを処理する
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let line = line.trim();
        let (command, _rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "" => {}
            "usi" | "uci" => {
                writeln!(out, "id name {ENGINE_NAME}")?;
                writeln!(out, "id author {ENGINE_AUTHOR}")?;
                writeln!(out, "{command}ok")?;
            }
            "isready" => writeln!(out, "readyok")?,
            "usinewgame" | "ucinewgame" => {
                self.state.reset();
            }
            "position" => match parse_position_line(line) {
                Ok(parsed) => {
                    if let Err(e) = apply_position(&mut self.state, &parsed) {
                        warn!("{e:#}");
                    }
                }
                Err(e) => warn!("invalid position command '{line}': {e:#}"),
            },
            "go" => {
                let best = self.best_move()?;
                writeln!(out, "bestmove {best}")?;
            }
            "stop" | "ponderhit" | "gameover" => {}
            "quit" => return Ok(Flow::Quit),
            _ => warn!("unknown command: {line}"),
        }
        out.flush()?;
        Ok(Flow::Continue)
    }

    fn best_move(&mut self) -> Result<String> {
        if self.state.done() {
            return Ok("resign".to_string());
        }
        let action = self.player.action(&self.state, None)?;
        // 対局中の方策ラベルは使わない
        self.player.finish_game(0.0);
        debug!("go: {} -> {:?}", self.state.observation(), action);
        Ok(action.unwrap_or_else(|| "resign".to_string()))
    }
}

/// 入力が尽きるか `quit` を受け取るまでコマンドを処理する
pub fn run<R: BufRead, W: Write>(input: R, mut output: W, engine: &mut UsiEngine) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        debug!("< {line}");
        if engine.handle_line(&line, &mut output)? == Flow::Quit {
            info!("quit");
            break;
        }
    }
    Ok(())
}
