//! 対局ごとの学習データファイル
//!
//! 1局につき1ファイル。中身は JSON（パスが `.gz` で終われば gzip 圧縮）。

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use shogizero_core::labels::LabeledExample;
use shogizero_core::replay::GameOutput;
use shogizero_core::state::Winner;

use crate::common::io::{open_reader, write_atomic};
use crate::pipeline::ArtifactSink;

/// 1局分の学習データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub game_id: String,
    pub winner: Winner,
    pub plies: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<String>,
    pub examples: Vec<LabeledExample>,
}

impl GameData {
    pub fn from_output(game_id: impl Into<String>, output: GameOutput) -> Self {
        GameData {
            game_id: game_id.into(),
            winner: output.winner(),
            plies: output.moves.len() as u32,
            moves: output.moves,
            examples: output.examples,
        }
    }
}

/// 出力ファイルのパス（テンプレートの `{}` を対局IDで置き換える）
pub fn artifact_path(dir: &Path, tmpl: &str, game_id: &str) -> PathBuf {
    dir.join(tmpl.replacen("{}", game_id, 1))
}

pub fn write_game_data(path: &Path, data: &GameData) -> Result<()> {
    write_atomic(path, |w| {
        serde_json::to_writer(&mut *w, data)?;
        w.write_all(b"\n")
    })
    .with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_game_data(path: &Path) -> Result<GameData> {
    let reader = open_reader(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(reader).with_context(|| format!("failed to parse {}", path.display()))
}

/// 出力ディレクトリにある学習データファイル（名前順）
pub fn find_game_data_files(dir: &Path, tmpl: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(tmpl.replacen("{}", "*", 1));
    let pattern = pattern.to_string_lossy();
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid pattern {pattern}"))?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    Ok(files)
}

/// 学習データをディレクトリに書き出す保存先
#[derive(Debug, Clone)]
pub struct GameDataSink {
    dir: PathBuf,
    tmpl: String,
}

impl GameDataSink {
    pub fn new(dir: impl Into<PathBuf>, tmpl: impl Into<String>) -> Self {
        GameDataSink {
            dir: dir.into(),
            tmpl: tmpl.into(),
        }
    }

    pub fn path_for(&self, game_id: &str) -> PathBuf {
        artifact_path(&self.dir, &self.tmpl, game_id)
    }
}

impl ArtifactSink<GameData> for GameDataSink {
    fn exists(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }

    fn persist(&mut self, id: &str, data: GameData) -> Result<PathBuf> {
        let path = self.path_for(id);
        write_game_data(&path, &data)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shogizero_core::replay::{replay_game, RecordedGame};

    fn sample(game_id: &str) -> GameData {
        let moves = ["7g7f", "3c3d", "2g2f"].iter().map(|s| s.to_string()).collect();
        let out = replay_game(&RecordedGame::new(game_id, moves, Winner::Black)).unwrap();
        GameData::from_output(game_id, out)
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        for tmpl in ["play_{}.json", "play_{}.json.gz"] {
            let data = sample("g1");
            let path = artifact_path(dir.path(), tmpl, "g1");
            write_game_data(&path, &data).unwrap();
            let back = read_game_data(&path).unwrap();
            assert_eq!(back, data);
            assert_eq!(back.examples[2].policy[0].0, "2g2f");
            assert_eq!(back.plies, 3);
        }
    }

    #[test]
    fn test_artifact_path_and_find() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            artifact_path(dir.path(), "play_{}.json", "abc"),
            dir.path().join("play_abc.json")
        );

        let mut sink = GameDataSink::new(dir.path(), "play_{}.json");
        assert!(!sink.exists("b"));
        for id in ["b", "a"] {
            sink.persist(id, sample(id)).unwrap();
        }
        assert!(sink.exists("b"));
        let files = find_game_data_files(dir.path(), "play_{}.json").unwrap();
        assert_eq!(files, vec![dir.path().join("play_a.json"), dir.path().join("play_b.json")]);
    }

    #[test]
    fn test_read_missing_or_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_game_data(&dir.path().join("none.json")).is_err());
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_game_data(&path).is_err());
    }
}
