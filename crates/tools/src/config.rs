//! 学習データ生成の設定
//!
//! TOML ファイルから読み込む。省略した項目はすべて既定値になり、
//! 各バイナリのコマンドライン引数で上書きできる。
//!
//! ```toml
//! [resource]
//! record_dir = "data/kif"
//! play_data_dir = "data/play_data"
//!
//! [pipeline]
//! max_workers = 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatagenConfig {
    pub resource: ResourceConfig,
    pub pipeline: PipelineConfig,
    pub selfplay: SelfPlayConfig,
}

/// 入出力の場所
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
    /// 棋譜ファイルのディレクトリ
    pub record_dir: PathBuf,
    /// 棋譜ファイル名の glob パターン
    pub record_pattern: String,
    /// 学習データの出力先
    pub play_data_dir: PathBuf,
    /// 出力ファイル名（`{}` が対局IDに置き換わる。`.gz` で終われば圧縮）
    pub play_data_filename_tmpl: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            record_dir: PathBuf::from("data/kif"),
            record_pattern: "*.kif".to_string(),
            play_data_dir: PathBuf::from("data/play_data"),
            play_data_filename_tmpl: "play_{}.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// ワーカースレッド数
    pub max_workers: usize,
    /// 投入済みで未完了の対局数の上限（0 ならワーカー数の2倍）
    pub max_in_flight: usize,
    /// 進捗バーを表示する
    pub progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_workers: 3,
            max_in_flight: 0,
            progress: true,
        }
    }
}

impl PipelineConfig {
    pub fn effective_in_flight(&self) -> usize {
        if self.max_in_flight == 0 {
            self.max_workers * 2
        } else {
            self.max_in_flight
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelfPlayConfig {
    /// 生成する対局数
    pub games: usize,
    /// この手数で引き分けにする
    pub max_game_length: u32,
    /// 指し手選択の温度（0 で最善手のみ）
    pub temperature: f32,
    /// 乱数シード（対局ごとにずらして使う）
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            games: 100,
            max_game_length: 512,
            temperature: 1.0,
            seed: 0,
        }
    }
}

impl DatagenConfig {
    /// TOML ファイルを読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// パスが与えられていれば読み込み、なければ既定値
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// 実行前に致命的な設定誤りを検出する
    pub fn validate(&self, needs_records: bool) -> Result<()> {
        if self.pipeline.max_workers == 0 {
            bail!("pipeline.max_workers must be at least 1");
        }
        if !self.resource.play_data_filename_tmpl.contains("{}") {
            bail!(
                "resource.play_data_filename_tmpl must contain {{}}: {}",
                self.resource.play_data_filename_tmpl
            );
        }
        if needs_records && !self.resource.record_dir.is_dir() {
            bail!("record directory not found: {}", self.resource.record_dir.display());
        }
        fs::create_dir_all(&self.resource.play_data_dir).with_context(|| {
            format!("failed to create {}", self.resource.play_data_dir.display())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: DatagenConfig = toml::from_str(
            r#"
            [resource]
            record_dir = "records"
            [selfplay]
            games = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.resource.record_dir, PathBuf::from("records"));
        assert_eq!(cfg.resource.record_pattern, "*.kif");
        assert_eq!(cfg.pipeline.max_workers, 3);
        assert_eq!(cfg.pipeline.effective_in_flight(), 6);
        assert_eq!(cfg.selfplay.games, 4);
        assert_eq!(cfg.selfplay.max_game_length, 512);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<DatagenConfig>("[pipeline]\nworkers = 2\n").is_err());
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = DatagenConfig::default();
        cfg.resource.record_dir = dir.path().to_path_buf();
        cfg.resource.play_data_dir = dir.path().join("out");
        cfg.validate(true).unwrap();
        assert!(cfg.resource.play_data_dir.is_dir());

        cfg.resource.record_dir = dir.path().join("missing");
        assert!(cfg.validate(true).is_err());
        cfg.validate(false).unwrap();

        cfg.pipeline.max_workers = 0;
        assert!(cfg.validate(false).is_err());
        cfg.pipeline.max_workers = 1;
        cfg.resource.play_data_filename_tmpl = "play.json".to_string();
        assert!(cfg.validate(false).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagen.toml");
        fs::write(&path, "[pipeline]\nmax_workers = 8\nmax_in_flight = 4\n").unwrap();
        let cfg = DatagenConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(cfg.pipeline.max_workers, 8);
        assert_eq!(cfg.pipeline.effective_in_flight(), 4);
        assert_eq!(DatagenConfig::load_or_default(None).unwrap(), DatagenConfig::default());
    }
}
