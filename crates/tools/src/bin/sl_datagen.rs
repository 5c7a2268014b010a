/// 棋譜（KIF）から教師あり学習データを生成する。
///
/// 棋譜ディレクトリの `*.kif` を1局ずつ並列に再生し、対局ごとに
/// `play_data_dir/play_<対局ID>.json` を書き出す。既に出力がある対局は飛ばすので、
/// 中断しても同じコマンドで続きから再開できる。
///
/// # 使用例
///
/// ```shell
/// cargo run -p tools --release --bin sl_datagen -- \
///   --record-dir data/kif --play-data-dir data/play_data --workers 8
/// ```
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use tools::config::DatagenConfig;
use tools::pipeline::Pipeline;
use tools::sl::run_supervised;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate supervised training data from KIF records")]
struct Cli {
    /// 設定ファイル（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 棋譜ディレクトリ
    #[arg(long)]
    record_dir: Option<PathBuf>,

    /// 棋譜ファイル名の glob パターン
    #[arg(long)]
    pattern: Option<String>,

    /// 出力ディレクトリ
    #[arg(long)]
    play_data_dir: Option<PathBuf>,

    /// ワーカースレッド数
    #[arg(long)]
    workers: Option<usize>,

    /// 投入済み・未完了の対局数の上限
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// 進捗バーを表示しない
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply(&self, config: &mut DatagenConfig) {
        if let Some(dir) = &self.record_dir {
            config.resource.record_dir = dir.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.resource.record_pattern = pattern.clone();
        }
        if let Some(dir) = &self.play_data_dir {
            config.resource.play_data_dir = dir.clone();
        }
        if let Some(n) = self.workers {
            config.pipeline.max_workers = n;
        }
        if let Some(n) = self.max_in_flight {
            config.pipeline.max_in_flight = n;
        }
        if self.no_progress {
            config.pipeline.progress = false;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DatagenConfig::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate(true)?;

    let pipeline = Pipeline::new(
        config.pipeline.max_workers,
        config.pipeline.effective_in_flight(),
    )?
    .with_progress(config.pipeline.progress);
    pipeline.install_ctrlc_handler();

    let summary = run_supervised(&config, &pipeline)?;
    info!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
