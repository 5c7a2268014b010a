/// 自己対局で学習データを生成する。
///
/// 評価器は一様分布（全合法手に同じ確率）で、温度付きサンプリングで指し手を選ぶ。
/// 手数上限に達した対局は引き分けとして記録する。
///
/// # 使用例
///
/// ```shell
/// cargo run -p tools --release --bin selfplay_datagen -- \
///   --games 1000 --max-game-length 256 --seed 1 --play-data-dir data/selfplay
/// ```
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use tools::config::DatagenConfig;
use tools::pipeline::Pipeline;
use tools::self_play::run_selfplay;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate training data by self-play")]
struct Cli {
    /// 設定ファイル（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 対局数
    #[arg(long)]
    games: Option<usize>,

    /// 1局あたりの最大手数
    #[arg(long)]
    max_game_length: Option<u32>,

    /// 指し手選択の温度
    #[arg(long)]
    temperature: Option<f32>,

    /// 乱数シード
    #[arg(long)]
    seed: Option<u64>,

    /// 出力ディレクトリ
    #[arg(long)]
    play_data_dir: Option<PathBuf>,

    /// ワーカースレッド数
    #[arg(long)]
    workers: Option<usize>,

    /// 進捗バーを表示しない
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DatagenConfig::load_or_default(cli.config.as_deref())?;
    if let Some(n) = cli.games {
        config.selfplay.games = n;
    }
    if let Some(n) = cli.max_game_length {
        config.selfplay.max_game_length = n;
    }
    if let Some(t) = cli.temperature {
        config.selfplay.temperature = t;
    }
    if let Some(seed) = cli.seed {
        config.selfplay.seed = seed;
    }
    if let Some(dir) = cli.play_data_dir {
        config.resource.play_data_dir = dir;
    }
    if let Some(n) = cli.workers {
        config.pipeline.max_workers = n;
    }
    if cli.no_progress {
        config.pipeline.progress = false;
    }
    config.validate(false)?;

    let pipeline = Pipeline::new(
        config.pipeline.max_workers,
        config.pipeline.effective_in_flight(),
    )?
    .with_progress(config.pipeline.progress);
    pipeline.install_ctrlc_handler();

    let summary = run_selfplay(&config, &pipeline)?;
    info!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
