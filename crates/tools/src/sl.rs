//! 棋譜からの教師あり学習データ生成

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};

use shogizero_core::replay::{replay_game, GameOutput};

use crate::config::DatagenConfig;
use crate::game_data::{GameData, GameDataSink};
use crate::kif::{find_record_files, game_id_for, load_kif};
use crate::pipeline::{Pipeline, PipelineSummary};

/// 棋譜ディレクトリの全棋譜を再生し、対局ごとに学習データを書き出す
pub fn run_supervised(config: &DatagenConfig, pipeline: &Pipeline) -> Result<PipelineSummary> {
    let rc = &config.resource;
    let files = find_record_files(&rc.record_dir, &rc.record_pattern)?;
    info!("found {} record files in {}", files.len(), rc.record_dir.display());
    let tasks: Vec<(String, PathBuf)> = files.into_iter().map(|p| (game_id_for(&p), p)).collect();
    let sink = GameDataSink::new(&rc.play_data_dir, &rc.play_data_filename_tmpl);
    Ok(pipeline.run(tasks, supervised_job, sink))
}

/// 1つの棋譜ファイルを読み込んで再生する
pub fn supervised_job(game_id: &str, path: PathBuf) -> Result<GameData> {
    let game = load_kif(&path)?;
    let output = replay_game(&game)
        .with_context(|| format!("failed to replay {}", path.display()))?;
    log_game_done(game_id, &output);
    Ok(GameData::from_output(game_id, output))
}

pub(crate) fn log_game_done(game_id: &str, output: &GameOutput) {
    let state = &output.state;
    debug!(
        "game {game_id} halfmoves={:3} {:12}{}{}",
        state.halfmove_count(),
        output.winner(),
        if state.resigned() {
            " by resign "
        } else {
            "           "
        },
        state.position().board_sfen()
    );
}
