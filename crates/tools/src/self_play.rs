//! 自己対局による学習データ生成

use anyhow::Result;
use chrono::Local;

use shogizero_core::player::{SelfPlayPlayer, UniformEvaluator};
use shogizero_core::selfplay::play_selfplay_game;

use crate::config::{DatagenConfig, SelfPlayConfig};
use crate::game_data::{GameData, GameDataSink};
use crate::pipeline::{Pipeline, PipelineSummary};
use crate::sl::log_game_done;

/// 設定された局数の自己対局を行い、対局ごとに学習データを書き出す
///
/// 対局IDは開始時刻と通し番号から作る。
pub fn run_selfplay(config: &DatagenConfig, pipeline: &Pipeline) -> Result<PipelineSummary> {
    let sp = &config.selfplay;
    let rc = &config.resource;
    let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
    let tasks: Vec<(String, u64)> =
        (0..sp.games as u64).map(|i| (format!("{stamp}_{i:05}"), i)).collect();
    let sink = GameDataSink::new(&rc.play_data_dir, &rc.play_data_filename_tmpl);
    Ok(pipeline.run(tasks, |game_id, index| selfplay_job(game_id, index, sp), sink))
}

/// `index` 番目の自己対局（乱数シードは設定値と番号から決まる）
pub fn selfplay_job(game_id: &str, index: u64, config: &SelfPlayConfig) -> Result<GameData> {
    let seed = config.seed.wrapping_add(index.wrapping_mul(2));
    let mut black = SelfPlayPlayer::new(UniformEvaluator, config.temperature, seed);
    let mut white = SelfPlayPlayer::new(UniformEvaluator, config.temperature, seed.wrapping_add(1));
    let output = play_selfplay_game(&mut black, &mut white, config.max_game_length)?;
    log_game_done(game_id, &output);
    Ok(GameData::from_output(game_id, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selfplay_job_is_seeded() {
        let config = SelfPlayConfig {
            games: 1,
            max_game_length: 16,
            temperature: 1.0,
            seed: 42,
        };
        let a = selfplay_job("a", 3, &config).unwrap();
        let b = selfplay_job("b", 3, &config).unwrap();
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.examples.len(), a.moves.len());
        assert!(a.plies <= 16);
    }
}
