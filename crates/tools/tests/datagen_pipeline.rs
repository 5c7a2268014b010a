//! 棋譜ディレクトリから学習データファイルまでの結合テスト

use std::fs;

use shogizero_core::state::Winner;
use tools::config::DatagenConfig;
use tools::game_data::{artifact_path, find_game_data_files, read_game_data};
use tools::pipeline::Pipeline;
use tools::self_play::run_selfplay;
use tools::sl::run_supervised;

const GOOD: &str = "手合割：平手
先手：A
後手：B
   1 ７六歩(77)
   2 ３四歩(33)
   3 ２六歩(27)
   4 ８四歩(83)
   5 ２五歩(26)
   6 投了
まで5手で先手の勝ち
";

const ILLEGAL: &str = "   1 ７六歩(77)
   2 ７四歩(73)
   3 ７五歩(76)
   4 ７六歩(74)
";

const HANDICAP: &str = "手合割：角落ち
   1 ３四歩(33)
";

fn config_in(root: &std::path::Path) -> DatagenConfig {
    let mut config = DatagenConfig::default();
    config.resource.record_dir = root.join("kif");
    config.resource.play_data_dir = root.join("out");
    config.pipeline.max_workers = 2;
    config.pipeline.progress = false;
    config
}

#[test]
fn test_supervised_pipeline_is_isolated_and_resumable() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    fs::create_dir_all(&config.resource.record_dir).unwrap();
    fs::write(config.resource.record_dir.join("good.kif"), GOOD).unwrap();
    fs::write(config.resource.record_dir.join("illegal.kif"), ILLEGAL).unwrap();
    fs::write(config.resource.record_dir.join("handicap.kif"), HANDICAP).unwrap();
    config.validate(true).unwrap();

    let pipeline = Pipeline::new(2, 2).unwrap().with_progress(false);
    let summary = run_supervised(&config, &pipeline).unwrap();
    assert_eq!(summary.scheduled, 3);
    assert_eq!(summary.persisted, 1);
    assert_eq!(summary.failed, 2);

    let rc = &config.resource;
    let path = artifact_path(&rc.play_data_dir, &rc.play_data_filename_tmpl, "good");
    let data = read_game_data(&path).unwrap();
    assert_eq!(data.game_id, "good");
    assert_eq!(data.winner, Winner::Black);
    assert_eq!(data.plies, 5);
    let values: Vec<f32> = data.examples.iter().map(|e| e.value).collect();
    assert_eq!(values, vec![1.0, -1.0, 1.0, -1.0, 1.0]);
    assert_eq!(data.examples[4].policy, vec![("2f2e".to_string(), 1.0)]);

    // 2回目は保存済みの対局を投入しない
    let summary = run_supervised(&config, &pipeline).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.scheduled, 2);
    assert_eq!(summary.persisted, 0);
}

#[test]
fn test_selfplay_pipeline_writes_every_game() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_in(root.path());
    config.selfplay.games = 4;
    config.selfplay.max_game_length = 12;
    config.resource.play_data_filename_tmpl = "sp_{}.json.gz".to_string();
    config.validate(false).unwrap();

    let pipeline = Pipeline::new(2, 1).unwrap().with_progress(false);
    let summary = run_selfplay(&config, &pipeline).unwrap();
    assert_eq!(summary.persisted, 4);
    assert_eq!(summary.failed, 0);

    let rc = &config.resource;
    let files = find_game_data_files(&rc.play_data_dir, &rc.play_data_filename_tmpl).unwrap();
    assert_eq!(files.len(), 4);
    for file in files {
        let data = read_game_data(&file).unwrap();
        assert!(data.plies <= 12);
        assert_eq!(data.examples.len() as u32, data.plies);
    }
}
