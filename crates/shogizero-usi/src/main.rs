use std::io::{self, BufWriter};

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env, Target};

use shogizero_usi::{run, UsiEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "shogizero USI engine")]
struct Cli {
    /// 指し手選択の温度（0 で常に同じ手）
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// 乱数シード
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    // 標準出力はプロトコル専用なのでログは標準エラーへ
    Builder::from_env(Env::default().default_filter_or("info")).target(Target::Stderr).init();
    let cli = Cli::parse();

    let mut engine = UsiEngine::new(cli.temperature, cli.seed);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(stdin.lock(), BufWriter::new(stdout.lock()), &mut engine)
}
