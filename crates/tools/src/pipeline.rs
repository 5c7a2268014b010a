//! 対局単位の並列データ生成パイプライン
//!
//! crossbeam-channel ワーカーモデル:
//!
//! - 投入スレッド: 未処理の対局を容量つきチャネルに流す（投入済み・未完了の数を抑える）
//! - ワーカー: 対局ごとにジョブを実行し、結果を返す。ジョブのエラーや panic はその対局だけの失敗になる
//! - 集約（呼び出しスレッド）: 完了順に結果を受け取り、データがあれば書き出しキューへ、なければ警告を出す
//! - 書き出しスレッド: キューを順に保存する。`run` はこのスレッドを join してから戻る
//!
//! 保存先に既にある対局は投入前に除外するので、途中で止めても再実行で続きから処理できる。
//! Ctrl-C 後は新しい対局を投入せず、実行中の対局の完了を待って終わる。

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{bail, Result};
use crossbeam_channel as chan;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;

/// 対局ごとの成果物の保存先
pub trait ArtifactSink<R>: Send {
    /// 既に保存済みか
    fn exists(&self, id: &str) -> bool;

    /// 保存して保存先のパスを返す
    fn persist(&mut self, id: &str, data: R) -> Result<PathBuf>;
}

/// 実行結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// ワーカーに投入した対局数
    pub scheduled: usize,
    /// 保存できた対局数
    pub persisted: usize,
    /// ジョブが失敗した対局数
    pub failed: usize,
    /// 保存済みのため投入しなかった対局数
    pub skipped: usize,
    /// 保存に失敗した対局数
    pub write_errors: usize,
    /// 中断により結果を受け取らなかった対局数
    pub cancelled: usize,
}

pub struct Pipeline {
    workers: usize,
    max_in_flight: usize,
    shutdown: Arc<AtomicBool>,
    progress: bool,
}

impl Pipeline {
    pub fn new(workers: usize, max_in_flight: usize) -> Result<Self> {
        if workers == 0 {
            bail!("pipeline needs at least one worker");
        }
        Ok(Pipeline {
            workers,
            max_in_flight: max_in_flight.max(1),
            shutdown: Arc::new(AtomicBool::new(false)),
            progress: true,
        })
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// 外部から中断を指示するフラグ
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Ctrl-C で新規投入を止める
    pub fn install_ctrlc_handler(&self) {
        let shutdown = self.shutdown_flag();
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("\nShutting down gracefully...");
            shutdown.store(true, Ordering::Relaxed);
        }) {
            warn!("failed to install Ctrl-C handler: {e}");
        }
    }

    /// `tasks`（ID とジョブ入力の組）をすべて処理する
    pub fn run<T, R, J, S>(&self, tasks: Vec<(String, T)>, job: J, mut sink: S) -> PipelineSummary
    where
        T: Send,
        R: Send,
        J: Fn(&str, T) -> Result<R> + Sync,
        S: ArtifactSink<R>,
    {
        let mut summary = PipelineSummary::default();
        let pending: Vec<(String, T)> = tasks
            .into_iter()
            .filter(|(id, _)| {
                let done = sink.exists(id);
                if done {
                    debug!("skip {id}: already persisted");
                    summary.skipped += 1;
                }
                !done
            })
            .collect();
        let total = pending.len();
        info!(
            "pipeline: {total} games to process ({} skipped), workers={}, max_in_flight={}",
            summary.skipped, self.workers, self.max_in_flight
        );

        let progress = if self.progress {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let start_time = Instant::now();
        let shutdown = &self.shutdown;
        let job = &job;

        thread::scope(|s| {
            let (ticket_tx, ticket_rx) = chan::bounded::<(String, T)>(self.max_in_flight);
            let (result_tx, result_rx) = chan::bounded::<(String, Option<R>)>(self.max_in_flight);
            let (write_tx, write_rx) = chan::bounded::<(String, R)>(self.max_in_flight);

            // 投入
            let feeder = s.spawn(move || {
                let mut sent = 0usize;
                for ticket in pending {
                    if shutdown.load(Ordering::Relaxed) || ticket_tx.send(ticket).is_err() {
                        break;
                    }
                    sent += 1;
                }
                sent
            });

            // ワーカー
            for _ in 0..self.workers {
                let rx = ticket_rx.clone();
                let tx = result_tx.clone();
                s.spawn(move || {
                    while let Ok((id, input)) = rx.recv() {
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        let data = run_isolated(job, &id, input);
                        if tx.send((id, data)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(ticket_rx);
            drop(result_tx);

            // 書き出し
            let writer = s.spawn(move || {
                let mut persisted = 0usize;
                let mut errors = 0usize;
                for (id, data) in write_rx {
                    match sink.persist(&id, data) {
                        Ok(path) => {
                            info!("save play data to {}", path.display());
                            persisted += 1;
                        }
                        Err(e) => {
                            error!("failed to persist {id}: {e:#}");
                            errors += 1;
                        }
                    }
                }
                (persisted, errors)
            });

            // 集約: 完了順に受け取る
            let mut completed = 0usize;
            for (id, data) in result_rx {
                completed += 1;
                progress.inc(1);
                match data {
                    Some(data) => {
                        if write_tx.send((id, data)).is_err() {
                            summary.write_errors += 1;
                        }
                    }
                    None => {
                        warn!("invalid data: {id}");
                        summary.failed += 1;
                    }
                }
            }
            drop(write_tx);

            summary.scheduled = feeder.join().unwrap_or(0);
            summary.cancelled = summary.scheduled.saturating_sub(completed);
            match writer.join() {
                Ok((persisted, errors)) => {
                    summary.persisted = persisted;
                    summary.write_errors += errors;
                }
                Err(_) => error!("writer thread panicked"),
            }
        });

        progress.finish_and_clear();
        info!(
            "pipeline done in {:.1}s: scheduled={} persisted={} failed={} skipped={}",
            start_time.elapsed().as_secs_f64(),
            summary.scheduled,
            summary.persisted,
            summary.failed,
            summary.skipped
        );
        if summary.write_errors > 0 || summary.cancelled > 0 {
            warn!("write_errors={} cancelled={}", summary.write_errors, summary.cancelled);
        }
        summary
    }
}

/// ジョブを実行し、エラーも panic も `None` に畳む
fn run_isolated<T, R, J>(job: &J, id: &str, input: T) -> Option<R>
where
    J: Fn(&str, T) -> Result<R>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| job(id, input))) {
        Ok(Ok(data)) => Some(data),
        Ok(Err(e)) => {
            debug!("{id}: {e:#}");
            None
        }
        Err(_) => {
            error!("{id}: job panicked");
            None
        }
    }
}
