//! SchedulerLoop - 一定間隔で run_cycle を回すバックグラウンドタスク
//!
//! - 次の周期は前の周期が終わってから poll_interval 後（重ならない）
//! - 周期内の panic は捕まえてログに残し、ループは続行する

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::scheduler::Scheduler;

/// Loop handle.
/// - `shutdown_tx` を drop するとループが止まる
/// - `shutdown_and_join()` で実行中の周期の終了を待てる
pub struct SchedulerLoop {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerLoop {
    /// Spawn the loop. The first cycle runs immediately.
    pub fn spawn(scheduler: Arc<Scheduler>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(supervise(scheduler, shutdown_rx));
        Self { shutdown_tx, join }
    }

    /// Stop scheduling new cycles. An in-flight cycle runs to completion.
    pub fn request_shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            error!(error = %e, "scheduler loop ended abnormally");
        }
    }
}

async fn supervise(scheduler: Arc<Scheduler>, mut shutdown_rx: watch::Receiver<bool>) {
    let interval = scheduler.config().poll_interval();
    info!(interval_ms = interval.as_millis() as u64, "scheduler loop started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // 周期ごとに別タスクにして panic を JoinError として受け取る
        let cycle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.run_cycle().await }
        });
        match cycle.await {
            Ok(report) if report.has_activity() => {
                info!(
                    admitted = report.admitted,
                    dispatched = report.dispatched,
                    failed = report.failed,
                    skipped = report.skipped,
                    generation_failed = report.generation_failed,
                    "scheduler cycle finished"
                );
            }
            Ok(_) => debug!("scheduler cycle idle"),
            Err(e) if e.is_panic() => error!("scheduler cycle panicked; continuing"),
            Err(e) => error!(error = %e, "scheduler cycle aborted; continuing"),
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender dropped
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("scheduler loop stopped");
}
