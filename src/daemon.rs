//! Periodic reconciliation loop.

use crate::reconciler::{ReconcileReport, Reconciler};
use crate::ui::output;
use futures_lite::StreamExt;
use smol::Timer;
use std::time::Duration;

/// Reconciles once right away, then once per `interval`, forever.
///
/// A pass that fails outright (unreadable config or mount table) is logged
/// and skipped; the next tick tries again. Passes never overlap: a tick that
/// fires while a pass is still running is picked up after it finishes.
pub async fn run_periodic(reconciler: &Reconciler, interval: Duration) {
    log::info!(
        "checking smb mounts every {} second(s)",
        interval.as_secs()
    );

    let mut ticks = Timer::interval(interval);

    loop {
        check_mounts(reconciler).await;
        if ticks.next().await.is_none() {
            break;
        }
    }
}

/// Runs one pass and logs its outcome.
pub async fn check_mounts(reconciler: &Reconciler) -> Option<ReconcileReport> {
    log::debug!("checking smb mounts...");

    match reconciler.update_mounts().await {
        Ok(report) => {
            output::log_pass_summary(&report);
            Some(report)
        }
        Err(e) => {
            log::error!("skipping smb mount check: {}", e);
            None
        }
    }
}
