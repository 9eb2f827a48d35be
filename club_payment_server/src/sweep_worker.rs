use club_payment_engine::{DepositFlowApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the reconciliation sweep worker. Do not await the returned JoinHandle, as it runs
/// indefinitely.
///
/// The sweep repairs the one gap the request path cannot: an order marked `Paid` whose member
/// credit failed after the status transition had already landed.
pub fn start_sweep_worker(db: SqliteDatabase, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        let api = DepositFlowApi::new(db);
        info!("🧹️ Ledger reconciliation sweep started (every {interval_secs}s)");
        loop {
            timer.tick().await;
            trace!("🧹️ Running ledger reconciliation sweep");
            match api.reconcile_missed_credits().await {
                Ok(repaired) if repaired.is_empty() => trace!("🧹️ No ledger gaps found"),
                Ok(repaired) => {
                    let ids = repaired.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ");
                    warn!("🧹️ Repaired {} ledger gap(s): {ids}", repaired.len());
                },
                Err(e) => {
                    error!("🧹️ Error running ledger reconciliation sweep: {e}");
                },
            }
        }
    })
}
