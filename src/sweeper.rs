use log::info;

use crate::state::AppState;

/// Recurring expiry sweep. Runs on a fixed interval independent of any
/// share's TTL, so a share can outlive its deadline by up to one interval.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(state.store.config().sweep_interval);

    // First tick completes immediately; consume it so the loop waits a
    // full interval before the first pass.
    interval.tick().await;

    loop {
        interval.tick().await;
        info!("Running cleanup sweep...");
        let removed = state.store.sweep_expired().await;
        if removed > 0 {
            info!("Sweep removed {} expired share(s)", removed);
        }
    }
}
