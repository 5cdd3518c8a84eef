//! Self-rescheduling sync timers.
//!
//! Each timer awaits its pass to completion before sleeping again, so a
//! pass can never overlap with itself and slow passes cannot stack up
//! overruns the way fixed-rate scheduling would.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::SyncConfig;
use crate::domain::chain::{ChainSource, ChainStore};
use crate::utils::logging;

use super::coordinator::SyncCoordinator;

/// The first new-tip fire waits this many periods so the startup full sync
/// can get ahead.
const NEW_SYNC_INITIAL_DELAY_PERIODS: u32 = 10;

/// Spawn the periodic new-tip and gap sync loops.
///
/// Old-history sync is not rescheduled here: it runs once at startup and
/// terminates for good when height 1 is reached.
pub fn spawn_sync_timers<S, T>(
    coordinator: Arc<SyncCoordinator<S, T>>,
    config: &SyncConfig,
) -> Vec<JoinHandle<()>>
where
    S: ChainSource + 'static,
    T: ChainStore + 'static,
{
    let new_interval = Duration::from_millis(config.new_state_interval_ms);
    let gap_interval = Duration::from_millis(config.missing_state_interval_ms);

    let new_tip = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            sleep(new_interval * NEW_SYNC_INITIAL_DELAY_PERIODS).await;
            loop {
                if let Err(e) = coordinator.sync_new_blocks().await {
                    logging::log_warning(&format!("New-tip sync failed: {}", e));
                }
                sleep(new_interval).await;
            }
        })
    };

    let gap = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            loop {
                sleep(gap_interval).await;
                if let Err(e) = coordinator.sync_missing_blocks().await {
                    logging::log_warning(&format!("Gap sync failed: {}", e));
                }
            }
        })
    };

    vec![new_tip, gap]
}
