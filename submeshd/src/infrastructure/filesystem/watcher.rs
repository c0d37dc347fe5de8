//! File-stability debounce for the scanner (§5): poll a candidate
//! file's size every 500 ms, declare it stable after N consecutive
//! identical reads (N derived from a ~2s debounce window), time out at
//! 2x the window and proceed anyway. A new event for a path already
//! being waited on cancels the earlier waiter. Single-threaded updates
//! to the debounce map, per §5's shared-resource discipline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy)]
pub struct StabilityConfig {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            debounce_window: Duration::from_secs(2),
        }
    }
}

pub struct FileStabilityWatcher {
    config: StabilityConfig,
    waiters: Mutex<HashMap<PathBuf, AbortHandle>>,
}

impl FileStabilityWatcher {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            waiters: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until `path`'s size is stable (or the timeout elapses),
    /// cancelling any prior waiter on the same path. Returns `true` if
    /// it settled normally (stable or timed out and proceeded anyway),
    /// `false` if a newer event cancelled this wait first.
    pub async fn wait_for_stable(&self, path: PathBuf) -> bool {
        let (tx, rx) = oneshot::channel();
        let config = self.config;
        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            let _ = poll_until_stable(&task_path, config).await;
            let _ = tx.send(());
        });

        {
            let mut waiters = self.waiters.lock().await;
            if let Some(previous) = waiters.insert(path.clone(), handle.abort_handle()) {
                previous.abort();
            }
        }

        let settled = rx.await.is_ok();
        self.waiters.lock().await.remove(&path);
        settled
    }
}

async fn poll_until_stable(path: &PathBuf, config: StabilityConfig) {
    let required_consecutive = (config.debounce_window.as_millis() / config.poll_interval.as_millis()).max(1) as u32;
    let timeout = config.debounce_window * 2;

    let poll_loop = async {
        let mut last_size: Option<u64> = None;
        let mut consecutive = 0u32;
        loop {
            let size = tokio::fs::metadata(path).await.ok().map(|m| m.len());
            if size.is_some() && size == last_size {
                consecutive += 1;
                if consecutive >= required_consecutive {
                    return;
                }
            } else {
                consecutive = 0;
                last_size = size;
            }
            tokio::time::sleep(config.poll_interval).await;
        }
    };

    let _ = tokio::time::timeout(timeout, poll_loop).await;
}
