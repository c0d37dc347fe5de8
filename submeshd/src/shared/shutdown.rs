//! A polled shutdown flag every subscription loop checks between messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Installs a `ctrl_c` listener that requests shutdown; the caller's
    /// subscription loop keeps running until it next polls the flag, so
    /// in-flight messages still finish before the channel closes.
    pub fn spawn_ctrl_c_listener(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal.request();
            }
        });
    }
}
