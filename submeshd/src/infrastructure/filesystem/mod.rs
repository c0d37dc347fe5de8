pub mod walker;
pub mod watcher;

pub use watcher::{FileStabilityWatcher, StabilityConfig};
