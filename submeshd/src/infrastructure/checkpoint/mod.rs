pub mod fs_checkpoint_store;

pub use fs_checkpoint_store::FsCheckpointStore;
