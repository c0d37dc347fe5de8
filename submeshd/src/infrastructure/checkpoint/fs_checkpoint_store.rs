//! Filesystem-backed checkpoint persistence, grounded in
//! `original_source/src/translator/checkpoint_manager.py`'s
//! `CheckpointManager`: one file per (job id, target language) at
//! `{checkpoint_dir}/{job_id}.{target_language}.checkpoint.json`,
//! rewritten in full on every chunk, deleted on overall success.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::domain::entities::TranslationCheckpoint;
use crate::shared::error::ChunkError;

pub struct FsCheckpointStore {
    checkpoint_dir: PathBuf,
}

impl FsCheckpointStore {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
        }
    }

    pub fn checkpoint_path(&self, job_id: Uuid, target_language: &str) -> PathBuf {
        self.checkpoint_dir
            .join(format!("{job_id}.{target_language}.checkpoint.json"))
    }

    pub async fn exists(&self, job_id: Uuid, target_language: &str) -> bool {
        fs::metadata(self.checkpoint_path(job_id, target_language))
            .await
            .is_ok()
    }

    pub async fn load(
        &self,
        job_id: Uuid,
        target_language: &str,
    ) -> Result<Option<TranslationCheckpoint>, ChunkError> {
        let path = self.checkpoint_path(job_id, target_language);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Rewrites the checkpoint in full. `created_at` is never touched
    /// here: callers preserve it by mutating the loaded checkpoint
    /// in-place rather than constructing a fresh one on each chunk.
    pub async fn save(&self, checkpoint: &TranslationCheckpoint) -> Result<(), ChunkError> {
        ensure_parent_dir(&self.checkpoint_dir).await?;
        let path = self.checkpoint_path(checkpoint.job_id, &checkpoint.target_language);
        let bytes = serde_json::to_vec_pretty(checkpoint)?;
        fs::write(&path, bytes).await?;
        Ok(())
    }

    pub async fn delete(&self, job_id: Uuid, target_language: &str) -> Result<(), ChunkError> {
        let path = self.checkpoint_path(job_id, target_language);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

async fn ensure_parent_dir(dir: &Path) -> Result<(), ChunkError> {
    fs::create_dir_all(dir).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SubtitleSegment;
    use tempfile::tempdir;

    #[tokio::test]
    async fn round_trips_and_preserves_created_at() {
        let dir = tempdir().unwrap();
        let store = FsCheckpointStore::new(dir.path());
        let job_id = Uuid::new_v4();

        let mut checkpoint = TranslationCheckpoint::new(job_id, "/m/a.en.srt", "en", "he", 3);
        let created_at = checkpoint.created_at;
        checkpoint.mark_chunk_complete(
            0,
            vec![SubtitleSegment {
                index: 1,
                start: "00:00:01,000".into(),
                end: "00:00:02,000".into(),
                text: "שלום".into(),
            }],
        );
        store.save(&checkpoint).await.unwrap();

        let loaded = store.load(job_id, "he").await.unwrap().unwrap();
        assert_eq!(loaded.created_at, created_at);
        assert!(loaded.is_chunk_complete(0));
        assert_eq!(loaded.translated_segments.len(), 1);
    }

    #[tokio::test]
    async fn missing_checkpoint_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = FsCheckpointStore::new(dir.path());
        assert!(store.load(Uuid::new_v4(), "he").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent_when_already_absent() {
        let dir = tempdir().unwrap();
        let store = FsCheckpointStore::new(dir.path());
        store.delete(Uuid::new_v4(), "he").await.unwrap();
    }
}
