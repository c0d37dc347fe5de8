//! Translation checkpoint record (§3, §4.5), grounded in
//! `original_source/src/translator/checkpoint_manager.py`'s
//! `CheckpointManager` (per-job, per-target-language file, rewritten in
//! full on every chunk, `created_at` preserved across rewrites).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::subtitle_segment::SubtitleSegment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationCheckpoint {
    pub job_id: Uuid,
    pub source_path: String,
    pub source_language: String,
    pub target_language: String,
    pub total_chunks: usize,
    pub completed_chunks: BTreeSet<usize>,
    pub translated_segments: Vec<SubtitleSegment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationCheckpoint {
    pub fn new(
        job_id: Uuid,
        source_path: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        total_chunks: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            source_path: source_path.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            total_chunks,
            completed_chunks: BTreeSet::new(),
            translated_segments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this checkpoint's metadata still matches an incoming task;
    /// a mismatch means the checkpoint is ignored and translation starts
    /// from zero, per §4.5 step 2.
    pub fn matches(&self, source_path: &str, source_language: &str, target_language: &str) -> bool {
        self.source_path == source_path
            && self.source_language == source_language
            && self.target_language == target_language
    }

    pub fn mark_chunk_complete(&mut self, chunk_index: usize, mut translated: Vec<SubtitleSegment>) {
        self.completed_chunks.insert(chunk_index);
        self.translated_segments.append(&mut translated);
        self.translated_segments.sort_by_key(|s| s.index);
        self.updated_at = Utc::now();
    }

    pub fn is_chunk_complete(&self, chunk_index: usize) -> bool {
        self.completed_chunks.contains(&chunk_index)
    }
}
