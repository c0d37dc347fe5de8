//! A single SRT block, immutable once parsed (§3, §6.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    pub index: u32,
    /// `HH:MM:SS,mmm` timing, kept as the original text so it round-trips
    /// byte-exactly without needing to model leap behaviour.
    pub start: String,
    pub end: String,
    pub text: String,
}
