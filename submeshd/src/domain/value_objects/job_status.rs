//! Job lifecycle states and the transition table of §4.1.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    DownloadQueued,
    DownloadInProgress,
    TranslateQueued,
    TranslateInProgress,
    Done,
    SubtitleMissing,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed | JobStatus::SubtitleMissing
        )
    }

    /// Progress percentage for status queries, per §4.1.
    pub fn progress(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::DownloadQueued | JobStatus::DownloadInProgress => 25,
            JobStatus::TranslateQueued | JobStatus::TranslateInProgress => 75,
            JobStatus::Done => 100,
            JobStatus::Failed | JobStatus::SubtitleMissing => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::DownloadQueued => "DOWNLOAD_QUEUED",
            JobStatus::DownloadInProgress => "DOWNLOAD_IN_PROGRESS",
            JobStatus::TranslateQueued => "TRANSLATE_QUEUED",
            JobStatus::TranslateInProgress => "TRANSLATE_IN_PROGRESS",
            JobStatus::Done => "DONE",
            JobStatus::SubtitleMissing => "SUBTITLE_MISSING",
            JobStatus::Failed => "FAILED",
        }
    }
}

/// Returns true if `from -> to` is a permitted transition in the table of
/// §4.1. Any other pair (including `from == to`) is not an error: callers
/// treat it as a no-op so redelivered or out-of-order events are idempotent.
pub fn is_valid_transition(from: JobStatus, to: JobStatus) -> bool {
    use JobStatus::*;
    matches!(
        (from, to),
        (Pending, DownloadQueued)
            | (Pending, Failed)
            | (DownloadQueued, DownloadInProgress)
            | (DownloadQueued, Failed)
            | (DownloadInProgress, Done)
            | (DownloadInProgress, TranslateQueued)
            | (DownloadInProgress, SubtitleMissing)
            | (DownloadInProgress, Failed)
            | (TranslateQueued, TranslateInProgress)
            | (TranslateQueued, Failed)
            | (TranslateInProgress, Done)
            | (TranslateInProgress, Failed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use JobStatus::*;

    #[test]
    fn happy_path_transitions_are_valid() {
        assert!(is_valid_transition(Pending, DownloadQueued));
        assert!(is_valid_transition(DownloadQueued, DownloadInProgress));
        assert!(is_valid_transition(DownloadInProgress, Done));
    }

    #[test]
    fn never_regresses_to_pending() {
        for to in [
            Pending,
            DownloadQueued,
            DownloadInProgress,
            TranslateQueued,
            TranslateInProgress,
            Done,
            SubtitleMissing,
            Failed,
        ] {
            assert!(!is_valid_transition(to, Pending));
        }
    }

    #[test]
    fn self_transition_is_not_valid_but_not_an_error_for_callers() {
        assert!(!is_valid_transition(Done, Done));
    }

    #[test]
    fn progress_mapping_matches_spec() {
        assert_eq!(Pending.progress(), 0);
        assert_eq!(DownloadQueued.progress(), 25);
        assert_eq!(DownloadInProgress.progress(), 25);
        assert_eq!(TranslateQueued.progress(), 75);
        assert_eq!(TranslateInProgress.progress(), 75);
        assert_eq!(Done.progress(), 100);
        assert_eq!(Failed.progress(), 0);
        assert_eq!(SubtitleMissing.progress(), 0);
    }

    #[test]
    fn terminal_states() {
        assert!(Done.is_terminal());
        assert!(Failed.is_terminal());
        assert!(SubtitleMissing.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!DownloadInProgress.is_terminal());
    }
}
