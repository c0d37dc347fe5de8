//! Periodic full-library sync: walks a root directory for video files
//! with `walkdir::WalkDir`, filtering by extension.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "m4v"];

/// Returns every video file under `root`, recursively, in the order
/// `WalkDir` yields them (directory-then-children, not sorted).
pub fn find_video_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_video_file(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_video_files_recursively_and_ignores_others() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("b.mkv"), b"").unwrap();

        let mut found: Vec<_> = find_video_files(dir.path())
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        found.sort();
        assert_eq!(found, vec!["a.mp4", "b.mkv"]);
    }

    #[test]
    fn is_video_file_is_case_insensitive() {
        assert!(is_video_file(Path::new("a.MP4")));
        assert!(!is_video_file(Path::new("a.srt")));
    }
}
