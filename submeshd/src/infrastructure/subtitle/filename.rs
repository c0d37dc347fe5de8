//! Output-path derivation for downloaded and translated subtitles
//! (§4.4 step 4a, §4.5 step 5, §6.4).

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// True if `video_url` is a local filesystem path this process can read
/// (a bare path, or a `file://` URL), as opposed to a remote `http(s)://`
/// URL the downloader cannot treat as a local video.
pub fn is_local_file_path(video_url: &str) -> bool {
    !(video_url.starts_with("http://") || video_url.starts_with("https://"))
}

/// Strips a leading `file://` scheme, if present.
pub fn to_local_path(video_url: &str) -> PathBuf {
    PathBuf::from(video_url.strip_prefix("file://").unwrap_or(video_url))
}

/// `<video_dir>/<video_stem>.<lang>.srt`, per §4.4 step 4a and §6.4.
pub fn derive_subtitle_path(video_path: &Path, language: &str) -> PathBuf {
    let dir = video_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = video_path.file_stem().and_then(|s| s.to_str()).unwrap_or("subtitle");
    dir.join(format!("{stem}.{language}.srt"))
}

static LANG_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)\.([a-z]{2})(\.[^.]+)$").unwrap());

/// The substitution rule of §4.5 step 5: if the source filename ends
/// with a recognised 2-letter ISO code between two dots, replace that
/// code with the target language; otherwise append
/// `.{target}.srt` before the extension.
pub fn derive_translated_path(source_path: &Path, target_language: &str) -> PathBuf {
    let file_name = source_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("subtitle.srt");
    let dir = source_path.parent().unwrap_or_else(|| Path::new("."));

    if let Some(caps) = LANG_SUFFIX.captures(file_name) {
        let stem = &caps[1];
        let ext = &caps[3];
        dir.join(format!("{stem}.{target_language}{ext}"))
    } else {
        let stem = source_path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
        dir.join(format!("{stem}.{target_language}.srt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_subtitle_path_from_video_stem() {
        let path = derive_subtitle_path(Path::new("/m/a.mp4"), "en");
        assert_eq!(path, PathBuf::from("/m/a.en.srt"));
    }

    #[test]
    fn substitutes_recognised_language_suffix() {
        let path = derive_translated_path(Path::new("/m/a.en.srt"), "he");
        assert_eq!(path, PathBuf::from("/m/a.he.srt"));
    }

    #[test]
    fn appends_target_language_when_no_suffix_present() {
        let path = derive_translated_path(Path::new("/m/a.srt"), "he");
        assert_eq!(path, PathBuf::from("/m/a.he.srt"));
    }

    #[test]
    fn remote_urls_are_not_local_files() {
        assert!(!is_local_file_path("http://example.com/a.mp4"));
        assert!(!is_local_file_path("https://example.com/a.mp4"));
        assert!(is_local_file_path("/m/a.mp4"));
        assert!(is_local_file_path("file:///m/a.mp4"));
    }

    #[test]
    fn strips_file_scheme() {
        assert_eq!(to_local_path("file:///m/a.mp4"), PathBuf::from("/m/a.mp4"));
        assert_eq!(to_local_path("/m/a.mp4"), PathBuf::from("/m/a.mp4"));
    }
}
