//! Ingress validation shared by the HTTP surface and the
//! `subtitle.requested` event handler (§4.3, §6.1).

use crate::domain::value_objects::language_code::is_valid_two_letter;
use crate::shared::error::DomainError;

pub fn validate_video_url(video_url: &str) -> Result<(), DomainError> {
    if video_url.is_empty() {
        return Err(DomainError::EmptyVideoUrl);
    }
    Ok(())
}

/// Stricter check used by the HTTP `POST /subtitles/download` handler,
/// which additionally requires a recognised scheme (§6.1); the event
/// path (`subtitle.requested`) only requires non-empty per §4.3.
pub fn validate_video_url_scheme(video_url: &str) -> Result<(), DomainError> {
    validate_video_url(video_url)?;
    if !(video_url.starts_with("http://")
        || video_url.starts_with("https://")
        || video_url.starts_with("file://"))
    {
        return Err(DomainError::EmptyVideoUrl);
    }
    Ok(())
}

pub fn validate_video_title(video_title: &str) -> Result<(), DomainError> {
    if video_title.is_empty() || video_title.len() > 500 {
        return Err(DomainError::InvalidVideoTitle);
    }
    Ok(())
}

pub fn validate_language_code(code: &str) -> Result<(), DomainError> {
    if !is_valid_two_letter(code) {
        return Err(DomainError::InvalidLanguageCode(code.to_string()));
    }
    Ok(())
}

/// `target_language == language` is rejected on ingress, per §3/§8.
pub fn validate_target_language(language: &str, target_language: Option<&str>) -> Result<(), DomainError> {
    if let Some(target) = target_language {
        validate_language_code(target)?;
        if target == language {
            return Err(DomainError::TargetEqualsSource);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_video_url() {
        assert!(validate_video_url("").is_err());
    }

    #[test]
    fn rejects_target_equal_to_source_language() {
        assert!(validate_target_language("en", Some("en")).is_err());
        assert!(validate_target_language("en", Some("he")).is_ok());
        assert!(validate_target_language("en", None).is_ok());
    }

    #[test]
    fn scheme_validation_accepts_known_schemes() {
        assert!(validate_video_url_scheme("file:///m/a.mp4").is_ok());
        assert!(validate_video_url_scheme("http://x/a.mp4").is_ok());
        assert!(validate_video_url_scheme("https://x/a.mp4").is_ok());
        assert!(validate_video_url_scheme("/m/a.mp4").is_err());
    }
}
