use quietreel_core::AppError;
use std::path::Path;

const MAX_FILENAME_LENGTH: usize = 255;
const FALLBACK_NAME: &str = "video";
const FALLBACK_EXTENSION: &str = "mp4";

/// Reasons an upload is turned away before any transcoding happens
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("No video file provided")]
    NoFile,

    #[error("Content type {content_type:?} is not a video type")]
    BadType { content_type: Option<String> },

    #[error("Upload exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::NoFile => AppError::NoVideoFile,
            IntakeError::BadType { content_type } => AppError::UnsupportedContentType(
                content_type.unwrap_or_else(|| "<none>".to_string()),
            ),
            IntakeError::TooLarge { max_bytes } => AppError::PayloadTooLarge { max_bytes },
        }
    }
}

/// Upload validator
///
/// Applies the intake rules (video content type, size ceiling) without touching storage.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
}

impl UploadValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Accept only `video/*` content types (parameters and case ignored)
    pub fn validate_content_type(&self, content_type: Option<&str>) -> Result<(), IntakeError> {
        let is_video = content_type
            .map(|ct| normalize_mime_type(ct).to_lowercase())
            .is_some_and(|ct| ct.starts_with("video/") && ct.len() > "video/".len());

        if !is_video {
            return Err(IntakeError::BadType {
                content_type: content_type.map(str::to_string),
            });
        }
        Ok(())
    }

    /// Check the running byte count of an upload still being received
    pub fn validate_running_size(&self, received: u64) -> Result<(), IntakeError> {
        if received > self.max_file_size {
            return Err(IntakeError::TooLarge {
                max_bytes: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Normalize MIME type by stripping parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Client filename reduced to something safe to show back to the user.
///
/// Keeps only the last path component (some clients send full paths) and drops control
/// characters. The result is never used to build a filesystem path.
pub fn display_filename(filename: Option<&str>) -> String {
    let raw = filename.unwrap_or_default();
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILENAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Filename safe to embed in a staging path.
///
/// Only alphanumerics, `.`, `-` and `_` survive; everything else (path separators included)
/// becomes `_`. Runs of dots are collapsed so the name can never contain `..`. A name
/// without an extension gets one derived from `content_type` so the transcoder can pick
/// the output container.
pub fn storage_filename(display_name: &str, content_type: &str) -> String {
    let mut sanitized: String = display_name
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }
    let sanitized = sanitized.trim_start_matches('.');

    let mut name = if sanitized.trim_matches('_').is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized.to_string()
    };

    let has_extension = Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| !e.is_empty());
    if !has_extension {
        let extension = mime_guess::get_mime_extensions_str(normalize_mime_type(content_type))
            .and_then(|exts| exts.first())
            .copied()
            .unwrap_or(FALLBACK_EXTENSION);
        name = format!("{}.{}", name.trim_end_matches('.'), extension);
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_video_types_only() {
        let validator = UploadValidator::new(100);
        assert!(validator.validate_content_type(Some("video/mp4")).is_ok());
        assert!(validator
            .validate_content_type(Some("Video/QuickTime; charset=binary"))
            .is_ok());
        assert_eq!(
            validator.validate_content_type(Some("text/plain")),
            Err(IntakeError::BadType {
                content_type: Some("text/plain".to_string())
            })
        );
        assert!(validator.validate_content_type(Some("video/")).is_err());
        assert!(validator.validate_content_type(Some("videos/mp4")).is_err());
        assert!(validator.validate_content_type(None).is_err());
    }

    #[test]
    fn running_size_allows_exact_ceiling() {
        let validator = UploadValidator::new(1024);
        assert!(validator.validate_running_size(1024).is_ok());
        assert_eq!(
            validator.validate_running_size(1025),
            Err(IntakeError::TooLarge { max_bytes: 1024 })
        );
    }

    #[test]
    fn display_name_keeps_last_component() {
        assert_eq!(display_filename(Some("clip.mp4")), "clip.mp4");
        assert_eq!(display_filename(Some("C:\\Users\\me\\clip.mp4")), "clip.mp4");
        assert_eq!(display_filename(Some("../../etc/passwd")), "passwd");
        assert_eq!(display_filename(Some("my clip (1).mp4")), "my clip (1).mp4");
        assert_eq!(display_filename(Some("..")), "video");
        assert_eq!(display_filename(None), "video");
        assert_eq!(display_filename(Some("a\r\nb.mp4")), "ab.mp4");
    }

    #[test]
    fn storage_name_cannot_traverse() {
        let name = storage_filename("..mp4", "video/mp4");
        assert!(!name.contains(".."));
        assert!(!name.starts_with('.'));

        let name = storage_filename("a/../../b.mp4", "video/mp4");
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));

        assert_eq!(storage_filename("clip.mp4", "video/mp4"), "clip.mp4");
        assert_eq!(storage_filename("my clip.mov", "video/quicktime"), "my_clip.mov");
    }

    #[test]
    fn storage_name_gains_extension_from_content_type() {
        let name = storage_filename("recording", "video/webm");
        assert!(name.starts_with("recording."));
        assert!(name.ends_with("webm"));

        assert_eq!(storage_filename("///", "video/x-unknown"), "video.mp4");
    }

    #[test]
    fn intake_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(IntakeError::NoFile),
            AppError::NoVideoFile
        ));
        assert!(matches!(
            AppError::from(IntakeError::TooLarge { max_bytes: 5 }),
            AppError::PayloadTooLarge { max_bytes: 5 }
        ));
    }
}
