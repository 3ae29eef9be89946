use quietreel_storage::StagedFile;
use std::path::Path;

/// Prefix marking a file whose audio track has been removed
pub const PROCESSED_FILENAME_PREFIX: &str = "no-audio-";

/// A video received from the client and staged on disk
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-supplied name, cleaned for display only
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub staged: StagedFile,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        self.staged.path()
    }

    /// Name suggested to the client for the processed download
    pub fn download_filename(&self) -> String {
        format!("{}{}", PROCESSED_FILENAME_PREFIX, self.original_filename)
    }

    /// Content type of the processed output: guessed from the file extension (the
    /// transcoder keeps the container), falling back to the declared type.
    pub fn output_content_type(&self) -> String {
        mime_guess::from_path(&self.original_filename)
            .iter()
            .find(|m| m.type_() == mime_guess::mime::VIDEO)
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| self.content_type.clone())
    }
}

/// Transcoder output ready to be streamed back
#[derive(Debug)]
pub struct ProcessedFile {
    pub download_filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub staged: StagedFile,
}

impl ProcessedFile {
    pub fn path(&self) -> &Path {
        self.staged.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quietreel_storage::{LocalStaging, Namespace, StagingStore};

    async fn uploaded(name: &str, content_type: &str) -> (tempfile::TempDir, UploadedFile) {
        let dir = tempfile::tempdir().unwrap();
        let staging = LocalStaging::new(dir.path()).await.unwrap();
        let staged = staging.allocate(Namespace::Upload, "x.mp4").await.unwrap();
        let file = UploadedFile {
            original_filename: name.to_string(),
            content_type: content_type.to_string(),
            size_bytes: 0,
            staged,
        };
        (dir, file)
    }

    #[tokio::test]
    async fn download_name_is_prefixed() {
        let (_dir, file) = uploaded("clip.mp4", "video/mp4").await;
        assert_eq!(file.download_filename(), "no-audio-clip.mp4");
    }

    #[tokio::test]
    async fn output_type_follows_extension_then_declared_type() {
        let (_dir, file) = uploaded("clip.webm", "video/mp4").await;
        assert_eq!(file.output_content_type(), "video/webm");

        let (_dir, file) = uploaded("clip", "video/quicktime").await;
        assert_eq!(file.output_content_type(), "video/quicktime");
    }
}
