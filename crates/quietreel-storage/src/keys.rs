//! Staged file naming.
//!
//! Format: `{prefix}{unix millis}-{sequence}-{base name}`. The sequence is a process-wide
//! monotonic counter, so two allocations in the same millisecond still differ.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::{StorageError, StorageResult};

/// Longest base name kept in a staged file name, leaving room for prefix and counters
/// under the usual 255 byte file name limit.
const MAX_BASE_NAME_BYTES: usize = 180;

/// Extensions longer than this are treated as part of the stem when shortening
const MAX_EXTENSION_BYTES: usize = 16;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Separate naming namespaces for inbound and outbound files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Raw bytes received from the client
    Upload,
    /// Transcoder output
    Processed,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Upload => "upload-",
            Namespace::Processed => "no-audio-",
        }
    }
}

/// Check that `base_name` is a bare file name that cannot escape the staging directory.
pub fn validate_base_name(base_name: &str) -> StorageResult<()> {
    if base_name.is_empty() || base_name == "." {
        return Err(StorageError::InvalidKey("empty file name".to_string()));
    }

    if base_name.contains("..")
        || base_name.contains('/')
        || base_name.contains('\\')
        || base_name.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "file name contains path components: {}",
            base_name
        )));
    }

    Ok(())
}

/// Generate the next staged file name for `base_name` in `namespace`.
pub fn generate_file_name(namespace: Namespace, base_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}{}-{}-{}",
        namespace.prefix(),
        millis,
        seq,
        shorten_base_name(base_name, MAX_BASE_NAME_BYTES)
    )
}

/// Cut the stem so the name fits `max_bytes`, keeping the extension the transcoder
/// picks its container from.
fn shorten_base_name(base_name: &str, max_bytes: usize) -> String {
    if base_name.len() <= max_bytes {
        return base_name.to_string();
    }
    match base_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.len() <= MAX_EXTENSION_BYTES =>
        {
            let stem = truncate_on_char_boundary(stem, max_bytes - ext.len() - 1);
            format!("{}.{}", stem, ext)
        }
        _ => truncate_on_char_boundary(base_name, max_bytes).to_string(),
    }
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_carry_namespace_prefix_and_base() {
        let upload = generate_file_name(Namespace::Upload, "clip.mp4");
        let output = generate_file_name(Namespace::Processed, "clip.mp4");
        assert!(upload.starts_with("upload-"));
        assert!(upload.ends_with("-clip.mp4"));
        assert!(output.starts_with("no-audio-"));
        assert_ne!(upload, output);
    }

    #[test]
    fn names_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..500)
                        .map(|_| generate_file_name(Namespace::Upload, "same.mp4"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(seen.insert(name), "duplicate staged name generated");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn rejects_path_components() {
        assert!(validate_base_name("../etc/passwd").is_err());
        assert!(validate_base_name("a/b.mp4").is_err());
        assert!(validate_base_name("a\\b.mp4").is_err());
        assert!(validate_base_name("").is_err());
        assert!(validate_base_name("clip.mp4").is_ok());
    }

    #[test]
    fn long_names_are_truncated_on_char_boundaries() {
        let long = "é".repeat(200);
        let name = generate_file_name(Namespace::Upload, &long);
        assert!(name.len() <= 255);
        assert!(name.is_char_boundary(name.len()));
    }

    #[test]
    fn long_names_keep_their_extension() {
        let cjk = format!("{}.mp4", "视".repeat(65));
        let name = generate_file_name(Namespace::Processed, &cjk);
        assert!(name.len() <= 255);
        assert!(name.ends_with(".mp4"), "extension lost: {}", name);
        assert!(name.contains("视视"));

        let ascii = format!("{}.webm", "a".repeat(250));
        let name = generate_file_name(Namespace::Upload, &ascii);
        assert!(name.ends_with("a.webm"));
        assert!(name.len() <= 255);
    }

    #[test]
    fn long_names_without_extension_are_cut() {
        let name = generate_file_name(Namespace::Upload, &"b".repeat(300));
        assert!(name.len() <= 255);
        assert!(name.ends_with('b'));
    }
}
