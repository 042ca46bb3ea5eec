//! Filesystem blob store for uploaded documents.
//!
//! Keys have the shape `{patient_email}/{filename}` and map directly to
//! a path under the store root. Writes overwrite: re-uploading the same
//! key replaces the content, there is no versioning.

use std::path::{Component, Path, PathBuf};

use super::StorageError;

/// Extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write (or overwrite) the blob at `key`. Returns the backing path.
    pub fn put(&self, key: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Read the blob at `key`. A missing file is reported as `BlobMissing`
    /// so callers can distinguish it from a transport failure.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::BlobMissing { key: key.to_string() })
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Map a key to a path under the root, rejecting anything that could
    /// escape it (empty segments, `..`, absolute components).
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey { key: key.to_string() });
        }
        let relative = Path::new(key);
        for component in relative.components() {
            match component {
                Component::Normal(seg) if !seg.is_empty() => {}
                _ => return Err(StorageError::InvalidKey { key: key.to_string() }),
            }
        }
        Ok(self.root.join(relative))
    }
}

/// Deterministic storage key for a patient's document.
pub fn storage_key(patient_email: &str, filename: &str) -> String {
    format!("{patient_email}/{filename}")
}

/// Reduce an uploaded filename to a safe single path segment: the final
/// component with anything outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    last.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A patient email used as a key segment must be a plain single segment.
pub fn valid_email_segment(email: &str) -> bool {
    !email.is_empty()
        && email.contains('@')
        && !email.contains('/')
        && !email.contains('\\')
        && !email.contains("..")
}

/// Extension allow-list check, case-insensitive.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, LocalBlobStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(tmp.path().join("uploads"));
        (tmp, store)
    }

    #[test]
    fn put_then_get_round_trips() {
        let (_tmp, store) = test_store();
        store.put("a@x.com/report.pdf", b"content").unwrap();
        assert_eq!(store.get("a@x.com/report.pdf").unwrap(), b"content");
        assert!(store.contains("a@x.com/report.pdf"));
    }

    #[test]
    fn put_overwrites_existing_key() {
        let (_tmp, store) = test_store();
        store.put("a@x.com/report.pdf", b"v1").unwrap();
        store.put("a@x.com/report.pdf", b"v2").unwrap();
        assert_eq!(store.get("a@x.com/report.pdf").unwrap(), b"v2");
    }

    #[test]
    fn missing_blob_reported_distinctly() {
        let (_tmp, store) = test_store();
        let err = store.get("a@x.com/nope.txt").unwrap_err();
        assert!(matches!(err, StorageError::BlobMissing { .. }));
    }

    #[test]
    fn traversal_keys_rejected() {
        let (_tmp, store) = test_store();
        for key in ["../escape.txt", "a@x.com/../../etc/passwd", "/abs.txt", "", "a\\b.txt"] {
            assert!(
                matches!(store.put(key, b"x"), Err(StorageError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\evil.txt"), "evil.txt");
        assert_eq!(sanitize_filename("my scan (1).pdf"), "my_scan__1_.pdf");
    }

    #[test]
    fn allow_list_is_case_insensitive() {
        assert!(allowed_file("report.pdf"));
        assert!(allowed_file("REPORT.PDF"));
        assert!(allowed_file("notes.docx"));
        assert!(allowed_file("readme.txt"));
        assert!(!allowed_file("image.png"));
        assert!(!allowed_file("archive.tar.gz"));
        assert!(!allowed_file("noextension"));
    }

    #[test]
    fn email_segment_validation() {
        assert!(valid_email_segment("a@x.com"));
        assert!(!valid_email_segment(""));
        assert!(!valid_email_segment("no-at-sign"));
        assert!(!valid_email_segment("a@x.com/../b"));
        assert!(!valid_email_segment("a@x..com"));
    }

    #[test]
    fn storage_key_is_deterministic() {
        assert_eq!(storage_key("a@x.com", "report.pdf"), "a@x.com/report.pdf");
    }
}
