//! On-disk storage for uploaded files.
//!
//! Uploads land as flat files under the configured upload directory; the
//! database keeps the path alongside the file metadata. Names are sanitized
//! and extension-checked before a single byte is written.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::config;

/// Extensions accepted for upload: documents, images, video and diagram
/// formats used on the platform.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv", "md",
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp",
    // video
    "mp4", "mov", "avi", "mkv", "webm",
    // diagrams
    "vsd", "vsdx", "drawio", "bpmn",
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File name must have an extension")]
    MissingExtension,
    #[error("File type '.{0}' is not allowed")]
    ExtensionNotAllowed(String),
    #[error("File name is empty or unusable")]
    EmptyFileName,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reduce a client-supplied file name to a safe storage-path component.
///
/// Path separators and parent components are discarded, leading dots
/// stripped, and everything outside `[A-Za-z0-9._-]` replaced. The extension
/// must be present and on [`ALLOWED_EXTENSIONS`]; it comes back lowercased.
pub fn sanitize_file_name(name: &str) -> Result<String, StorageError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, ext),
        _ => return Err(StorageError::MissingExtension),
    };

    if stem.is_empty() || stem.chars().all(|c| c == '_') {
        return Err(StorageError::EmptyFileName);
    }

    let ext = ext.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StorageError::ExtensionNotAllowed(ext));
    }

    Ok(format!("{}.{}", stem, ext))
}

/// Manages the upload directory.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn from_config() -> Self {
        Self::new(config::config().storage.upload_dir.clone())
    }

    /// Write upload bytes durably and return the stored path.
    ///
    /// `safe_name` must already have passed [`sanitize_file_name`]. A
    /// timestamp prefix keeps concurrent uploads of the same name from
    /// clobbering each other. The file is fsynced before this returns, so a
    /// subsequent metadata insert never references bytes that could vanish
    /// on power loss.
    pub async fn save(&self, safe_name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir).await?;

        let stored_name = format!(
            "{}_{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
            safe_name
        );
        let path = self.dir.join(stored_name);

        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;

        info!("stored upload at {}", path.display());
        Ok(path)
    }

    /// Open a stored file for streaming; `Ok(None)` when the bytes are gone
    /// even though metadata still points at them.
    pub async fn open(&self, stored_path: &str) -> Result<Option<(fs::File, u64)>, StorageError> {
        let path = Path::new(stored_path);
        let metadata = match fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file = fs::File::open(path).await?;
        Ok(Some((file, metadata.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_path_components() {
        assert_eq!(
            sanitize_file_name("../../etc/passwd.pdf").unwrap(),
            "passwd.pdf"
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\x\\report.docx").unwrap(),
            "report.docx"
        );
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(
            sanitize_file_name("Q3 report (final).pdf").unwrap(),
            "Q3_report__final_.pdf"
        );
    }

    #[test]
    fn lowercases_extension() {
        assert_eq!(sanitize_file_name("photo.JPG").unwrap(), "photo.jpg");
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(matches!(
            sanitize_file_name("noextension"),
            Err(StorageError::MissingExtension)
        ));
        assert!(matches!(
            sanitize_file_name("trailingdot."),
            Err(StorageError::MissingExtension)
        ));
    }

    #[test]
    fn rejects_disallowed_extension() {
        assert!(matches!(
            sanitize_file_name("malware.exe"),
            Err(StorageError::ExtensionNotAllowed(ext)) if ext == "exe"
        ));
    }

    #[test]
    fn rejects_hidden_or_empty_names() {
        assert!(matches!(
            sanitize_file_name(".pdf"),
            Err(StorageError::MissingExtension)
        ));
        assert!(matches!(
            sanitize_file_name("???.pdf"),
            Err(StorageError::EmptyFileName)
        ));
    }

    #[tokio::test]
    async fn save_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        let path = storage.save("notes.txt", b"hello").await.unwrap();
        let (mut file, len) = storage
            .open(path.to_str().unwrap())
            .await
            .unwrap()
            .expect("stored file should exist");

        assert_eq!(len, 5);
        let mut contents = Vec::new();
        use tokio::io::AsyncReadExt;
        file.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"hello");
    }

    #[tokio::test]
    async fn open_missing_bytes_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        let missing = dir.path().join("gone.pdf");
        assert!(storage
            .open(missing.to_str().unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
