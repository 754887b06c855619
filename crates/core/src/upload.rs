//! Staging area for files that may be sent to the media endpoint.
//!
//! The REST client refuses to upload any path that was not staged here first,
//! so a caller cannot point an upload at an arbitrary file on disk by passing
//! a path around. Staged copies live in a private temporary directory that is
//! removed when the registry is dropped.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

/// A file accepted into the [`UploadRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Location of the staged copy
    pub path: PathBuf,
    /// Original file name, sent as the multipart and Content-Disposition name
    pub name: String,
    pub mime: String,
}

#[derive(Debug)]
pub struct UploadRegistry {
    dir: TempDir,
    staged: Mutex<HashSet<PathBuf>>,
}

impl UploadRegistry {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("quickwp-upload-").tempdir()?;
        Ok(Self {
            dir,
            staged: Mutex::new(HashSet::new()),
        })
    }

    /// Copy `source` into the staging area.
    ///
    /// `name` overrides the file name reported to WordPress; by default the
    /// source file name is used.
    pub fn stage(&self, source: &Path, name: Option<&str>) -> Result<FileUpload> {
        if !source.is_file() {
            return Err(Error::InvalidInput(format!(
                "Not a regular file: {}",
                source.display()
            )));
        }

        let name = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::InvalidInput("Upload has no file name".to_string()))?,
        };

        let target = self.dir.path().join(Uuid::new_v4().to_string());
        std::fs::copy(source, &target)?;
        let target = target.canonicalize()?;

        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        debug!(file = %name, mime = %mime, "staged upload");
        self.staged.lock().insert(target.clone());

        Ok(FileUpload {
            path: target,
            name,
            mime,
        })
    }

    /// Whether `path` is a staged upload that still exists on disk.
    pub fn is_uploaded(&self, path: &Path) -> bool {
        let Ok(path) = path.canonicalize() else {
            return false;
        };
        path.is_file() && self.staged.lock().contains(&path)
    }

    /// Forget a staged upload and delete its copy.
    pub fn release(&self, upload: &FileUpload) -> Result<()> {
        if self.staged.lock().remove(&upload.path) && upload.path.exists() {
            std::fs::remove_file(&upload.path)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"\x89PNG fake image bytes").unwrap();
        path
    }

    #[test]
    fn test_stage_copies_and_registers() {
        let source_dir = TempDir::new().unwrap();
        let source = sample_file(&source_dir, "photo.png");
        let registry = UploadRegistry::new().unwrap();

        let upload = registry.stage(&source, None).unwrap();

        assert_eq!(upload.name, "photo.png");
        assert_eq!(upload.mime, "image/png");
        assert_ne!(upload.path, source);
        assert!(registry.is_uploaded(&upload.path));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unstaged_path_is_rejected() {
        let source_dir = TempDir::new().unwrap();
        let source = sample_file(&source_dir, "passwd");
        let registry = UploadRegistry::new().unwrap();

        assert!(!registry.is_uploaded(&source));
        assert!(!registry.is_uploaded(Path::new("/definitely/not/here")));
    }

    #[test]
    fn test_name_override_and_unknown_mime() {
        let source_dir = TempDir::new().unwrap();
        let source = sample_file(&source_dir, "blob");
        let registry = UploadRegistry::new().unwrap();

        let upload = registry.stage(&source, Some("report.weird")).unwrap();
        assert_eq!(upload.name, "report.weird");
        assert_eq!(upload.mime, "application/octet-stream");
    }

    #[test]
    fn test_release_removes_copy() {
        let source_dir = TempDir::new().unwrap();
        let source = sample_file(&source_dir, "a.jpg");
        let registry = UploadRegistry::new().unwrap();

        let upload = registry.stage(&source, None).unwrap();
        registry.release(&upload).unwrap();

        assert!(!upload.path.exists());
        assert!(!registry.is_uploaded(&upload.path));
        assert!(registry.is_empty());
        assert!(source.exists());
    }

    #[test]
    fn test_stage_directory_fails() {
        let source_dir = TempDir::new().unwrap();
        let registry = UploadRegistry::new().unwrap();
        assert!(registry.stage(source_dir.path(), None).is_err());
    }
}
