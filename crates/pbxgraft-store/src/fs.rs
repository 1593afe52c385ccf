//! Whole-document storage.
//!
//! A descriptor is always read and written as one unit. Replacing it on disk
//! goes through a temporary file in the same directory followed by a rename,
//! so readers see either the old document or the new one, never a mix.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};

/// Read-whole-document / write-whole-document capability.
pub trait DocumentStore {
    fn read(&self) -> StoreResult<Vec<u8>>;

    /// Replace the whole document. Must be atomic: on error the previous
    /// document is still in place.
    fn replace(&mut self, bytes: &[u8]) -> StoreResult<()>;

    /// Human-readable location, for logs and reports.
    fn location(&self) -> String;

    /// Stem of the enclosing `.xcodeproj`, when known.
    fn project_name(&self) -> Option<String> {
        None
    }

    /// Backup written by the last `replace`, if any.
    fn last_backup(&self) -> Option<&Path> {
        None
    }
}

/// A `project.pbxproj` on the local file system.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    path: PathBuf,
    keep_backups: bool,
    last_backup: Option<PathBuf>,
}

impl FsDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep_backups: false,
            last_backup: None,
        }
    }

    /// Copy the current document aside before every replace.
    pub fn with_backup(mut self, enabled: bool) -> Self {
        self.keep_backups = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the current document to `<file>.<unix-timestamp>.bak`.
    pub fn backup(&self) -> StoreResult<PathBuf> {
        let ts = time::OffsetDateTime::now_utc().unix_timestamp();
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project.pbxproj".to_string());

        let mut dest = self.path.with_file_name(format!("{file_name}.{ts}.bak"));
        let mut n = 1;
        while dest.exists() {
            dest = self.path.with_file_name(format!("{file_name}.{ts}-{n}.bak"));
            n += 1;
        }

        fs::copy(&self.path, &dest).map_err(|e| StoreError::io(&self.path, e))?;
        tracing::info!(backup = %dest.display(), "wrote backup");
        Ok(dest)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self) -> StoreResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    fn replace(&mut self, bytes: &[u8]) -> StoreResult<()> {
        let dir = self.dir().to_path_buf();
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;

        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| StoreError::io(tmp.path(), e))?;
        }

        if self.keep_backups && self.path.exists() {
            self.last_backup = Some(self.backup()?);
        }

        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "replaced document");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn project_name(&self) -> Option<String> {
        let bundle = self.path.parent()?;
        if bundle.extension()? != "xcodeproj" {
            return None;
        }
        Some(bundle.file_stem()?.to_string_lossy().into_owned())
    }

    fn last_backup(&self) -> Option<&Path> {
        self.last_backup.as_deref()
    }
}
