//! File store for the shared upload directory.
//!
//! Files are stored verbatim by name in one flat directory; size and
//! timestamps are owned entirely by the filesystem, not tracked here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::{Result, VaultError};

/// Filesystem metadata for one stored file.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Creation time. Falls back to the modification time on filesystems
    /// that do not record it.
    pub created: DateTime<Local>,
    /// Last modification time.
    pub modified: DateTime<Local>,
}

/// File store over the shared upload directory.
///
/// Listings are re-enumerated freshly on every call and sorted lexically
/// before ordinals are assigned. An ordinal handed to the user refers to a
/// position at listing time only; a concurrent upload or delete from
/// another conversation can re-target it, which is accepted rather than
/// locked around.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Base directory for stored files.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new FileStore with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Enumerate the directory, returning file names sorted lexically.
    ///
    /// Produced fresh on every call; never cached across commands.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Validate a user-supplied file name.
    ///
    /// Names must be a single path component; separators and parent
    /// references are rejected so a rename or upload cannot escape the
    /// upload directory.
    pub fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(VaultError::Validation("file name is empty".to_string()));
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(VaultError::Validation(format!(
                "invalid file name: {name}"
            )));
        }
        Ok(())
    }

    /// Get the full path for a stored name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Check if a file exists in the store.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Get the size of a stored file.
    pub fn file_size(&self, name: &str) -> Result<u64> {
        match fs::metadata(self.path_for(name)) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get size and timestamps for a stored file.
    pub fn metadata(&self, name: &str) -> Result<FileMetadata> {
        let meta = match fs::metadata(self.path_for(name)) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(VaultError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = meta.created().unwrap_or(modified);

        Ok(FileMetadata {
            name: name.to_string(),
            size: meta.len(),
            created: DateTime::from(created),
            modified: DateTime::from(modified),
        })
    }

    /// Rename a stored file.
    ///
    /// A vanished source reports NotFound, distinct from an index that was
    /// never in range.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        Self::validate_name(new_name)?;

        let old_path = self.path_for(old_name);
        if !old_path.is_file() {
            return Err(VaultError::NotFound(old_name.to_string()));
        }

        fs::rename(old_path, self.path_for(new_name))?;
        Ok(())
    }

    /// Delete a stored file.
    pub fn delete(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Total bytes consumed by the store, including subdirectories.
    pub fn total_bytes(&self) -> Result<u64> {
        fn dir_size(path: &Path) -> io::Result<u64> {
            let mut total = 0;
            for entry in fs::read_dir(path)? {
                let entry = entry?;
                let meta = entry.metadata()?;
                if meta.is_dir() {
                    total += dir_size(&entry.path())?;
                } else {
                    total += meta.len();
                }
            }
            Ok(total)
        }

        Ok(dir_size(&self.base_path)?)
    }
}
