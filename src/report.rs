//! Storage reporting.
//!
//! Aggregates disk usage for the volume hosting the upload directory and
//! the bytes consumed by the upload area against its configured ceiling.

use crate::store::FileStore;
use crate::Result;

/// Snapshot of disk and upload-area usage.
#[derive(Debug, Clone)]
pub struct StorageReport {
    /// Total bytes on the hosting volume.
    pub volume_total: u64,
    /// Used bytes on the hosting volume.
    pub volume_used: u64,
    /// Free bytes on the hosting volume.
    pub volume_free: u64,
    /// Bytes consumed by the upload area.
    pub uploads_bytes: u64,
    /// Configured ceiling for the upload area.
    pub upload_limit_bytes: u64,
}

impl StorageReport {
    /// Remaining capacity under the upload-area ceiling.
    pub fn remaining_upload_bytes(&self) -> u64 {
        self.upload_limit_bytes.saturating_sub(self.uploads_bytes)
    }
}

/// Convert bytes to gigabytes for display.
pub fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}

/// Gather a storage report for the volume hosting the store.
pub fn gather(store: &FileStore, upload_limit_bytes: u64) -> Result<StorageReport> {
    let volume = store.base_path();
    let volume_total = fs2::total_space(volume)?;
    let volume_free = fs2::free_space(volume)?;

    Ok(StorageReport {
        volume_total,
        volume_used: volume_total.saturating_sub(volume_free),
        volume_free,
        uploads_bytes: store.total_bytes()?,
        upload_limit_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_gather_counts_upload_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();
        std::fs::write(store.path_for("a.bin"), vec![0u8; 2048]).unwrap();

        let report = gather(&store, 1024 * 1024).unwrap();

        assert_eq!(report.uploads_bytes, 2048);
        assert_eq!(report.upload_limit_bytes, 1024 * 1024);
        assert_eq!(report.remaining_upload_bytes(), 1024 * 1024 - 2048);
        assert!(report.volume_total > 0);
        assert!(report.volume_free <= report.volume_total);
        assert_eq!(
            report.volume_used,
            report.volume_total - report.volume_free
        );
    }

    #[test]
    fn test_remaining_saturates_at_zero() {
        let report = StorageReport {
            volume_total: 100,
            volume_used: 50,
            volume_free: 50,
            uploads_bytes: 200,
            upload_limit_bytes: 100,
        };

        assert_eq!(report.remaining_upload_bytes(), 0);
    }

    #[test]
    fn test_gigabytes() {
        assert_eq!(gigabytes(0), 0.0);
        assert!((gigabytes(1024 * 1024 * 1024) - 1.0).abs() < f64::EPSILON);
    }
}
