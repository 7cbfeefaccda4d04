// Local filesystem adapter - File system operations on the host

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::rules::SegmentSelector;
use crate::ports::*;

/// Local filesystem adapter
#[derive(Debug, Default, Clone)]
pub struct FsLocalAdapter;

impl FsLocalAdapter {
    /// Create new local filesystem adapter
    pub fn new() -> Self {
        Self
    }

    /// Blocking directory listing, one level deep, files only
    fn list_file_names(dir: &Path) -> Result<Vec<String>, DomainError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                DomainError::FsFail(format!("Failed to list {}: {}", dir.display(), e))
            })?;
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to check {}: {}", path.display(), e)))
    }

    async fn create_directory(&self, path: &Path) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn list_segments(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, DomainError> {
        if !self.file_exists(dir).await? {
            debug!(dir = %dir.display(), "Segment directory missing, nothing listed");
            return Ok(Vec::new());
        }

        let owned_dir = dir.to_path_buf();
        let names = tokio::task::spawn_blocking(move || Self::list_file_names(&owned_dir))
            .await
            .map_err(|e| DomainError::FsFail(format!("Listing task failed: {}", e)))??;

        Ok(SegmentSelector::select(names, prefix)
            .into_iter()
            .map(|name| dir.join(name))
            .collect())
    }

    async fn delete_file(&self, path: &Path) -> Result<(), DomainError> {
        tokio::fs::remove_file(path).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to delete file {}: {}", path.display(), e))
        })
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), DomainError> {
        tokio::fs::remove_dir_all(path).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to delete directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), DomainError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_directory(parent).await?;
        }
        tokio::fs::write(path, contents).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}
