use crate::tree;
use crate::{is_dir, read_or_not_found};
use atlas_core::prelude::*;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Handle to the shared import staging directory.
///
/// There is a single staging area per store; importing replaces its contents
/// wholesale and nothing guards against two sessions using it at once.
#[derive(Clone, Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn exists(&self) -> bool {
        is_dir(&self.root).await
    }

    /// Wipes the staging area and writes the uploads into a fresh one.
    pub async fn import(&self, files: Vec<UploadedFile>) -> Result<Vec<ImportedFile>, StoreError> {
        self.clear().await?;
        fs::create_dir_all(&self.root).await?;

        let mut imported = Vec::with_capacity(files.len());
        for file in files {
            let Some(path) = staged_path(&file.file_name, file.relative_path.as_deref()) else {
                debug!("Skipping upload without a usable name: {:?}", file.file_name);
                continue;
            };

            let full_path = self.root.join(&path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&full_path, &file.data).await?;

            imported.push(ImportedFile {
                name: path,
                size: file.data.len() as u64,
                original_name: file.file_name,
            });
        }

        info!("Imported {} files into staging", imported.len());
        Ok(imported)
    }

    pub async fn list(&self) -> Result<Vec<StagedFile>, StoreError> {
        tree::list_files(self.root.clone()).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        if self.exists().await {
            fs::remove_dir_all(&self.root).await?;
        }
        Ok(())
    }

    pub async fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        let relative = normalize_relative_path(path);
        if relative.is_empty() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        read_or_not_found(&self.root.join(relative)).await
    }

    /// Copies the top-level entries of `src` into staging, creating it if needed.
    pub async fn absorb(&self, src: &Path) -> Result<Vec<String>, StoreError> {
        tree::merge_entries(src.to_path_buf(), self.root.clone()).await
    }

    /// Copies every top-level staging entry into `dest`. Staging is left intact.
    pub async fn copy_into(&self, dest: &Path) -> Result<Vec<String>, StoreError> {
        if !self.exists().await {
            return Ok(Vec::new());
        }
        tree::merge_entries(self.root.clone(), dest.to_path_buf()).await
    }

    /// Like [`StagingArea::copy_into`], then removes the staging area.
    pub async fn drain_into(&self, dest: &Path) -> Result<Vec<String>, StoreError> {
        if !self.exists().await {
            return Ok(Vec::new());
        }
        let moved = tree::merge_entries(self.root.clone(), dest.to_path_buf()).await?;
        self.clear().await?;
        Ok(moved)
    }

    /// Replaces `dest` with a full copy of staging. Returns the file count.
    pub async fn snapshot_to(&self, dest: &Path) -> Result<u64, StoreError> {
        if !self.exists().await {
            return Ok(0);
        }
        tree::replace_tree(self.root.clone(), dest.to_path_buf()).await
    }
}
