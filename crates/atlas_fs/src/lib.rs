//! # Atlas FileSystem Storage
//!
//! A local filesystem backend for Atlas.
//!
//! This crate implements the [`AssetStore`] trait, storing asset documents,
//! thumbnails and bundled binaries under one assets root and staged imports
//! under a separate [`StagingArea`].
//!
//! ## Features
//!
//! * **Atomic Writes**: Documents and thumbnails are written to a temporary file and renamed into place, so a listing never sees half a document.
//! * **Bundles**: Scenes and flows can carry copies of imported binaries, see [`bundle`].
//!
//! ## Usage
//!
//! ```no_run
//! use atlas_fs::{FileSystemStore, StagingArea};
//!
//! let store = FileSystemStore::new("./assets", StagingArea::new("./public/external-import"));
//! ```

use atlas_core::prelude::*;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

pub mod bundle;
pub mod layout;
pub mod staging;
mod tree;

pub use layout::AssetLayout;
pub use staging::StagingArea;

async fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(StoreError::Io)?;
    }

    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, data).await.map_err(StoreError::Io)?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(StoreError::Io)?;

    Ok(())
}

/// Reads a file, reporting a missing file (or a directory in its place) as
/// [`StoreError::NotFound`].
pub(crate) async fn read_or_not_found(path: &Path) -> Result<Bytes, StoreError> {
    let not_found = || {
        let file = path.file_name().unwrap_or(path.as_os_str());
        StoreError::NotFound(file.to_string_lossy().to_string())
    };
    if is_dir(path).await {
        return Err(not_found());
    }
    match fs::read(path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

pub(crate) async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

pub(crate) async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

async fn read_document(path: &Path) -> Result<AssetDocument, StoreError> {
    let data = read_or_not_found(path).await?;
    Ok(serde_json::from_slice(&data)?)
}

#[derive(Clone, Debug)]
pub struct FileSystemStore {
    layout: AssetLayout,
    staging: StagingArea,
}

impl FileSystemStore {
    pub fn new(root: impl Into<PathBuf>, staging: StagingArea) -> Self {
        Self {
            layout: AssetLayout::new(root),
            staging,
        }
    }

    /// Creates every category directory.
    pub async fn init(&self) -> Result<(), StoreError> {
        for category in Category::ALL {
            fs::create_dir_all(self.layout.category_dir(category)).await?;
        }
        Ok(())
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    async fn require_asset_dir(
        &self,
        category: Category,
        name: &AssetName,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.layout.asset_dir(category, name);
        if is_dir(&dir).await {
            Ok(dir)
        } else {
            Err(StoreError::NotFound(format!("{category} '{name}'")))
        }
    }

    fn require_thumbnails(category: Category) -> Result<(), StoreError> {
        if category.has_thumbnails() {
            Ok(())
        } else {
            Err(StoreError::InvalidCategory(format!(
                "{category} assets have no thumbnails"
            )))
        }
    }

    async fn summarize(&self, folder_path: &Path, folder: String) -> Option<AssetSummary> {
        let document = folder_path.join(format!("{folder}.json"));
        let document = match read_document(&document).await {
            Ok(document) => document,
            Err(e) => {
                debug!("Skipping {}: {e}", folder_path.display());
                return None;
            }
        };
        let thumbnail = folder_path.join(format!("{folder}_thumbnail.png"));

        Some(AssetSummary {
            name: document.name,
            folder,
            created_at: document.created_at,
            updated_at: document.updated_at,
            has_thumbnail: is_file(&thumbnail).await,
        })
    }
}

impl AssetStore for FileSystemStore {
    async fn save(
        &self,
        category: Category,
        name: &AssetName,
        code: String,
    ) -> Result<String, StoreError> {
        let path = self.layout.document_path(category, name);
        let document = AssetDocument::new(category, name, code, Utc::now());

        let data = serde_json::to_vec_pretty(&document)?;
        atomic_write(&path, &data).await?;

        info!("Saved {category} '{name}'");
        Ok(name.document_file())
    }

    async fn load(&self, category: Category, name: &AssetName) -> Result<AssetDocument, StoreError> {
        read_document(&self.layout.document_path(category, name)).await
    }

    async fn list(&self, category: Category) -> Result<Vec<AssetSummary>, StoreError> {
        let root = self.layout.category_dir(category);
        let mut dir = match fs::read_dir(&root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut assets = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(folder) = entry.file_name().into_string() else {
                continue;
            };
            if let Some(summary) = self.summarize(&entry.path(), folder).await {
                assets.push(summary);
            }
        }

        assets.sort_by(|a, b| a.folder.cmp(&b.folder));
        Ok(assets)
    }

    async fn delete(&self, category: Category, name: &AssetName) -> Result<(), StoreError> {
        let dir = self.require_asset_dir(category, name).await?;
        fs::remove_dir_all(&dir).await?;
        info!("Deleted {category} '{name}'");
        Ok(())
    }

    async fn save_thumbnail(
        &self,
        category: Category,
        name: &AssetName,
        png: Bytes,
    ) -> Result<(), StoreError> {
        Self::require_thumbnails(category)?;
        self.require_asset_dir(category, name).await?;
        atomic_write(&self.layout.thumbnail_path(category, name), &png).await
    }

    async fn read_thumbnail(&self, category: Category, name: &AssetName) -> Result<Bytes, StoreError> {
        Self::require_thumbnails(category)?;
        read_or_not_found(&self.layout.thumbnail_path(category, name)).await
    }

    async fn import_staged(&self, files: Vec<UploadedFile>) -> Result<Vec<ImportedFile>, StoreError> {
        self.staging.import(files).await
    }

    async fn list_staged(&self) -> Result<Vec<StagedFile>, StoreError> {
        self.staging.list().await
    }

    async fn clear_staged(&self) -> Result<(), StoreError> {
        self.staging.clear().await
    }

    async fn read_staged(&self, path: &str) -> Result<Bytes, StoreError> {
        self.staging.read(path).await
    }

    async fn move_staged_to_project(
        &self,
        category: Category,
        name: &AssetName,
    ) -> Result<Vec<String>, StoreError> {
        if !category.accepts_staged_assets() {
            return Err(StoreError::InvalidCategory(format!(
                "{category} assets cannot hold imported files"
            )));
        }
        self.require_asset_dir(category, name).await?;

        let moved = self
            .staging
            .drain_into(&self.layout.bundle_dir(category, name))
            .await?;
        info!("Moved {} staged entries into {category} '{name}'", moved.len());
        Ok(moved)
    }

    async fn copy_project_assets(
        &self,
        category: Category,
        name: &AssetName,
    ) -> Result<Option<Vec<String>>, StoreError> {
        if !category.exports_assets() {
            return Err(StoreError::InvalidCategory(format!(
                "{category} assets have no project assets"
            )));
        }
        self.require_asset_dir(category, name).await?;

        let bundle_dir = self.layout.bundle_dir(category, name);
        if !is_dir(&bundle_dir).await {
            return Ok(None);
        }
        Ok(Some(self.staging.absorb(&bundle_dir).await?))
    }

    async fn bundle_scene_assets(&self, scene: &AssetName) -> Result<Vec<String>, StoreError> {
        self.require_asset_dir(Category::Scene, scene).await?;
        let bundled = self
            .staging
            .copy_into(&self.layout.bundle_dir(Category::Scene, scene))
            .await?;
        info!("Bundled {} staged entries into scene '{scene}'", bundled.len());
        Ok(bundled)
    }

    async fn bundle_flow_project(
        &self,
        flow: &AssetName,
        scenes: &[AssetName],
    ) -> Result<FlowBundle, StoreError> {
        self.require_asset_dir(Category::Flow, flow).await?;
        bundle::bundle_flow(&self.layout, &self.staging, flow, scenes).await
    }

    async fn restore_flow_assets(&self, flow: &AssetName) -> Result<Option<FlowRestore>, StoreError> {
        bundle::restore_flow(&self.layout, &self.staging, flow).await
    }
}
