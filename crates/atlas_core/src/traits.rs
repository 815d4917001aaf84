use crate::category::Category;
use crate::document::*;
use crate::error::*;
use crate::name::AssetName;

use bytes::Bytes;

/// Storage for editor assets and the shared import staging area.
///
/// Implementations hold no state between calls besides what lives in their
/// backing storage. Operations touching the staging area are not serialized
/// against each other.
pub trait AssetStore: Send + Sync + 'static + Clone {
    /// Writes the asset document, creating the asset directory on first save.
    /// Returns the document's filename.
    fn save(
        &self,
        category: Category,
        name: &AssetName,
        code: String,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    fn load(
        &self,
        category: Category,
        name: &AssetName,
    ) -> impl Future<Output = Result<AssetDocument, StoreError>> + Send;

    /// Best-effort listing: entries without a readable document are skipped.
    fn list(
        &self,
        category: Category,
    ) -> impl Future<Output = Result<Vec<AssetSummary>, StoreError>> + Send;

    /// Removes the asset directory and everything in it.
    fn delete(
        &self,
        category: Category,
        name: &AssetName,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn save_thumbnail(
        &self,
        category: Category,
        name: &AssetName,
        png: Bytes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn read_thumbnail(
        &self,
        category: Category,
        name: &AssetName,
    ) -> impl Future<Output = Result<Bytes, StoreError>> + Send;

    /// Replaces the staging area with the given uploads.
    fn import_staged(
        &self,
        files: Vec<UploadedFile>,
    ) -> impl Future<Output = Result<Vec<ImportedFile>, StoreError>> + Send;

    fn list_staged(&self) -> impl Future<Output = Result<Vec<StagedFile>, StoreError>> + Send;

    fn clear_staged(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads a single staged file by its path relative to the staging root.
    fn read_staged(&self, path: &str) -> impl Future<Output = Result<Bytes, StoreError>> + Send;

    /// Moves every top-level staging entry into the asset's `assets/` folder
    /// and empties the staging area. Returns the moved entry names.
    fn move_staged_to_project(
        &self,
        category: Category,
        name: &AssetName,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Copies the asset's `assets/` entries into staging.
    ///
    /// `Ok(None)` means the asset exists but has nothing bundled.
    fn copy_project_assets(
        &self,
        category: Category,
        name: &AssetName,
    ) -> impl Future<Output = Result<Option<Vec<String>>, StoreError>> + Send;

    /// Copies staging into the scene's `assets/` folder, leaving staging intact.
    fn bundle_scene_assets(
        &self,
        scene: &AssetName,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Snapshots the listed scenes and the staging area into the flow's
    /// `assets/` folder.
    fn bundle_flow_project(
        &self,
        flow: &AssetName,
        scenes: &[AssetName],
    ) -> impl Future<Output = Result<FlowBundle, StoreError>> + Send;

    /// Unpacks a flow bundle back into the scenes directory and staging.
    ///
    /// `Ok(None)` means the flow has no bundle.
    fn restore_flow_assets(
        &self,
        flow: &AssetName,
    ) -> impl Future<Output = Result<Option<FlowRestore>, StoreError>> + Send;
}
