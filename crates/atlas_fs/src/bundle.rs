//! Flow bundles.
//!
//! A flow's `assets/` folder holds, side by side:
//!
//! * `scene_<name>.json`: a copy of each referenced scene document
//! * `scene_<name>_assets/`: a copy of each scene's own `assets/`
//! * `external_assets/`: the staging area at bundle time
//!
//! Bundles are plain copies, later edits to a scene do not reach them.

use crate::layout::*;
use crate::staging::StagingArea;
use crate::{is_dir, is_file, tree};
use atlas_core::prelude::*;
use tokio::fs;
use tracing::{debug, info, warn};

pub(crate) async fn bundle_flow(
    layout: &AssetLayout,
    staging: &StagingArea,
    flow: &AssetName,
    scenes: &[AssetName],
) -> Result<FlowBundle, StoreError> {
    let bundle_dir = layout.bundle_dir(Category::Flow, flow);
    fs::create_dir_all(&bundle_dir).await?;

    let mut report = FlowBundle::default();
    for scene in scenes {
        if !is_dir(&layout.asset_dir(Category::Scene, scene)).await {
            debug!("Scene {scene} referenced by flow {flow} does not exist");
            continue;
        }

        let document = layout.document_path(Category::Scene, scene);
        if is_file(&document).await {
            fs::copy(&document, bundle_dir.join(bundled_scene_document(scene))).await?;
            report.bundled_scenes.push(scene.to_string());
        }

        let scene_assets = layout.bundle_dir(Category::Scene, scene);
        if is_dir(&scene_assets).await {
            report.total_files +=
                tree::replace_tree(scene_assets, bundle_dir.join(bundled_scene_assets(scene)))
                    .await?;
        }
    }

    report.total_files += staging.snapshot_to(&bundle_dir.join(EXTERNAL_ASSETS)).await?;

    info!(
        "Bundled flow {flow}: {} scenes, {} files",
        report.bundled_scenes.len(),
        report.total_files
    );
    Ok(report)
}

pub(crate) async fn restore_flow(
    layout: &AssetLayout,
    staging: &StagingArea,
    flow: &AssetName,
) -> Result<Option<FlowRestore>, StoreError> {
    let bundle_dir = layout.bundle_dir(Category::Flow, flow);
    if !is_dir(&bundle_dir).await {
        return Ok(None);
    }

    fs::create_dir_all(staging.root()).await?;

    let mut entries = Vec::new();
    let mut dir = fs::read_dir(&bundle_dir).await?;
    while let Some(entry) = dir.next_entry().await? {
        entries.push(entry);
    }
    entries.sort_by_key(|e| e.file_name());

    let mut report = FlowRestore::default();
    for entry in entries {
        let Ok(entry_name) = entry.file_name().into_string() else {
            continue;
        };
        let path = entry.path();
        let file_type = entry.file_type().await?;

        if let Some(scene) = entry_name
            .strip_prefix(SCENE_PREFIX)
            .and_then(|rest| rest.strip_suffix(".json"))
            .filter(|_| file_type.is_file())
        {
            let Ok(scene) = AssetName::parse(scene) else {
                warn!("Ignoring bundled scene document with invalid name: {entry_name}");
                continue;
            };
            fs::create_dir_all(layout.asset_dir(Category::Scene, &scene)).await?;
            fs::copy(&path, layout.document_path(Category::Scene, &scene)).await?;
            report.restored_scenes.push(scene.to_string());
        } else if file_type.is_dir()
            && (entry_name == EXTERNAL_ASSETS
                || (entry_name.starts_with(SCENE_PREFIX)
                    && entry_name.ends_with(SCENE_ASSETS_SUFFIX)))
        {
            let restored = staging.absorb(&path).await?;
            report.restored_files += restored.len() as u64;
        } else {
            debug!("Ignoring unknown bundle entry {entry_name} in flow {flow}");
        }
    }

    info!(
        "Restored flow {flow}: {} scenes, {} entries into staging",
        report.restored_scenes.len(),
        report.restored_files
    );
    Ok(Some(report))
}
