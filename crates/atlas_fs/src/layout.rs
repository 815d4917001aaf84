use atlas_core::prelude::*;
use std::path::{Path, PathBuf};

/// Folder inside an asset directory holding its bundled binaries.
pub const BUNDLE_DIR: &str = "assets";

/// Flow bundle entry holding the staging snapshot.
pub const EXTERNAL_ASSETS: &str = "external_assets";

pub(crate) const SCENE_PREFIX: &str = "scene_";
pub(crate) const SCENE_ASSETS_SUFFIX: &str = "_assets";

/// Maps categories and names onto the on-disk tree:
///
/// ```text
/// <root>/<category dir>/<name>/<name>.json
///                             /<name>_thumbnail.png
///                             /assets/
/// ```
#[derive(Clone, Debug)]
pub struct AssetLayout {
    root: PathBuf,
}

impl AssetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    pub fn asset_dir(&self, category: Category, name: &AssetName) -> PathBuf {
        self.category_dir(category).join(name.as_str())
    }

    pub fn document_path(&self, category: Category, name: &AssetName) -> PathBuf {
        self.asset_dir(category, name).join(name.document_file())
    }

    pub fn thumbnail_path(&self, category: Category, name: &AssetName) -> PathBuf {
        self.asset_dir(category, name).join(name.thumbnail_file())
    }

    pub fn bundle_dir(&self, category: Category, name: &AssetName) -> PathBuf {
        self.asset_dir(category, name).join(BUNDLE_DIR)
    }
}

/// `scene_<name>.json`
pub(crate) fn bundled_scene_document(scene: &AssetName) -> String {
    format!("{SCENE_PREFIX}{scene}.json")
}

/// `scene_<name>_assets`
pub(crate) fn bundled_scene_assets(scene: &AssetName) -> String {
    format!("{SCENE_PREFIX}{scene}{SCENE_ASSETS_SUFFIX}")
}
