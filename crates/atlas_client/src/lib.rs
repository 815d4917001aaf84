use atlas_core::prelude::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned error {0}: {1}")]
    ServerError(StatusCode, String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, AtlasClientError>;

/// A file to upload into the staging area.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    /// Path relative to the picked folder, e.g. `models/tree.glb`.
    pub path: String,
    pub data: Vec<u8>,
}

impl StagedUpload {
    pub async fn from_file(file: &std::path::Path, path: impl Into<String>) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            data: tokio::fs::read(file).await?,
        })
    }
}

#[derive(Deserialize)]
struct SaveResponse {
    filename: String,
}

#[derive(Deserialize)]
struct LoadResponse {
    data: AssetDocument,
}

#[derive(Deserialize)]
struct ListResponse {
    assets: Vec<AssetSummary>,
}

#[derive(Deserialize)]
struct FilesResponse<T> {
    files: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntriesResponse {
    #[serde(default, alias = "movedFiles", alias = "copiedFiles")]
    bundled_files: Vec<String>,
    #[serde(default = "default_true")]
    found_assets: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreResponse {
    found_assets: bool,
    #[serde(default)]
    restored_files: u64,
    #[serde(default)]
    restored_scenes: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone)]
pub struct AtlasClient {
    base_url: String,
    client: Client,
}

impl AtlasClient {
    /// `base_url` points at the asset routes, e.g. `http://localhost:5001/api/assets`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AtlasClientError::Validation(format!("Invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AtlasClientError::Validation("Base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or(text);
        Err(AtlasClientError::ServerError(status, message))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AtlasClientError::Validation(format!("Failed to parse response: {e}")))
    }

    async fn post<T: DeserializeOwned>(&self, route: &str, body: serde_json::Value) -> Result<T> {
        let response = self.client.post(self.url(&[route])?).json(&body).send().await?;
        Self::parse(response).await
    }

    pub async fn save(&self, category: Category, name: &str, code: &str) -> Result<String> {
        let body = json!({ "type": category, "name": name, "code": code });
        let saved: SaveResponse = self.post("save", body).await?;
        Ok(saved.filename)
    }

    pub async fn load(&self, category: Category, name: &str) -> Result<AssetDocument> {
        let url = self.url(&["load", category.as_str(), name])?;
        let loaded: LoadResponse = Self::parse(self.client.get(url).send().await?).await?;
        Ok(loaded.data)
    }

    pub async fn list(&self, category: Category) -> Result<Vec<AssetSummary>> {
        let url = self.url(&["list", category.as_str()])?;
        let listed: ListResponse = Self::parse(self.client.get(url).send().await?).await?;
        Ok(listed.assets)
    }

    pub async fn delete(&self, category: Category, name: &str) -> Result<()> {
        let url = self.url(&["delete", category.as_str(), name])?;
        Self::check(self.client.delete(url).send().await?).await?;
        Ok(())
    }

    pub async fn save_thumbnail(&self, category: Category, name: &str, png: &[u8]) -> Result<()> {
        let body = json!({
            "type": category,
            "name": name,
            "thumbnail": format!("data:image/png;base64,{}", STANDARD.encode(png)),
        });
        self.post::<serde_json::Value>("save-thumbnail", body).await?;
        Ok(())
    }

    pub async fn thumbnail(&self, category: Category, name: &str) -> Result<Bytes> {
        let url = self.url(&["thumbnail", category.as_str(), name])?;
        let response = Self::check(self.client.get(url).send().await?).await?;
        Ok(response.bytes().await?)
    }

    /// Replaces the server's staging area with `files`.
    pub async fn import_external(&self, files: Vec<StagedUpload>) -> Result<Vec<ImportedFile>> {
        if files.is_empty() {
            return Err(AtlasClientError::Validation("Nothing to upload".into()));
        }

        let mut form = Form::new();
        for file in files {
            let file_name = file
                .path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(&file.path)
                .to_string();
            form = form
                .part("files", Part::bytes(file.data).file_name(file_name))
                .text("paths", file.path);
        }

        let url = self.url(&["import-external"])?;
        let response = self.client.post(url).multipart(form).send().await?;
        let imported: FilesResponse<ImportedFile> = Self::parse(response).await?;
        Ok(imported.files)
    }

    pub async fn list_external(&self) -> Result<Vec<StagedFile>> {
        let url = self.url(&["list-external"])?;
        let listed: FilesResponse<StagedFile> =
            Self::parse(self.client.get(url).send().await?).await?;
        Ok(listed.files)
    }

    pub async fn clear_external(&self) -> Result<()> {
        let url = self.url(&["clear-external"])?;
        Self::check(self.client.delete(url).send().await?).await?;
        Ok(())
    }

    pub async fn move_external_to_project(&self, category: Category, name: &str) -> Result<Vec<String>> {
        let body = json!({ "type": category, "name": name });
        let moved: EntriesResponse = self.post("move-external-to-project", body).await?;
        Ok(moved.bundled_files)
    }

    /// `None` when the asset has no bundled files.
    pub async fn copy_project_assets(
        &self,
        category: Category,
        name: &str,
    ) -> Result<Option<Vec<String>>> {
        let body = json!({ "type": category, "name": name });
        let copied: EntriesResponse = self.post("copy-project-assets", body).await?;
        Ok(copied.found_assets.then_some(copied.bundled_files))
    }

    pub async fn bundle_scene_assets(&self, scene: &str) -> Result<Vec<String>> {
        let body = json!({ "sceneName": scene });
        let bundled: EntriesResponse = self.post("bundle-scene-assets", body).await?;
        Ok(bundled.bundled_files)
    }

    pub async fn bundle_flow_project(&self, flow: &str, scenes: &[String]) -> Result<FlowBundle> {
        let body = json!({ "flowName": flow, "sceneNames": scenes, "flowData": {} });
        self.post("bundle-flow-project", body).await
    }

    /// `None` when the flow has no bundle.
    pub async fn restore_flow_assets(&self, flow: &str) -> Result<Option<FlowRestore>> {
        let body = json!({ "flowName": flow });
        let restored: RestoreResponse = self.post("restore-flow-assets", body).await?;
        Ok(restored.found_assets.then(|| FlowRestore {
            restored_files: restored.restored_files,
            restored_scenes: restored.restored_scenes,
        }))
    }
}
