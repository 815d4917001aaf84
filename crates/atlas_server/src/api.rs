use crate::state::AppState;

use atlas_core::prelude::*;
use axum::{
    Json,
    extract::{Multipart, Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self
            .0
            .downcast_ref::<StoreError>()
            .map(|store_err| match store_err {
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, store_err.to_string()),
                e if e.is_bad_request() => (StatusCode::BAD_REQUEST, e.to_string()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, store_err.to_string()),
            })
            .unwrap_or_else(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal Server Error: {}", self.0),
                )
            });

        if status.is_server_error() {
            error!("{message}");
        }

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Unwraps a JSON body, treating an absent or malformed body as missing data.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| StoreError::MissingInput(rejection.body_text()).into())
}

fn required(value: Option<String>, field: &str) -> Result<String, StoreError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StoreError::MissingInput(format!("'{field}' is required")))
}

fn category_and_name(
    category: Option<String>,
    name: Option<String>,
) -> Result<(Category, AssetName), StoreError> {
    let category = required(category, "type")?.parse()?;
    let name = AssetName::parse(&required(name, "name")?)?;
    Ok((category, name))
}

#[derive(Deserialize)]
pub struct SaveRequest {
    #[serde(rename = "type")]
    category: Option<String>,
    name: Option<String>,
    code: Option<String>,
}

/// POST /save
pub async fn save_asset<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let (category, name) = category_and_name(req.category, req.name)?;
    let code = required(req.code, "code")?;

    let filename = state.store.save(category, &name, code).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Saved {category} '{name}'"),
        "filename": filename
    })))
}

/// GET /load/{category}/{name}
pub async fn load_asset<S: AssetStore>(
    State(state): State<AppState<S>>,
    Path((category, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let category: Category = category.parse()?;
    let name = AssetName::parse(&name)?;

    let document = state.store.load(category, &name).await?;

    Ok(Json(json!({ "success": true, "data": document })))
}

/// GET /list/{category}
pub async fn list_assets<S: AssetStore>(
    State(state): State<AppState<S>>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category: Category = category.parse()?;
    let assets = state.store.list(category).await?;

    Ok(Json(json!({ "success": true, "assets": assets })))
}

/// DELETE /delete/{category}/{name}
pub async fn delete_asset<S: AssetStore>(
    State(state): State<AppState<S>>,
    Path((category, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let category: Category = category.parse()?;
    let name = AssetName::parse(&name)?;

    state.store.delete(category, &name).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Deleted {category} '{name}'")
    })))
}

#[derive(Deserialize)]
pub struct ThumbnailRequest {
    #[serde(rename = "type")]
    category: Option<String>,
    name: Option<String>,
    /// Base64 PNG, optionally as a `data:image/png;base64,` URL.
    thumbnail: Option<String>,
}

/// POST /save-thumbnail
pub async fn save_thumbnail<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ThumbnailRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let (category, name) = category_and_name(req.category, req.name)?;
    let png = decode_thumbnail(&required(req.thumbnail, "thumbnail")?)?;

    state.store.save_thumbnail(category, &name, png).await?;

    Ok(Json(json!({ "success": true, "message": "Thumbnail saved" })))
}

/// GET /thumbnail/{category}/{name}
pub async fn get_thumbnail<S: AssetStore>(
    State(state): State<AppState<S>>,
    Path((category, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let category: Category = category.parse()?;
    let name = AssetName::parse(&name)?;

    let png = state.store.read_thumbnail(category, &name).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// POST /import-external
///
/// Multipart form with repeated `files` parts and, optionally, one `paths`
/// text part per file carrying its path relative to the picked folder.
pub async fn import_external<S: AssetStore>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        StoreError::InvalidInput(format!("malformed upload: {e}"))
    };

    let mut uploads = Vec::new();
    let mut paths = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let field_name = field
            .name()
            .unwrap_or_default()
            .trim_end_matches("[]")
            .to_string();
        match field_name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(bad_form)?;
                uploads.push((file_name, data));
            }
            "paths" => paths.push(field.text().await.map_err(bad_form)?),
            _ => {}
        }
    }

    if uploads.is_empty() {
        return Err(StoreError::MissingInput("no files to upload".into()).into());
    }

    let mut paths = paths.into_iter();
    let files = uploads
        .into_iter()
        .map(|(file_name, data)| UploadedFile {
            file_name,
            relative_path: paths.next(),
            data,
        })
        .collect();

    let imported = state.store.import_staged(files).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Uploaded {} files", imported.len()),
        "files": imported
    })))
}

/// GET /list-external
pub async fn list_external<S: AssetStore>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError> {
    let files = state.store.list_staged().await?;
    Ok(Json(json!({ "success": true, "files": files })))
}

/// DELETE /clear-external
pub async fn clear_external<S: AssetStore>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.clear_staged().await?;
    info!("Cleared staging area");
    Ok(Json(json!({
        "success": true,
        "message": "Cleared all imported files"
    })))
}

#[derive(Deserialize)]
pub struct AssetRef {
    #[serde(rename = "type")]
    category: Option<String>,
    name: Option<String>,
}

/// POST /move-external-to-project
pub async fn move_external_to_project<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<AssetRef>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let (category, name) = category_and_name(req.category, req.name)?;

    let moved = state.store.move_staged_to_project(category, &name).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Moved {} entries into the project folder", moved.len()),
        "movedFiles": moved
    })))
}

/// POST /copy-project-assets
pub async fn copy_project_assets<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<AssetRef>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let (category, name) = category_and_name(req.category, req.name)?;

    let response = match state.store.copy_project_assets(category, &name).await? {
        None => json!({
            "success": true,
            "foundAssets": false,
            "message": "The project has no assets folder"
        }),
        Some(copied) => json!({
            "success": true,
            "foundAssets": true,
            "message": format!("Copied {} entries from the assets folder", copied.len()),
            "copiedFiles": copied
        }),
    };
    Ok(Json(response))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSceneRequest {
    scene_name: Option<String>,
    /// Accepted for compatibility, the editor saves the scene separately.
    #[allow(dead_code)]
    scene_code: Option<String>,
}

/// POST /bundle-scene-assets
pub async fn bundle_scene_assets<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<BundleSceneRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let scene = AssetName::parse(&required(req.scene_name, "sceneName")?)?;

    let bundled = state.store.bundle_scene_assets(&scene).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Bundled {} entries with the scene", bundled.len()),
        "bundledFiles": bundled
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleFlowRequest {
    flow_name: Option<String>,
    #[serde(default)]
    scene_names: Vec<String>,
    /// Accepted for compatibility, the flow document is saved separately.
    #[allow(dead_code)]
    flow_data: Option<serde_json::Value>,
}

/// POST /bundle-flow-project
pub async fn bundle_flow_project<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<BundleFlowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let flow = AssetName::parse(&required(req.flow_name, "flowName")?)?;
    let scenes = req
        .scene_names
        .iter()
        .map(|s| AssetName::parse(s))
        .collect::<Result<Vec<_>, _>>()?;

    let bundle = state.store.bundle_flow_project(&flow, &scenes).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Bundled flow with {} scenes and {} files",
            bundle.bundled_scenes.len(),
            bundle.total_files
        ),
        "bundledScenes": bundle.bundled_scenes,
        "totalFiles": bundle.total_files
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFlowRequest {
    flow_name: Option<String>,
}

/// POST /restore-flow-assets
pub async fn restore_flow_assets<S: AssetStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RestoreFlowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let flow = AssetName::parse(&required(req.flow_name, "flowName")?)?;

    let response = match state.store.restore_flow_assets(&flow).await? {
        None => json!({
            "success": true,
            "foundAssets": false,
            "message": "The flow has no bundled assets"
        }),
        Some(restore) => json!({
            "success": true,
            "foundAssets": true,
            "message": format!(
                "Restored {} files from {} scenes",
                restore.restored_files,
                restore.restored_scenes.len()
            ),
            "restoredFiles": restore.restored_files,
            "restoredScenes": restore.restored_scenes
        }),
    };
    Ok(Json(response))
}

/// GET /external-import/{*path}
pub async fn serve_staged<S: AssetStore>(
    State(state): State<AppState<S>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.store.read_staged(&path).await?;
    Ok(([(header::CONTENT_TYPE, staged_content_type(&path))], data))
}

/// Content type for a staged file. Editor model formats get the types the
/// scene loader expects, everything else goes through `mime_guess`.
fn staged_content_type(path: &str) -> String {
    let extension = std::path::Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    let known = match extension.as_deref() {
        Some("glb") => Some("model/gltf-binary"),
        Some("gltf") => Some("model/gltf+json"),
        Some("obj" | "mtl") => Some("text/plain"),
        Some("babylon") => Some("application/json"),
        Some("wav") => Some("audio/wav"),
        Some("webm") => Some("audio/webm"),
        _ => None,
    };
    match known {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_path(path).first_or_octet_stream().to_string(),
    }
}
