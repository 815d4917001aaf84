use atlas_fs::{FileSystemStore, StagingArea};
use atlas_server::AtlasServer;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

const BOUNDARY: &str = "atlas-test-boundary";

fn app() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let store = FileSystemStore::new(
        dir.path().join("assets"),
        StagingArea::new(dir.path().join("staging")),
    );
    (dir, AtlasServer::default().build(store))
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    json_response(send(app, req).await).await
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    json_response(send(app, req).await).await
}

async fn json_response(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Builds a multipart body with one `files` part per entry, each followed by
/// its `paths` part.
fn multipart(files: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (file_name, path, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(
            format!(
                "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"paths\"\r\n\r\n{path}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/assets/import-external")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = app();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_save_load_list_delete() {
    let (_dir, app) = app();

    let (status, body) = post_json(
        &app,
        "/api/assets/save",
        json!({ "type": "map", "name": "village", "code": "ground();" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "village.json");

    let (status, body) = call(&app, Method::GET, "/api/assets/load/map/village").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["code"], "ground();");
    assert_eq!(body["data"]["type"], "map");
    assert!(body["data"]["created_at"].is_string());

    let (status, body) = call(&app, Method::GET, "/api/assets/list/map").await;
    assert_eq!(status, StatusCode::OK);
    let assets = body["assets"].as_array().unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["folder"], "village");
    assert_eq!(assets[0]["has_thumbnail"], false);

    let (status, body) = call(&app, Method::DELETE, "/api/assets/delete/map/village").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = call(&app, Method::GET, "/api/assets/load/map/village").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (_, body) = call(&app, Method::GET, "/api/assets/list/map").await;
    assert!(body["assets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_requests() {
    let (_dir, app) = app();

    let (status, body) = call(&app, Method::GET, "/api/assets/list/texture").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = post_json(
        &app,
        "/api/assets/save",
        json!({ "type": "map", "name": "village" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/api/assets/save",
        json!({ "type": "map", "name": "../escape", "code": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/assets/save")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = json_response(send(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = post_json(&app, "/api/assets/restore-flow-assets", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_is_404() {
    let (_dir, app) = app();
    let (status, body) = call(&app, Method::DELETE, "/api/assets/delete/scene/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_thumbnail_roundtrip() {
    let (_dir, app) = app();
    let thumbnail = json!({
        "type": "character",
        "name": "hero",
        "thumbnail": "data:image/png;base64,iVBORw=="
    });

    let (status, _) = post_json(&app, "/api/assets/save-thumbnail", thumbnail.clone()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    post_json(
        &app,
        "/api/assets/save",
        json!({ "type": "character", "name": "hero", "code": "{}" }),
    )
    .await;
    let (status, body) = post_json(&app, "/api/assets/save-thumbnail", thumbnail).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let req = Request::builder()
        .uri("/api/assets/thumbnail/character/hero")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &[0x89, b'P', b'N', b'G']);

    let (status, _) = call(&app, Method::GET, "/api/assets/thumbnail/flow/hero").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_list_serve_and_move() {
    let (_dir, app) = app();

    let upload = multipart(&[
        ("b.png", "a/b.png", b"pixels".as_slice()),
        ("theme.ogg", "theme.ogg", b"ogg".as_slice()),
    ]);
    let (status, body) = json_response(send(&app, upload).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"][0]["name"], "a/b.png");
    assert_eq!(body["files"][0]["size"], 6);
    assert_eq!(body["files"][0]["original_name"], "b.png");

    let (_, body) = call(&app, Method::GET, "/api/assets/list-external").await;
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "a/b.png");

    let req = Request::builder()
        .uri("/external-import/a/b.png")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");

    post_json(
        &app,
        "/api/assets/save",
        json!({ "type": "object", "name": "crate", "code": "box" }),
    )
    .await;
    let (status, body) = post_json(
        &app,
        "/api/assets/move-external-to-project",
        json!({ "type": "object", "name": "crate" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movedFiles"], json!(["a", "theme.ogg"]));

    let (_, body) = call(&app, Method::GET, "/api/assets/list-external").await;
    assert!(body["files"].as_array().unwrap().is_empty());

    let (_, body) = post_json(
        &app,
        "/api/assets/copy-project-assets",
        json!({ "type": "object", "name": "crate" }),
    )
    .await;
    assert_eq!(body["foundAssets"], true);
    assert_eq!(body["copiedFiles"], json!(["a", "theme.ogg"]));
}

#[tokio::test]
async fn test_staged_editor_formats_content_types() {
    let (_dir, app) = app();
    let upload = multipart(&[
        ("level.babylon", "scene/level.babylon", b"{}".as_slice()),
        ("crate.obj", "scene/crate.obj", b"v 0 0 0".as_slice()),
        ("crate.MTL", "scene/crate.MTL", b"newmtl a".as_slice()),
        ("tree.glb", "scene/tree.glb", b"glb".as_slice()),
    ]);
    let (status, _) = json_response(send(&app, upload).await).await;
    assert_eq!(status, StatusCode::OK);

    for (file, expected) in [
        ("level.babylon", "application/json"),
        ("crate.obj", "text/plain"),
        ("crate.MTL", "text/plain"),
        ("tree.glb", "model/gltf-binary"),
    ] {
        let req = Request::builder()
            .uri(format!("/external-import/scene/{file}"))
            .body(Body::empty())
            .unwrap();
        let resp = send(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], expected, "{file}");
    }
}

#[tokio::test]
async fn test_import_without_files() {
    let (_dir, app) = app();
    let (status, body) = json_response(send(&app, multipart(&[])).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_bundle_flow_then_restore() {
    let (_dir, app) = app();

    for (category, name) in [("scene", "intro"), ("flow", "story")] {
        post_json(
            &app,
            "/api/assets/save",
            json!({ "type": category, "name": name, "code": "{}" }),
        )
        .await;
    }

    send(&app, multipart(&[("rock.glb", "models/rock.glb", b"glb".as_slice())])).await;
    let (status, body) = post_json(
        &app,
        "/api/assets/bundle-scene-assets",
        json!({ "sceneName": "intro", "sceneCode": "{}" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bundledFiles"], json!(["models"]));

    call(&app, Method::DELETE, "/api/assets/clear-external").await;

    let (status, body) = post_json(
        &app,
        "/api/assets/bundle-flow-project",
        json!({ "flowName": "story", "sceneNames": ["intro", "missing"], "flowData": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bundledScenes"], json!(["intro"]));
    assert_eq!(body["totalFiles"], 1);

    let (status, body) = post_json(
        &app,
        "/api/assets/restore-flow-assets",
        json!({ "flowName": "story" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foundAssets"], true);
    assert_eq!(body["restoredFiles"], 1);
    assert_eq!(body["restoredScenes"], json!(["intro"]));

    let (_, body) = call(&app, Method::GET, "/api/assets/list-external").await;
    assert_eq!(body["files"][0]["name"], "models/rock.glb");
}

#[tokio::test]
async fn test_restore_without_bundle() {
    let (_dir, app) = app();
    let (status, body) = post_json(
        &app,
        "/api/assets/restore-flow-assets",
        json!({ "flowName": "empty" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foundAssets"], false);
}

#[tokio::test]
async fn test_custom_prefix() {
    let dir = tempdir().unwrap();
    let store = FileSystemStore::new(dir.path().join("a"), StagingArea::new(dir.path().join("s")));
    let app = AtlasServer::new(atlas_server::AtlasServerConfig {
        prefix: "/v2/".to_string(),
        ..Default::default()
    })
    .build(store);

    let (status, _) = call(&app, Method::GET, "/v2/list/code").await;
    assert_eq!(status, StatusCode::OK);
}
