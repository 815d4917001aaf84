use crate::{api, prelude::*};
use atlas_core::prelude::*;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

/// The builder for the Atlas Server.
#[derive(Clone, Debug, Default)]
pub struct AtlasServer {
    config: AtlasServerConfig,
}

impl AtlasServer {
    pub fn new(config: AtlasServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Clone, Debug)]
pub struct AtlasServerConfig {
    /// Prefix every asset route is mounted under.
    ///
    /// Defaults to `/api/assets`.
    pub prefix: String,
    /// Route staged files are served from, e.g. `/external-import/models/tree.glb`.
    ///
    /// Defaults to `/external-import`.
    pub staging_route: String,
}

impl Default for AtlasServerConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/assets".to_string(),
            staging_route: "/external-import".to_string(),
        }
    }
}

impl AtlasServer {
    pub fn build<S: AssetStore>(self, store: S) -> Router {
        let AtlasServerConfig {
            prefix,
            staging_route,
        } = self.config;
        let state = AppState { store };

        let assets = Router::new()
            .route("/save", post(api::save_asset))
            .route("/load/{category}/{name}", get(api::load_asset))
            .route("/list/{category}", get(api::list_assets))
            .route("/delete/{category}/{name}", delete(api::delete_asset))
            .route("/save-thumbnail", post(api::save_thumbnail))
            .route("/thumbnail/{category}/{name}", get(api::get_thumbnail))
            .route("/import-external", post(api::import_external))
            .route("/list-external", get(api::list_external))
            .route("/clear-external", delete(api::clear_external))
            .route(
                "/move-external-to-project",
                post(api::move_external_to_project),
            )
            .route("/copy-project-assets", post(api::copy_project_assets))
            .route("/bundle-scene-assets", post(api::bundle_scene_assets))
            .route("/bundle-flow-project", post(api::bundle_flow_project))
            .route("/restore-flow-assets", post(api::restore_flow_assets));

        let prefix = prefix.trim_end_matches('/');
        let staging_route = staging_route.trim_end_matches('/');
        info!("Mounting asset routes under '{prefix}', staged files under '{staging_route}'");

        let router = Router::new()
            .route("/health", get(|| async { "OK" }))
            .route(
                &format!("{staging_route}/{{*path}}"),
                get(api::serve_staged),
            );
        let router = if prefix.is_empty() {
            router.merge(assets)
        } else {
            router.nest(prefix, assets)
        };

        router
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
