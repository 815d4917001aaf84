//! HTTP surface of the Atlas asset store.
//!
//! [`AtlasServer::build`] turns any [`AssetStore`](atlas_core::traits::AssetStore)
//! into an axum [`Router`](axum::Router) ready to be served.

mod api;

pub mod server;
pub mod state;

pub use server::{AtlasServer, AtlasServerConfig};

pub mod prelude {
    pub use crate::server::*;
    pub use crate::state::*;
}
