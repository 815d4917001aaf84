use atlas_core::traits::AssetStore;

#[derive(Clone)]
pub struct AppState<S: AssetStore + Clone> {
    pub store: S,
}
