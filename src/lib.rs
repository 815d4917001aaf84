pub use atlas_core::*;

#[cfg(feature = "server")]
pub mod server {
    pub use atlas_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use atlas_client::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use atlas_fs::*;
}

pub mod prelude {
    pub use atlas_core::prelude::*;

    #[cfg(feature = "server")]
    pub use atlas_server::prelude::*;

    #[cfg(feature = "client")]
    pub use atlas_client::AtlasClient;

    #[cfg(feature = "fs")]
    pub use atlas_fs::{FileSystemStore, StagingArea};
}
