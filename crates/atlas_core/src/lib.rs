pub mod category;
pub mod document;
pub mod error;
pub mod name;
pub mod thumbnail;
pub mod traits;

pub mod prelude {
    pub use super::category::*;
    pub use super::document::*;
    pub use super::error::*;
    pub use super::name::*;
    pub use super::thumbnail::*;
    pub use super::traits::*;
}
