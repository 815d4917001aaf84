use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of asset kinds the editor can persist.
///
/// Each category owns exactly one directory under the assets root, see
/// [`Category::dir_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Map,
    Character,
    Object,
    Scene,
    Flow,
    Code,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Map,
        Category::Character,
        Category::Object,
        Category::Scene,
        Category::Flow,
        Category::Code,
    ];

    /// The token used in URLs and in the `type` field of asset documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Map => "map",
            Category::Character => "character",
            Category::Object => "object",
            Category::Scene => "scene",
            Category::Flow => "flow",
            Category::Code => "code",
        }
    }

    /// Directory name below the assets root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Map => "maps",
            Category::Character => "characters",
            Category::Object => "objects",
            Category::Scene => "scenes",
            Category::Flow => "flows",
            Category::Code => "code-library",
        }
    }

    /// Whether assets of this category carry a `<name>_thumbnail.png`.
    pub fn has_thumbnails(&self) -> bool {
        matches!(
            self,
            Category::Map | Category::Character | Category::Object | Category::Scene
        )
    }

    /// Whether staged files may be moved into assets of this category.
    pub fn accepts_staged_assets(&self) -> bool {
        self.has_thumbnails()
    }

    /// Whether bundled assets of this category may be copied back into staging.
    pub fn exports_assets(&self) -> bool {
        self.accepts_staged_assets() || *self == Category::Code
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StoreError::InvalidCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_token() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = "maps".parse::<Category>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidCategory(t) if t == "maps"));
        assert!("Map".parse::<Category>().is_err());
    }

    #[test]
    fn code_library_directory() {
        assert_eq!(Category::Code.dir_name(), "code-library");
        assert_eq!(Category::Flow.dir_name(), "flows");
    }

    #[test]
    fn capabilities() {
        assert!(Category::Scene.has_thumbnails());
        assert!(!Category::Flow.has_thumbnails());
        assert!(!Category::Code.accepts_staged_assets());
        assert!(Category::Code.exports_assets());
        assert!(!Category::Flow.exports_assets());
    }
}
