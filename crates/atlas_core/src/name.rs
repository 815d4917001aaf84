use crate::error::StoreError;
use std::fmt;

/// A validated asset name.
///
/// Names double as a directory name and a file stem, so anything that could
/// step outside the category directory is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetName(String);

impl AssetName {
    pub fn parse(name: &str) -> Result<Self, StoreError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(StoreError::InvalidName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<name>.json`
    pub fn document_file(&self) -> String {
        format!("{}.json", self.0)
    }

    /// `<name>_thumbnail.png`
    pub fn thumbnail_file(&self) -> String {
        format!("{}_thumbnail.png", self.0)
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduces a bare upload filename to `[A-Za-z0-9_.-]`.
///
/// Whitespace runs become a single `_`, other characters are dropped and
/// leading/trailing dots and underscores are trimmed. May return an empty
/// string.
pub fn sanitize_filename(file_name: &str) -> String {
    let joined = file_name.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Normalizes a client-supplied nested path so it stays below its root.
///
/// Both separators are accepted; empty, `.` and `..` segments are dropped and
/// the rest rejoined with `/`.
pub fn normalize_relative_path(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}

/// Picks the path an uploaded file is stored under inside the staging area.
///
/// A supplied path with a separator keeps its directory structure, anything
/// else is treated as a bare filename. `None` means the upload has no usable
/// name and should be skipped, which includes every upload without a
/// filename.
pub fn staged_path(file_name: &str, supplied: Option<&str>) -> Option<String> {
    if file_name.is_empty() {
        return None;
    }
    let candidate = supplied.filter(|p| !p.is_empty()).unwrap_or(file_name);
    let path = if candidate.contains(['/', '\\']) {
        normalize_relative_path(candidate)
    } else {
        sanitize_filename(file_name)
    };
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        for name in ["forest", "Level 1", "قرية", "boss.v2"] {
            assert_eq!(AssetName::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_traversal() {
        for name in ["", ".", "..", "../etc", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(AssetName::parse(name), Err(StoreError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn file_names() {
        let name = AssetName::parse("hero").unwrap();
        assert_eq!(name.document_file(), "hero.json");
        assert_eq!(name.thumbnail_file(), "hero_thumbnail.png");
    }

    #[test]
    fn sanitizes_bare_filenames() {
        assert_eq!(sanitize_filename("my model.glb"), "my_model.glb");
        assert_eq!(sanitize_filename("  tree  (1).png "), "tree_1.png");
        assert_eq!(sanitize_filename("..hidden"), "hidden");
        assert_eq!(sanitize_filename("صوت.mp3"), "mp3");
        assert_eq!(sanitize_filename("???"), "");
    }

    #[test]
    fn normalizes_nested_paths() {
        assert_eq!(normalize_relative_path("models/tree.glb"), "models/tree.glb");
        assert_eq!(normalize_relative_path("/abs/../../x.png"), "abs/x.png");
        assert_eq!(normalize_relative_path("a\\b\\c.ogg"), "a/b/c.ogg");
        assert_eq!(normalize_relative_path("./a//b"), "a/b");
        assert_eq!(normalize_relative_path("../.."), "");
    }

    #[test]
    fn staged_path_prefers_supplied_nested_path() {
        assert_eq!(
            staged_path("b.png", Some("a/b.png")).as_deref(),
            Some("a/b.png")
        );
        assert_eq!(
            staged_path("my file.png", Some("my file.png")).as_deref(),
            Some("my_file.png")
        );
        assert_eq!(staged_path("x.wav", None).as_deref(), Some("x.wav"));
        assert_eq!(staged_path("", None), None);
        assert_eq!(staged_path("", Some("a/b.png")), None);
        assert_eq!(staged_path("x", Some("../..")), None);
    }
}
