use crate::category::Category;
use crate::name::AssetName;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Parses a stored timestamp.
///
/// Documents written by older editors carry ISO-8601 timestamps without an
/// offset (`2024-05-01T12:00:00.123456`); those are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|t| t.and_utc()))
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// The JSON document stored as `<name>/<name>.json`.
///
/// `code` is an opaque blob owned by the editor (a serialized scene graph,
/// script source, ...) and is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDocument {
    pub name: String,

    #[serde(rename = "type")]
    pub category: Category,

    pub code: String,

    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl AssetDocument {
    pub fn new(category: Category, name: &AssetName, code: String, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            category,
            code,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One row of a category listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    /// The name recorded inside the document.
    pub name: String,

    /// The directory the document was found in.
    pub folder: String,

    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub has_thumbnail: bool,
}

/// A file received by an import request, before it is written to staging.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename reported by the client.
    pub file_name: String,

    /// Optional path relative to the folder the user picked, e.g. `models/tree.glb`.
    pub relative_path: Option<String>,

    pub data: Bytes,
}

/// Result of writing one [`UploadedFile`] to staging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedFile {
    /// Path relative to the staging root.
    pub name: String,
    pub size: u64,
    pub original_name: String,
}

/// A file currently sitting in the staging area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedFile {
    /// Path relative to the staging root, `/` separated.
    pub name: String,
    pub size: u64,

    /// Modification time in seconds since the Unix epoch.
    pub modified: f64,
}

/// Outcome of bundling scenes and staged files into a flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowBundle {
    /// Scenes whose document was copied into the bundle.
    pub bundled_scenes: Vec<String>,

    /// Files copied from scene asset folders and the staging snapshot.
    pub total_files: u64,
}

/// Outcome of unpacking a flow bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRestore {
    /// Top-level entries copied back into staging.
    pub restored_files: u64,

    /// Scenes whose document was written back to the scenes directory.
    pub restored_scenes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_offset_and_naive_timestamps() {
        let zoned = parse_timestamp("2024-05-01T12:00:00.123456+02:00").unwrap();
        let naive = parse_timestamp("2024-05-01T10:00:00.123456").unwrap();
        assert_eq!(zoned, naive);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn document_with_naive_timestamps_parses() {
        let raw = r#"{"name":"old","type":"map","code":"x",
            "created_at":"2024-05-01T12:00:00.123456",
            "updated_at":"2024-05-02T08:30:00"}"#;
        let document: AssetDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(document.category, Category::Map);
        assert_eq!(document.updated_at.to_rfc3339(), "2024-05-02T08:30:00+00:00");
    }
}
