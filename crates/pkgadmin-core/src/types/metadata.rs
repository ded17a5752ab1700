//! Package metadata document.
//!
//! The admin service stores a small JSON description next to every package
//! version. Fields this crate does not know about are kept in `extra` so the
//! document survives a read/modify/write cycle unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata attached to a package version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Creation time in milliseconds since the epoch, set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,

    /// Last modification time in milliseconds since the epoch, set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<i64>,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Unknown fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PackageMetadata {
    /// Create metadata with a description
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Set a single property, returning the previous value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let mut metadata = PackageMetadata::with_description("v1");
        metadata.modification_time = Some(42);
        metadata.set_property("owner", "team-a");

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "description": "v1",
                "modificationTime": 42,
                "properties": { "owner": "team-a" }
            })
        );
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let input = serde_json::json!({
            "description": "echo function",
            "contact": "ops@example.com",
            "createTime": 1700000000000i64,
            "properties": {},
            "checksum": "abc123",
            "labels": ["a", "b"]
        });

        let metadata: PackageMetadata = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(metadata.contact.as_deref(), Some("ops@example.com"));
        assert_eq!(metadata.create_time, Some(1_700_000_000_000));
        assert_eq!(metadata.extra.get("checksum"), Some(&serde_json::json!("abc123")));

        let output = serde_json::to_value(&metadata).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_missing_fields_default() {
        let metadata: PackageMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata, PackageMetadata::default());
        assert_eq!(metadata.property("missing"), None);
    }
}
