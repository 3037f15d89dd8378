//! Machine images and supported service versions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A machine image usable with a service in a region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    /// Service version the image is built for.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(rename = "gpu", default, skip_serializing_if = "std::ops::Not::not")]
    pub gpu_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Image {
    pub fn new(name: impl Into<String>, version: impl Into<String>, gpu_available: bool) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            gpu_available,
            ..Default::default()
        }
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Versions of a service supported at one location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationVersion {
    pub location: String,
    pub versions: Vec<String>,
    #[serde(default)]
    pub default: String,
}

impl LocationVersion {
    /// Create a location version. An empty `default` falls back to the first
    /// listed version.
    pub fn new(location: impl Into<String>, versions: Vec<String>, default: impl Into<String>) -> Self {
        let mut default = default.into();
        if default.is_empty()
            && let Some(first) = versions.first()
        {
            default = first.clone();
        }
        Self {
            location: location.into(),
            versions,
            default,
        }
    }
}
