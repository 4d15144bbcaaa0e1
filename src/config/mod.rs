//! Configuration loading and management

use crate::core::metadata::{EntityMetadata, MetadataRegistry};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Case policy of the `Contains` operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatch {
    /// Both sides are lower-cased (Unicode) before the substring test
    #[default]
    CaseInsensitive,
    /// Byte-exact substring test
    CaseSensitive,
}

impl TextMatch {
    /// Whether `haystack` contains `needle` under this policy
    pub fn contains(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextMatch::CaseSensitive => haystack.contains(needle),
            TextMatch::CaseInsensitive => haystack.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// Tunables of the list query pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQueryConfig {
    /// Largest page size accepted; `None` disables the bound
    #[serde(default = "default_max_page_size")]
    pub max_page_size: Option<usize>,

    #[serde(default)]
    pub text_match: TextMatch,

    /// Deadline for the joined fetch + count round-trip
    #[serde(default)]
    pub repository_timeout_ms: Option<u64>,
}

fn default_max_page_size() -> Option<usize> {
    Some(200)
}

impl Default for ListQueryConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            text_match: TextMatch::default(),
            repository_timeout_ms: None,
        }
    }
}

impl ListQueryConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn repository_timeout(&self) -> Option<Duration> {
        self.repository_timeout_ms.map(Duration::from_millis)
    }
}

/// Entity metadata tables, as written in YAML
///
/// ```yaml
/// entities:
///   - entity_type: product
///     primary_key: id
///     fields:
///       - { name: id, type: uuid, sortable: true }
///       - { name: name, type: text, sortable: true }
///       - { name: discontinued, type: boolean }
///     includes:
///       - { token: Category, path: category }
///     default_includes: [Category]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub entities: Vec<EntityMetadata>,
}

impl MetadataConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build a registry, checking every table
    pub fn into_registry(self) -> Result<MetadataRegistry> {
        let mut registry = MetadataRegistry::new();
        for metadata in self.entities {
            registry.register(metadata)?;
        }
        Ok(registry)
    }
}
