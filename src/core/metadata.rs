//! Entity metadata: which fields can be filtered and sorted, and which
//! relations can be included, for each entity type

use crate::core::field::FieldType;
use crate::core::filter::FilterOperator;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Declaration of one entity attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical field name, as understood by `Listable::field_value`
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default = "default_true")]
    pub filterable: bool,

    #[serde(default)]
    pub sortable: bool,

    /// Restricts the operators allowed on this field. When absent, the
    /// operators compatible with `field_type` are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<FilterOperator>>,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    /// A filterable, non-sortable field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            filterable: true,
            sortable: false,
            operators: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn operators(mut self, operators: impl IntoIterator<Item = FilterOperator>) -> Self {
        self.operators = Some(operators.into_iter().collect());
        self
    }

    /// Whether `operator` may be applied to this field
    pub fn allows(&self, operator: FilterOperator) -> bool {
        if let Some(allowed) = &self.operators {
            if !allowed.contains(&operator) {
                return false;
            }
        }
        match operator {
            FilterOperator::Contains => self.field_type == FieldType::Text,
            op if op.is_ordering() => self.field_type.is_orderable(),
            _ => true,
        }
    }
}

/// An include token and the relation path it loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeSpec {
    pub token: String,
    pub path: String,
}

/// Metadata table of one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub entity_type: String,

    /// Field used as the final sort tie-breaker
    pub primary_key: String,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    #[serde(default)]
    pub includes: Vec<IncludeSpec>,

    /// Include tokens applied when a query does not name its own
    #[serde(default)]
    pub default_includes: Vec<String>,
}

impl EntityMetadata {
    pub fn new(entity_type: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            primary_key: primary_key.into(),
            fields: Vec::new(),
            includes: Vec::new(),
            default_includes: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn include(mut self, token: impl Into<String>, path: impl Into<String>) -> Self {
        self.includes.push(IncludeSpec {
            token: token.into(),
            path: path.into(),
        });
        self
    }

    pub fn default_includes<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_includes = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a field by name. Exact matches win; otherwise the comparison
    /// is ASCII case-insensitive, so `Discontinued` finds `discontinued`.
    pub fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    pub fn filterable_field(&self, name: &str) -> Option<&FieldSpec> {
        self.find_field(name).filter(|f| f.filterable)
    }

    pub fn sortable_field(&self, name: &str) -> Option<&FieldSpec> {
        self.find_field(name).filter(|f| f.sortable)
    }

    /// Resolve an include token, with the same matching rule as fields
    pub fn find_include(&self, token: &str) -> Option<&IncludeSpec> {
        self.includes
            .iter()
            .find(|i| i.token == token)
            .or_else(|| self.includes.iter().find(|i| i.token.eq_ignore_ascii_case(token)))
    }

    pub fn filterable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.filterable)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.sortable)
    }

    /// Check that the table is internally consistent
    pub fn check(&self) -> Result<()> {
        if self.entity_type.trim().is_empty() {
            bail!("entity metadata has an empty entity_type");
        }
        if self.find_field(&self.primary_key).is_none() {
            bail!(
                "primary key '{}' of {} is not a declared field",
                self.primary_key,
                self.entity_type
            );
        }
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.to_ascii_lowercase()) {
                bail!(
                    "field '{}' of {} is declared more than once",
                    field.name,
                    self.entity_type
                );
            }
        }
        for token in &self.default_includes {
            if self.find_include(token).is_none() {
                bail!(
                    "default include '{}' of {} is not a declared include",
                    token,
                    self.entity_type
                );
            }
        }
        Ok(())
    }
}

/// Source of entity metadata, injected into validation and spec building
pub trait MetadataProvider: Send + Sync {
    fn metadata(&self, entity_type: &str) -> Option<Arc<EntityMetadata>>;
}

/// Registry of metadata tables keyed by entity type
#[derive(Debug, Default, Clone)]
pub struct MetadataRegistry {
    tables: HashMap<String, Arc<EntityMetadata>>,
}

impl MetadataRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Register a metadata table, replacing any previous one for the same type
    pub fn register(&mut self, metadata: EntityMetadata) -> Result<()> {
        metadata.check()?;
        tracing::debug!(
            entity_type = %metadata.entity_type,
            fields = metadata.fields.len(),
            includes = metadata.includes.len(),
            "registered entity metadata"
        );
        self.tables
            .insert(metadata.entity_type.clone(), Arc::new(metadata));
        Ok(())
    }

    pub fn with(mut self, metadata: EntityMetadata) -> Result<Self> {
        self.register(metadata)?;
        Ok(self)
    }

    /// Get all registered entity types
    pub fn entity_types(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }
}

impl MetadataProvider for MetadataRegistry {
    fn metadata(&self, entity_type: &str) -> Option<Arc<EntityMetadata>> {
        self.tables.get(entity_type).cloned()
    }
}
