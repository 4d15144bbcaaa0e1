//! # This-List
//!
//! Declarative list queries for entity repositories.
//!
//! A request describes *what* list it wants (includes, filters, sort order,
//! page); this crate validates it against per-entity metadata, compiles it into
//! an [`EntityListSpec`](core::spec::EntityListSpec), runs the paged fetch and
//! the unpaged count concurrently against a [`Repository`](core::Repository),
//! and wraps the result in a [`PagedResult`](core::PagedResult).
//!
//! ## Features
//!
//! - **Typed filters**: `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte`, `Contains`, `In`, AND-composed
//! - **Explicit coercion**: transport values are coerced to the field's type or rejected
//! - **Stable paging**: the primary key always ends the sort order
//! - **Consistent totals**: fetch and count share one specification
//! - **Accumulated validation**: every problem in a query is reported at once
//! - **Configuration-Based**: entity metadata and tunables load from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_list::prelude::*;
//!
//! let registry = MetadataRegistry::new().with(
//!     EntityMetadata::new("product", "id")
//!         .field(FieldSpec::new("id", FieldType::Uuid).sortable())
//!         .field(FieldSpec::new("name", FieldType::Text).sortable())
//!         .field(FieldSpec::new("discontinued", FieldType::Boolean))
//!         .include("Category", "category")
//!         .default_includes(["Category"]),
//! )?;
//!
//! let handler = ListQueryHandler::<Product, _>::new(
//!     Arc::new(InMemoryRepository::with_entities(products)),
//!     Arc::new(registry),
//! );
//!
//! let params: ListQueryParams = serde_json::from_str(
//!     r#"{"filters":[{"field":"discontinued","operator":"Eq","value":true}],"page":1}"#,
//! )?;
//! let page = handler.execute_params(params, ProductDto::from).await?;
//! ```

pub mod config;
pub mod core;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::Listable, metadata::MetadataProvider, repository::Repository,
    };

    // === Query Model ===
    pub use crate::core::{
        field::{FieldType, FieldValue},
        filter::{FilterClause, FilterOperator, RawFilter},
        query::{ListQuery, ListQueryParams},
        sort::{SortClause, SortDirection},
    };

    // === Metadata ===
    pub use crate::core::metadata::{EntityMetadata, FieldSpec, MetadataRegistry};

    // === Pipeline ===
    pub use crate::core::{
        handler::ListQueryHandler,
        page::{PagedResult, paginate},
        spec::{EntityListSpec, Pagination, SpecBuilder},
        validate::QueryValidator,
    };

    // === Errors ===
    pub use crate::core::error::{ListQueryError, ListQueryResult, QueryError};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryRepository;

    // === Config ===
    pub use crate::config::{ListQueryConfig, MetadataConfig, TextMatch};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
