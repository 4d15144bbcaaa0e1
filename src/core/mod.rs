//! Core module containing the list query model, validation, specifications
//! and the repository port

pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod handler;
pub mod metadata;
pub mod page;
pub mod query;
pub mod repository;
pub mod sort;
pub mod spec;
pub mod validate;

pub use entity::Listable;
pub use error::{FieldUsage, ListQueryError, ListQueryResult, QueryError};
pub use field::{FieldType, FieldValue};
pub use filter::{FilterClause, FilterOperator, FilterValue, RawFilter};
pub use handler::ListQueryHandler;
pub use metadata::{EntityMetadata, FieldSpec, IncludeSpec, MetadataProvider, MetadataRegistry};
pub use page::{PagedResult, paginate};
pub use query::{ListQuery, ListQueryParams};
pub use repository::Repository;
pub use sort::{SortClause, SortDirection};
pub use spec::{EntityListSpec, Include, Pagination, SortKey, SpecBuilder, TypedFilter};
pub use validate::{QueryValidator, ValidatedQuery};
