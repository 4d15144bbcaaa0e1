//! Repository port: the only way list queries reach storage

use crate::core::entity::Listable;
use crate::core::spec::EntityListSpec;
use anyhow::Result;
use async_trait::async_trait;

/// Storage adapter contract for list specifications.
///
/// The framework is agnostic to the underlying storage mechanism: SQL
/// adapters translate `spec.filters()` / `spec.sort()` into a query, in-memory
/// adapters can evaluate the spec directly with `spec.apply()`.
///
/// Implementations only borrow the specification for the duration of a call.
/// Both methods may run concurrently against the same spec.
#[async_trait]
pub trait Repository<T: Listable>: Send + Sync {
    /// Fetch one page of matching entities.
    ///
    /// Must load `spec.includes()`, keep only entities matching the predicate,
    /// order them by `spec.sort()`, and only then apply `spec.pagination()`.
    async fn fetch_matching(&self, spec: &EntityListSpec<T>) -> Result<Vec<T>>;

    /// Count every entity matching the predicate.
    ///
    /// Includes, sort order and pagination are ignored.
    async fn count_matching(&self, spec: &EntityListSpec<T>) -> Result<usize>;
}
