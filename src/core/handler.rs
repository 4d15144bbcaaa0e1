//! End-to-end list query execution
//!
//! ```text
//! ListQuery ──validate──▶ ValidatedQuery ──build──▶ EntityListSpec<T>
//!                                                    │
//!                         ┌──────────────────────────┴───────────┐
//!                  fetch_matching (paged)              count_matching (unpaged)
//!                         └──────────────┬───────────────────────┘
//!                                 project + paginate ──▶ PagedResult<P>
//! ```

use crate::config::ListQueryConfig;
use crate::core::entity::Listable;
use crate::core::error::{ListQueryError, ListQueryResult};
use crate::core::metadata::MetadataProvider;
use crate::core::page::{PagedResult, page_count};
use crate::core::query::{ListQuery, ListQueryParams};
use crate::core::repository::Repository;
use crate::core::spec::{EntityListSpec, SpecBuilder};
use crate::core::validate::QueryValidator;
use anyhow::anyhow;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs list queries for entity type `T` against repository `R`
pub struct ListQueryHandler<T, R> {
    repository: Arc<R>,
    metadata: Arc<dyn MetadataProvider>,
    validator: QueryValidator,
    builder: SpecBuilder,
    timeout: Option<Duration>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, R> Clone for ListQueryHandler<T, R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            metadata: self.metadata.clone(),
            validator: self.validator,
            builder: self.builder,
            timeout: self.timeout,
            _entity: PhantomData,
        }
    }
}

impl<T, R> ListQueryHandler<T, R>
where
    T: Listable,
    R: Repository<T>,
{
    /// Create a handler with the default configuration
    pub fn new(repository: Arc<R>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self::with_config(repository, metadata, &ListQueryConfig::default())
    }

    pub fn with_config(
        repository: Arc<R>,
        metadata: Arc<dyn MetadataProvider>,
        config: &ListQueryConfig,
    ) -> Self {
        Self {
            repository,
            metadata,
            validator: QueryValidator::from_config(config),
            builder: SpecBuilder::from_config(config),
            timeout: config.repository_timeout(),
            _entity: PhantomData,
        }
    }

    /// Validate `query` and build its specification, without touching storage
    pub fn prepare(&self, query: &ListQuery) -> ListQueryResult<EntityListSpec<T>> {
        let entity_type = T::entity_type();
        let metadata =
            self.metadata
                .metadata(entity_type)
                .ok_or_else(|| ListQueryError::UnknownEntity {
                    entity_type: entity_type.to_string(),
                })?;

        let validated = self.validator.validate(query, &metadata)?;
        self.builder.build::<T>(&validated)
    }

    /// Run `query` and project every fetched entity with `project`.
    ///
    /// Fetch and count are issued concurrently against the same spec. When a
    /// timeout is configured it bounds both together; dropping the returned
    /// future cancels both as well.
    pub async fn execute<P, F>(&self, query: &ListQuery, project: F) -> ListQueryResult<PagedResult<P>>
    where
        F: FnMut(T) -> P,
    {
        let spec = self.prepare(query)?;
        let entity_type = spec.entity_type();
        let started = Instant::now();

        let fetch = async {
            self.repository
                .fetch_matching(&spec)
                .await
                .map_err(|e| ListQueryError::repository(entity_type, "fetch", e))
        };
        let count = async {
            self.repository
                .count_matching(&spec)
                .await
                .map_err(|e| ListQueryError::repository(entity_type, "count", e))
        };
        let joined = async { tokio::try_join!(fetch, count) };

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, joined).await {
                Ok(result) => result,
                Err(_) => Err(ListQueryError::repository(
                    entity_type,
                    "fetch and count",
                    anyhow!("timed out after {:?}", limit),
                )),
            },
            None => joined.await,
        };

        let (mut items, total_count) = match outcome {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(
                    entity_type = %entity_type,
                    error = %err,
                    cause = ?std::error::Error::source(&err),
                    "list query repository call failed"
                );
                return Err(err);
            }
        };

        let page_size = spec.page_size();
        if items.len() > page_size {
            tracing::warn!(
                entity_type = %entity_type,
                fetched = items.len(),
                page_size,
                "repository returned more items than the page size; truncating"
            );
            items.truncate(page_size);
        }

        let page_count = page_count(total_count, page_size);
        if spec.page() > page_count && !items.is_empty() {
            tracing::warn!(
                entity_type = %entity_type,
                fetched = items.len(),
                total_count,
                page = spec.page(),
                page_count,
                "repository returned items past the last page; dropping them"
            );
            items.clear();
        }

        tracing::debug!(
            entity_type = %entity_type,
            fetched = items.len(),
            total_count,
            page = spec.page(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "list query executed"
        );

        Ok(PagedResult::new(items, total_count, spec.page(), page_size).map(project))
    }

    /// Convert transport parameters, then [`execute`](Self::execute)
    pub async fn execute_params<P, F>(
        &self,
        params: ListQueryParams,
        project: F,
    ) -> ListQueryResult<PagedResult<P>>
    where
        F: FnMut(T) -> P,
    {
        let query = params.into_query()?;
        self.execute(&query, project).await
    }
}
