//! In-memory implementation of Repository for testing and development

use crate::core::entity::Listable;
use crate::core::repository::Repository;
use crate::core::spec::EntityListSpec;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory repository implementation
///
/// Useful for testing and development. Entities are held whole, so include
/// directives have nothing to load and are only traced.
#[derive(Clone)]
pub struct InMemoryRepository<T> {
    entities: Arc<RwLock<Vec<T>>>,
}

impl<T: Listable> InMemoryRepository<T> {
    /// Create a new, empty in-memory repository
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a repository pre-filled with `entities`
    pub fn with_entities(entities: impl IntoIterator<Item = T>) -> Self {
        Self {
            entities: Arc::new(RwLock::new(entities.into_iter().collect())),
        }
    }

    pub async fn insert(&self, entity: T) {
        self.entities.write().await.push(entity);
    }

    pub async fn insert_many(&self, entities: impl IntoIterator<Item = T>) {
        self.entities.write().await.extend(entities);
    }

    /// Remove every entity for which `keep` returns false
    pub async fn retain(&self, keep: impl FnMut(&T) -> bool) {
        self.entities.write().await.retain(keep);
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

impl<T: Listable> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Listable> Repository<T> for InMemoryRepository<T> {
    async fn fetch_matching(&self, spec: &EntityListSpec<T>) -> Result<Vec<T>> {
        let entities = self.entities.read().await;

        if !spec.includes().is_empty() {
            tracing::trace!(
                entity_type = %spec.entity_type(),
                includes = ?spec.includes().iter().map(|i| i.path.as_str()).collect::<Vec<_>>(),
                "in-memory entities are stored whole; includes need no loading"
            );
        }

        Ok(spec.apply(entities.iter().cloned()))
    }

    async fn count_matching(&self, spec: &EntityListSpec<T>) -> Result<usize> {
        let entities = self.entities.read().await;
        Ok(spec.count(entities.iter()))
    }
}
