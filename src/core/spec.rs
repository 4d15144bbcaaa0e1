//! Entity list specifications: the executable form of a validated list query
//!
//! A specification bundles four independent parts so a repository can apply
//! each one where it belongs:
//!
//! - include directives (eager-loaded relations)
//! - a predicate, the AND of every filter
//! - a sort order, always total thanks to a primary-key tie-breaker
//! - pagination bounds, for the fetch path only
//!
//! Counting uses the predicate alone.

use crate::config::{ListQueryConfig, TextMatch};
use crate::core::entity::Listable;
use crate::core::error::ListQueryError;
use crate::core::field::{FieldType, FieldValue};
use crate::core::filter::FilterOperator;
use crate::core::sort::{SortClause, SortDirection};
use crate::core::validate::ValidatedQuery;
use serde::Serialize;
use std::cmp::Ordering;
use std::marker::PhantomData;

/// A resolved include: the token asked for and the relation path to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Include {
    pub token: String,
    pub path: String,
}

/// A filter clause bound to a known field, with values of the field's type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedFilter {
    pub field: String,
    pub field_type: FieldType,
    pub operator: FilterOperator,
    /// One value, or the membership set for `In`
    pub values: Vec<FieldValue>,
}

impl TypedFilter {
    /// Evaluate this clause against one field value.
    ///
    /// A missing value never matches, whatever the operator.
    pub fn test(&self, actual: Option<&FieldValue>, text_match: TextMatch) -> bool {
        let Some(actual) = actual.filter(|v| !v.is_null()) else {
            return false;
        };
        let Some(expected) = self.values.first() else {
            return false;
        };

        match self.operator {
            FilterOperator::Eq => actual.matches(expected),
            FilterOperator::Ne => !actual.matches(expected),
            FilterOperator::Gt => actual.partial_compare(expected) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                actual.partial_compare(expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => actual.partial_compare(expected) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                actual.partial_compare(expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Contains => match (actual.as_string(), expected.as_string()) {
                (Some(haystack), Some(needle)) => text_match.contains(haystack, needle),
                _ => false,
            },
            FilterOperator::In => self.values.iter().any(|v| actual.matches(v)),
        }
    }
}

/// One key of the resolved sort order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// `skip`/`take` bounds of the requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub skip: usize,
    pub take: usize,
}

impl Pagination {
    /// Bounds of `page` (1-based) with `page_size` items per page
    pub fn for_page(page: usize, page_size: usize) -> Self {
        Self {
            skip: page.saturating_sub(1).saturating_mul(page_size),
            take: page_size,
        }
    }
}

/// Executable list specification over entity type `T`.
///
/// Built per request and never mutated; the fetch and count calls share it
/// by reference.
#[derive(Debug, Clone)]
pub struct EntityListSpec<T> {
    entity_type: String,
    includes: Vec<Include>,
    filters: Vec<TypedFilter>,
    sort: Vec<SortKey>,
    pagination: Pagination,
    page: usize,
    text_match: TextMatch,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Listable> EntityListSpec<T> {
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Relations to load eagerly, in request order
    pub fn includes(&self) -> &[Include] {
        &self.includes
    }

    /// Clauses of the predicate; an entity must satisfy all of them
    pub fn filters(&self) -> &[TypedFilter] {
        &self.filters
    }

    /// Sort keys in precedence order, ending with the primary key
    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    /// Bounds for the fetch path. Never apply these when counting.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.pagination.take
    }

    pub fn text_match(&self) -> TextMatch {
        self.text_match
    }

    /// Whether `entity` satisfies every filter clause
    pub fn matches(&self, entity: &T) -> bool {
        self.filters
            .iter()
            .all(|f| f.test(entity.field_value(&f.field).as_ref(), self.text_match))
    }

    /// Compare two entities by the sort keys, in order
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for key in &self.sort {
            let left = a.field_value(&key.field);
            let right = b.field_value(&key.field);
            let ordering = FieldValue::sort_cmp(left.as_ref(), right.as_ref());
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Number of entities satisfying the predicate
    pub fn count<'a, I>(&self, entities: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        entities.into_iter().filter(|e| self.matches(e)).count()
    }

    /// Filter, then sort, then page an in-memory collection
    pub fn apply<I>(&self, entities: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut matching: Vec<T> = entities.into_iter().filter(|e| self.matches(e)).collect();
        matching.sort_by(|a, b| self.compare(a, b));
        matching
            .into_iter()
            .skip(self.pagination.skip)
            .take(self.pagination.take)
            .collect()
    }
}

/// Turns validated queries into [`EntityListSpec`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecBuilder {
    text_match: TextMatch,
}

impl SpecBuilder {
    pub fn new(text_match: TextMatch) -> Self {
        Self { text_match }
    }

    pub fn from_config(config: &ListQueryConfig) -> Self {
        Self::new(config.text_match)
    }

    /// Build the specification for entity type `T`
    pub fn build<T: Listable>(
        &self,
        validated: &ValidatedQuery<'_>,
    ) -> Result<EntityListSpec<T>, ListQueryError> {
        let metadata = validated.metadata();

        let mut includes = Vec::with_capacity(validated.includes().len());
        for token in validated.includes() {
            let Some(spec) = metadata.find_include(token) else {
                tracing::error!(
                    entity_type = %metadata.entity_type,
                    include = %token,
                    "include passed validation but does not resolve"
                );
                return Err(ListQueryError::UnresolvedInclude {
                    entity_type: metadata.entity_type.clone(),
                    include: token.clone(),
                });
            };
            includes.push(Include {
                token: spec.token.clone(),
                path: spec.path.clone(),
            });
        }

        let mut sort: Vec<SortKey> = validated
            .sorts()
            .iter()
            .map(|SortClause { field, direction }| SortKey {
                field: field.clone(),
                direction: *direction,
            })
            .collect();
        let primary_key = metadata
            .find_field(&metadata.primary_key)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| metadata.primary_key.clone());
        if !sort.iter().any(|k| k.field == primary_key) {
            sort.push(SortKey {
                field: primary_key,
                direction: SortDirection::Asc,
            });
        }

        let spec = EntityListSpec {
            entity_type: metadata.entity_type.clone(),
            includes,
            filters: validated.filters().to_vec(),
            sort,
            pagination: Pagination::for_page(validated.page(), validated.page_size()),
            page: validated.page(),
            text_match: self.text_match,
            _entity: PhantomData,
        };

        tracing::debug!(
            entity_type = %spec.entity_type,
            includes = spec.includes.len(),
            filters = spec.filters.len(),
            sort_keys = spec.sort.len(),
            skip = spec.pagination.skip,
            take = spec.pagination.take,
            "built list specification"
        );

        Ok(spec)
    }
}
