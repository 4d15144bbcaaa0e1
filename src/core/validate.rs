//! Validation of list queries against entity metadata

use crate::config::ListQueryConfig;
use crate::core::error::{FieldUsage, QueryError};
use crate::core::filter::FilterValue;
use crate::core::metadata::EntityMetadata;
use crate::core::query::ListQuery;
use crate::core::sort::SortClause;
use crate::core::spec::TypedFilter;
use indexmap::IndexSet;

/// Checks a [`ListQuery`] against an entity's metadata.
///
/// Validation never stops at the first problem: every bound violation, unknown
/// field, incompatible operator and uncoercible value is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryValidator {
    max_page_size: Option<usize>,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::from_config(&ListQueryConfig::default())
    }
}

impl QueryValidator {
    pub fn new(max_page_size: Option<usize>) -> Self {
        Self { max_page_size }
    }

    pub fn from_config(config: &ListQueryConfig) -> Self {
        Self::new(config.max_page_size)
    }

    pub fn max_page_size(&self) -> Option<usize> {
        self.max_page_size
    }

    /// Validate `query` for the entity described by `metadata`.
    ///
    /// On success the returned [`ValidatedQuery`] carries the filters with
    /// field names resolved to their canonical form and values coerced to the
    /// field's type; it is the only input the spec builder accepts.
    pub fn validate<'q>(
        &self,
        query: &'q ListQuery,
        metadata: &'q EntityMetadata,
    ) -> Result<ValidatedQuery<'q>, Vec<QueryError>> {
        let mut errors = Vec::new();

        if query.page() < 1 {
            errors.push(QueryError::InvalidPage { page: query.page() });
        }

        let page_size = query.page_size();
        if page_size < 1 {
            errors.push(QueryError::InvalidPageSize { page_size });
        } else if let Some(max) = self.max_page_size {
            if page_size as u64 > max as u64 {
                errors.push(QueryError::PageSizeTooLarge { page_size, max });
            }
        }

        let requested: Vec<&String> = match query.includes() {
            Some(tokens) => tokens.iter().collect(),
            None => metadata.default_includes.iter().collect(),
        };
        // de-duplicated on the canonical token
        let mut includes: IndexSet<String> = IndexSet::with_capacity(requested.len());
        for token in requested {
            match metadata.find_include(token) {
                Some(spec) => {
                    includes.insert(spec.token.clone());
                }
                None => errors.push(QueryError::UnknownInclude {
                    entity_type: metadata.entity_type.clone(),
                    include: token.clone(),
                }),
            }
        }

        let mut filters = Vec::with_capacity(query.filters().len());
        for clause in query.filters() {
            let Some(spec) = metadata.filterable_field(clause.field()) else {
                errors.push(QueryError::UnknownField {
                    entity_type: metadata.entity_type.clone(),
                    field: clause.field().to_string(),
                    usage: FieldUsage::Filter,
                });
                continue;
            };

            let operator = clause.operator();
            if !spec.allows(operator) {
                errors.push(QueryError::IncompatibleOperator {
                    field: spec.name.clone(),
                    operator,
                    field_type: spec.field_type,
                });
                continue;
            }

            if let FilterValue::Many(_) = clause.value() {
                if !operator.takes_many() {
                    errors.push(QueryError::MalformedFilter {
                        field: spec.name.clone(),
                        message: format!("operator {} takes a single value", operator),
                    });
                    continue;
                }
            }

            let mut values = Vec::with_capacity(clause.value().values().len());
            let mut coerced = true;
            for raw in clause.value().values() {
                match spec.field_type.coerce(raw) {
                    Ok(v) => values.push(v),
                    Err(message) => {
                        errors.push(QueryError::MalformedFilter {
                            field: spec.name.clone(),
                            message,
                        });
                        coerced = false;
                    }
                }
            }

            if coerced {
                filters.push(TypedFilter {
                    field: spec.name.clone(),
                    field_type: spec.field_type,
                    operator,
                    values,
                });
            }
        }

        let mut sorts = Vec::with_capacity(query.sorts().len());
        for clause in query.sorts() {
            match metadata.sortable_field(&clause.field) {
                Some(spec) => sorts.push(SortClause {
                    field: spec.name.clone(),
                    direction: clause.direction,
                }),
                None => errors.push(QueryError::UnknownField {
                    entity_type: metadata.entity_type.clone(),
                    field: clause.field.clone(),
                    usage: FieldUsage::Sort,
                }),
            }
        }

        if !errors.is_empty() {
            tracing::warn!(
                entity_type = %metadata.entity_type,
                error_count = errors.len(),
                "list query rejected"
            );
            return Err(errors);
        }

        Ok(ValidatedQuery {
            query,
            metadata,
            includes: includes.into_iter().collect(),
            filters,
            sorts,
        })
    }
}

/// A list query that passed validation for one entity type
#[derive(Debug, Clone)]
pub struct ValidatedQuery<'q> {
    query: &'q ListQuery,
    metadata: &'q EntityMetadata,
    includes: Vec<String>,
    filters: Vec<TypedFilter>,
    sorts: Vec<SortClause>,
}

impl<'q> ValidatedQuery<'q> {
    pub fn query(&self) -> &'q ListQuery {
        self.query
    }

    pub fn metadata(&self) -> &'q EntityMetadata {
        self.metadata
    }

    /// Effective include tokens in canonical spelling, without duplicates
    /// (explicit ones, or the entity defaults)
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn filters(&self) -> &[TypedFilter] {
        &self.filters
    }

    /// Sort clauses with canonical field names
    pub fn sorts(&self) -> &[SortClause] {
        &self.sorts
    }

    /// Page number, known to be at least 1
    pub fn page(&self) -> usize {
        self.query.page() as usize
    }

    /// Page size, known to be at least 1
    pub fn page_size(&self) -> usize {
        self.query.page_size() as usize
    }
}
