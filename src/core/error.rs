//! Typed error handling for list queries
//!
//! # Error Categories
//!
//! - [`QueryError`]: one problem with a list query (bad filter, bad page, unknown
//!   field...). Validation accumulates these so every problem is reported at once.
//! - [`ListQueryError`]: outcome of running a list query end to end. Either the
//!   query was rejected (carrying every [`QueryError`]), or a later stage failed.
//!
//! # Example
//!
//! ```rust,ignore
//! match handler.execute(&query, ProductDto::from).await {
//!     Ok(page) => Json(page).into_response(),
//!     Err(ListQueryError::Validation(errors)) => {
//!         for e in &errors {
//!             println!("{}: {}", e.error_code(), e);
//!         }
//!         StatusCode::BAD_REQUEST.into_response()
//!     }
//!     Err(e) => e.into_response(),
//! }
//! ```

use crate::core::field::FieldType;
use crate::core::filter::FilterOperator;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Where an unknown field was referenced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldUsage {
    Filter,
    Sort,
}

impl fmt::Display for FieldUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldUsage::Filter => f.write_str("filterable"),
            FieldUsage::Sort => f.write_str("sortable"),
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// A single problem found in a list query
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Filter clause could not be parsed or its value does not fit the field
    #[error("Malformed filter on '{field}': {message}")]
    MalformedFilter { field: String, message: String },

    /// Sort token could not be parsed
    #[error("Malformed sort '{token}': {message}")]
    MalformedSort { token: String, message: String },

    #[error("Page must be greater than or equal to 1 (got {page})")]
    InvalidPage { page: i64 },

    #[error("Page size must be greater than or equal to 1 (got {page_size})")]
    InvalidPageSize { page_size: i64 },

    #[error("Page size {page_size} exceeds the maximum of {max}")]
    PageSizeTooLarge { page_size: i64, max: usize },

    /// Field is not declared, or not declared for this usage, on the entity
    #[error("'{field}' is not a {usage} field of {entity_type}")]
    UnknownField {
        entity_type: String,
        field: String,
        usage: FieldUsage,
    },

    /// Include token is not resolvable for the entity
    #[error("'{include}' is not an include of {entity_type}")]
    UnknownInclude { entity_type: String, include: String },

    #[error("Operator {operator} is not allowed on {field_type} field '{field}'")]
    IncompatibleOperator {
        field: String,
        operator: FilterOperator,
        field_type: FieldType,
    },
}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::MalformedFilter { .. } => "MALFORMED_FILTER",
            QueryError::MalformedSort { .. } => "MALFORMED_SORT",
            QueryError::InvalidPage { .. } => "INVALID_PAGE",
            QueryError::InvalidPageSize { .. } => "INVALID_PAGE_SIZE",
            QueryError::PageSizeTooLarge { .. } => "PAGE_SIZE_TOO_LARGE",
            QueryError::UnknownField { .. } => "UNKNOWN_FIELD",
            QueryError::UnknownInclude { .. } => "UNKNOWN_INCLUDE",
            QueryError::IncompatibleOperator { .. } => "INCOMPATIBLE_OPERATOR",
        }
    }

    /// The request field the problem is attached to, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            QueryError::MalformedFilter { field, .. }
            | QueryError::UnknownField { field, .. }
            | QueryError::IncompatibleOperator { field, .. } => Some(field),
            QueryError::MalformedSort { .. } => Some("sorts"),
            QueryError::InvalidPage { .. } => Some("page"),
            QueryError::InvalidPageSize { .. } | QueryError::PageSizeTooLarge { .. } => {
                Some("pageSize")
            }
            QueryError::UnknownInclude { .. } => Some("includes"),
        }
    }
}

/// Serializable view of a [`QueryError`]
#[derive(Debug, Serialize)]
pub struct QueryErrorDetail {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl From<&QueryError> for QueryErrorDetail {
    fn from(err: &QueryError) -> Self {
        Self {
            code: err.error_code(),
            field: err.field().map(str::to_string),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// List Query Errors
// =============================================================================

/// Failure of a list query pipeline
#[derive(Debug, Error)]
pub enum ListQueryError {
    /// The query was rejected; every problem found is listed
    #[error("Invalid list query: {}", join_messages(.0))]
    Validation(Vec<QueryError>),

    /// No metadata is registered for the entity type
    #[error("Unknown entity type: {entity_type}")]
    UnknownEntity { entity_type: String },

    /// An include passed validation but could not be resolved by the builder.
    /// This is a broken invariant, not a client error.
    #[error("Include '{include}' could not be resolved for {entity_type}")]
    UnresolvedInclude { entity_type: String, include: String },

    /// The repository failed (timeout, connection loss...). Never retried here.
    #[error("Repository {operation} failed for {entity_type}")]
    RepositoryFailure {
        entity_type: String,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

fn join_messages(errors: &[QueryError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Individual validation problems
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryErrorDetail>,
}

impl ListQueryError {
    /// Wrap a single query problem
    pub fn invalid(err: QueryError) -> Self {
        ListQueryError::Validation(vec![err])
    }

    pub fn repository(entity_type: &str, operation: &'static str, source: anyhow::Error) -> Self {
        ListQueryError::RepositoryFailure {
            entity_type: entity_type.to_string(),
            operation,
            source,
        }
    }

    /// Validation problems carried by this error (empty for other kinds)
    pub fn validation_errors(&self) -> &[QueryError] {
        match self {
            ListQueryError::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ListQueryError::Validation(_) => StatusCode::BAD_REQUEST,
            ListQueryError::UnknownEntity { .. } => StatusCode::NOT_FOUND,
            ListQueryError::UnresolvedInclude { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ListQueryError::RepositoryFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ListQueryError::Validation(_) => "VALIDATION_ERROR",
            ListQueryError::UnknownEntity { .. } => "UNKNOWN_ENTITY_TYPE",
            ListQueryError::UnresolvedInclude { .. } => "UNRESOLVED_INCLUDE",
            ListQueryError::RepositoryFailure { .. } => "REPOSITORY_FAILURE",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            errors: self
                .validation_errors()
                .iter()
                .map(QueryErrorDetail::from)
                .collect(),
        }
    }
}

impl From<QueryError> for ListQueryError {
    fn from(err: QueryError) -> Self {
        ListQueryError::invalid(err)
    }
}

impl From<Vec<QueryError>> for ListQueryError {
    fn from(errors: Vec<QueryError>) -> Self {
        ListQueryError::Validation(errors)
    }
}

impl IntoResponse for ListQueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// A specialized Result type for list query operations
pub type ListQueryResult<T> = Result<T, ListQueryError>;

// =============================================================================
// Tests
// =============================================================================
