//! Filter clauses: the declarative "field operator value" unit of a list query

use crate::core::error::QueryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
}

impl FilterOperator {
    /// Operators that need an orderable field type
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte
        )
    }

    /// Whether the operator takes a set of values rather than a single one
    pub fn takes_many(&self) -> bool {
        matches!(self, FilterOperator::In)
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    /// Accepts operator names in any ASCII case (`eq`, `Gte`, `CONTAINS`) and
    /// the usual comparison symbols.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let op = match token.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" | "==" => FilterOperator::Eq,
            "ne" | "neq" | "!=" | "<>" => FilterOperator::Ne,
            "gt" | ">" => FilterOperator::Gt,
            "gte" | "ge" | ">=" => FilterOperator::Gte,
            "lt" | "<" => FilterOperator::Lt,
            "lte" | "le" | "<=" => FilterOperator::Lte,
            "contains" => FilterOperator::Contains,
            "in" => FilterOperator::In,
            _ => return Err(format!("unknown operator '{}'", token)),
        };
        Ok(op)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One scalar or a set of scalars, still in transport form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(Value),
    Many(Vec<Value>),
}

impl FilterValue {
    /// The scalars carried by this value, in order
    pub fn values(&self) -> &[Value] {
        match self {
            FilterValue::One(v) => std::slice::from_ref(v),
            FilterValue::Many(vs) => vs,
        }
    }
}

/// A structurally valid filter clause.
///
/// Whether `field` exists on the target entity, and whether the value fits its
/// type, is decided later against entity metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterClause {
    field: String,
    operator: FilterOperator,
    value: FilterValue,
}

impl FilterClause {
    /// Build a clause, checking only its shape
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: Value,
    ) -> Result<Self, QueryError> {
        let field = field.into();
        let malformed = |message: String| QueryError::MalformedFilter {
            field: field.clone(),
            message,
        };

        if field.trim().is_empty() {
            return Err(malformed("field name is empty".to_string()));
        }

        let value = match value {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(malformed("value set is empty".to_string()));
                }
                if items.iter().any(|v| v.is_array() || v.is_object()) {
                    return Err(malformed("value set must contain scalars only".to_string()));
                }
                FilterValue::Many(items)
            }
            Value::Object(_) => return Err(malformed("value must be a scalar".to_string())),
            scalar => FilterValue::One(scalar),
        };

        Ok(Self {
            field,
            operator,
            value,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }
}

/// Flat transport shape of a filter: `{"field": .., "operator": .., "value": ..}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawFilter {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

impl TryFrom<RawFilter> for FilterClause {
    type Error = QueryError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        let operator = raw
            .operator
            .parse::<FilterOperator>()
            .map_err(|message| QueryError::MalformedFilter {
                field: raw.field.clone(),
                message,
            })?;
        FilterClause::new(raw.field, operator, raw.value)
    }
}
