//! Field value types and semantic field types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare two values of compatible types.
    ///
    /// Integers and floats compare numerically with each other. Any other
    /// cross-type pair, and anything involving `Null`, is incomparable.
    pub fn partial_compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality used by filter predicates (numeric-aware, never true for `Null`)
    pub fn matches(&self, other: &FieldValue) -> bool {
        self.partial_compare(other) == Some(Ordering::Equal)
    }

    /// Total order used for sorting.
    ///
    /// Missing values (`None` or `Null`) sort before everything else; values of
    /// different variants fall back to a fixed variant rank; floats use
    /// `f64::total_cmp` so NaN has a defined place.
    pub fn sort_cmp(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
        let a = a.filter(|v| !v.is_null());
        let b = b.filter(|v| !v.is_null());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(FieldValue::Float(x)), Some(FieldValue::Float(y))) => x.total_cmp(y),
            (Some(x), Some(y)) => x
                .partial_compare(y)
                .unwrap_or_else(|| x.rank().cmp(&y.rank())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Float(_) => 2,
            FieldValue::String(_) => 3,
            FieldValue::Uuid(_) => 4,
            FieldValue::DateTime(_) => 5,
        }
    }
}

/// Semantic type of an entity attribute, as declared in entity metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    #[serde(rename = "datetime")]
    DateTime,
}

impl FieldType {
    /// Whether `Gt`/`Gte`/`Lt`/`Lte` make sense on this type
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Integer | FieldType::Float | FieldType::DateTime
        )
    }

    /// Coerce a transport value into a typed field value.
    ///
    /// Strings are accepted for non-text types only when they parse exactly;
    /// `null`, arrays, objects and anything ambiguous are rejected.
    pub fn coerce(&self, raw: &Value) -> Result<FieldValue, String> {
        match (self, raw) {
            (FieldType::Text, Value::String(s)) => Ok(FieldValue::String(s.clone())),

            (FieldType::Integer, Value::Number(n)) => n
                .as_i64()
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("{} is not an integer", n)),
            (FieldType::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| format!("'{}' is not an integer", s)),

            (FieldType::Float, Value::Number(n)) => n
                .as_f64()
                .map(FieldValue::Float)
                .ok_or_else(|| format!("{} is not a number", n)),
            (FieldType::Float, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(FieldValue::Float(f)),
                _ => Err(format!("'{}' is not a number", s)),
            },

            (FieldType::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
            (FieldType::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Ok(FieldValue::Boolean(true)),
                "false" => Ok(FieldValue::Boolean(false)),
                _ => Err(format!("'{}' is not a boolean (expected true or false)", s)),
            },

            (FieldType::Uuid, Value::String(s)) => Uuid::parse_str(s)
                .map(FieldValue::Uuid)
                .map_err(|_| format!("'{}' is not a UUID", s)),

            (FieldType::DateTime, Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| format!("'{}' is not an RFC 3339 timestamp", s)),

            (expected, other) => Err(format!("expected {} value, got {}", expected, other)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Uuid => "uuid",
            FieldType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}
