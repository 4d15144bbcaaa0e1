//! Sort clauses and sort token parsing

use crate::core::error::QueryError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A single sort key of a list query
///
/// # Token format
/// - `name` or `+name` (ascending)
/// - `-name` (descending)
/// - `name:asc` / `name:desc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse a sort token such as `-created_at` or `price:desc`
    pub fn parse(token: &str) -> Result<Self, QueryError> {
        static SORT_TOKEN: OnceLock<Regex> = OnceLock::new();
        let regex = SORT_TOKEN.get_or_init(|| {
            Regex::new(r"^(?P<sign>[+-])?(?P<field>[A-Za-z_][A-Za-z0-9_.]*)(?::(?P<dir>[A-Za-z]+))?$")
                .unwrap()
        });

        let trimmed = token.trim();
        let caps = regex
            .captures(trimmed)
            .ok_or_else(|| QueryError::MalformedSort {
                token: token.to_string(),
                message: "expected [+|-]field[:asc|:desc]".to_string(),
            })?;

        let signed = caps.name("sign").map(|m| m.as_str());
        let suffix = caps
            .name("dir")
            .map(|m| m.as_str().to_ascii_lowercase());

        let direction = match (signed, suffix.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(QueryError::MalformedSort {
                    token: token.to_string(),
                    message: "direction given both as prefix and suffix".to_string(),
                });
            }
            (Some("-"), None) => SortDirection::Desc,
            (_, Some("desc")) => SortDirection::Desc,
            (_, Some("asc")) | (_, None) => SortDirection::Asc,
            (_, Some(other)) => {
                return Err(QueryError::MalformedSort {
                    token: token.to_string(),
                    message: format!("unknown direction '{}'", other),
                });
            }
        };

        Ok(Self {
            field: caps["field"].to_string(),
            direction,
        })
    }
}

impl FromStr for SortClause {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
