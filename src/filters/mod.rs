//! # Filter Engine
//!
//! Applies a conjunction of field/operator/value predicates over a record
//! sequence. Field names support `/`-separated nested access (e.g.
//! `group/name`); a missing segment makes the filter evaluate false for
//! that record rather than erroring (see [`fields::resolve`]).

pub mod fields;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::Entity;
use crate::error::{CatalogError, Result};
use crate::repository::Repository;

/// Comparison operator a [`Filter`] applies.
///
/// The wire form is the uppercase enum-variant spelling (`EQUALS`, `LIKE`,
/// `NOT_EQUAL`, `GREATER`, `GREATER_EQUAL`, `LESS`, `LESS_EQUAL`).
/// An unrecognized spelling is rejected rather than silently defaulted to
/// `EQUALS`, since silently downgrading e.g. a `GREATER_EQUAL` filter to an
/// equality check would mask a client bug instead of surfacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    /// Exact string match.
    Equals,
    /// Case-insensitive substring containment.
    Like,
    /// Exact string mismatch.
    #[serde(rename = "NOT_EQUAL")]
    NotEquals,
    /// Numeric (falling back to lexicographic) greater-than.
    Greater,
    /// Numeric (falling back to lexicographic) greater-than-or-equal.
    GreaterEqual,
    /// Numeric (falling back to lexicographic) less-than.
    Less,
    /// Numeric (falling back to lexicographic) less-than-or-equal.
    LessEqual,
}

impl FromStr for FilterOp {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EQUALS" => Ok(Self::Equals),
            "LIKE" => Ok(Self::Like),
            "NOT_EQUAL" => Ok(Self::NotEquals),
            "GREATER" => Ok(Self::Greater),
            "GREATER_EQUAL" => Ok(Self::GreaterEqual),
            "LESS" => Ok(Self::Less),
            "LESS_EQUAL" => Ok(Self::LessEqual),
            other => Err(CatalogError::argument(format!(
                "unrecognized filter operator {other:?}"
            ))),
        }
    }
}

/// One predicate: `field_name <op> value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// `/`-separated field path, e.g. `group/name`.
    pub field_name: String,
    /// Literal value to compare against.
    pub value: String,
    /// Comparison operator.
    #[serde(rename = "type")]
    pub op: FilterOp,
}

impl Filter {
    /// Construct a filter directly (bypassing string-operator parsing).
    pub fn new(field_name: impl Into<String>, value: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
            op,
        }
    }

    fn matches(&self, field_value: Option<&str>) -> bool {
        let Some(actual) = field_value else {
            return false;
        };
        match self.op {
            FilterOp::Equals => actual == self.value,
            FilterOp::NotEquals => actual != self.value,
            FilterOp::Like => actual
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
            FilterOp::Greater
            | FilterOp::GreaterEqual
            | FilterOp::Less
            | FilterOp::LessEqual => ordered_compare(self.op, actual, &self.value),
        }
    }
}

fn ordered_compare(op: FilterOp, actual: &str, expected: &str) -> bool {
    let numeric = actual
        .parse::<f64>()
        .ok()
        .zip(expected.parse::<f64>().ok());
    match numeric {
        Some((a, b)) => match op {
            FilterOp::Greater => a > b,
            FilterOp::GreaterEqual => a >= b,
            FilterOp::Less => a < b,
            FilterOp::LessEqual => a <= b,
            _ => unreachable!(),
        },
        None => match op {
            FilterOp::Greater => actual > expected,
            FilterOp::GreaterEqual => actual >= expected,
            FilterOp::Less => actual < expected,
            FilterOp::LessEqual => actual <= expected,
            _ => unreachable!(),
        },
    }
}

/// Apply a conjunction of filters over `records`, preserving order.
///
/// An empty filter list returns the input unchanged; empty input returns
/// empty. No stable sort is applied — only filtering.
pub fn apply(repo: &Repository, records: &[Entity], filters: &[Filter]) -> Vec<Entity> {
    if filters.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            filters.iter().all(|filter| {
                let value = fields::resolve(repo, record, &filter.field_name);
                filter.matches(value.as_deref())
            })
        })
        .cloned()
        .collect()
}
