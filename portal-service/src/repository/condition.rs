//! Composable query predicates
//!
//! A [`Condition`] adds one filter to a repository query. Conditions passed together
//! are combined with `AND`; [`Condition::or`] groups alternatives. Values are always
//! sent as bind parameters and column names are checked against a strict identifier
//! pattern before any SQL is produced.
//!
//! # Example
//!
//! ```rust
//! use portal_service::repository::Condition;
//!
//! let conditions = vec![
//!     Condition::preload_associations(),
//!     Condition::eq("status", 1),
//!     Condition::or(vec![
//!         Condition::like("name_vi", "spring"),
//!         Condition::like("name_en", "spring"),
//!     ]),
//! ];
//! # let _ = conditions;
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult, ErrorCode};

/// `column` or `table.column`, lowercase snake case
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)?$").expect("identifier regex is valid")
});

/// A value that can be bound in a condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Uuid> for FilterValue {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

/// A single query predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq(String, FilterValue),
    /// `column <> value`
    Neq(String, FilterValue),
    /// Case-insensitive substring match; holds the raw, unescaped needle
    Like(String, String),
    /// `column IN (values)`; an empty list adds no filter
    In(String, Vec<FilterValue>),
    /// `column IS NULL`
    IsNull(String),
    /// Any of the nested conditions; an empty group adds no filter
    Or(Vec<Condition>),
    /// Eagerly load the entity's declared associations
    PreloadAssociations,
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn neq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Neq(column.into(), value.into())
    }

    pub fn like(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Like(column.into(), needle.into())
    }

    pub fn is_in<V>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<FilterValue>,
    {
        Self::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::Or(conditions)
    }

    pub fn preload_associations() -> Self {
        Self::PreloadAssociations
    }

    /// Whether this condition contributes a predicate to the WHERE clause
    pub fn is_predicate(&self) -> bool {
        match self {
            Self::Eq(..) | Self::Neq(..) | Self::Like(..) | Self::IsNull(_) => true,
            Self::In(_, values) => !values.is_empty(),
            Self::Or(conditions) => conditions.iter().any(Condition::is_predicate),
            Self::PreloadAssociations => false,
        }
    }

    /// Reject column names that are not plain identifiers
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            Self::Eq(column, _)
            | Self::Neq(column, _)
            | Self::Like(column, _)
            | Self::In(column, _)
            | Self::IsNull(column) => validate_identifier(column),
            Self::Or(conditions) => conditions.iter().try_for_each(Condition::validate),
            Self::PreloadAssociations => Ok(()),
        }
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::Eq(column, value) => {
                qb.push(column.as_str()).push(" = ");
                push_value(qb, value);
            }
            Self::Neq(column, value) => {
                qb.push(column.as_str()).push(" <> ");
                push_value(qb, value);
            }
            Self::Like(column, needle) => {
                qb.push("LOWER(")
                    .push(column.as_str())
                    .push(") LIKE LOWER(")
                    .push_bind(like_pattern(needle))
                    .push(") ESCAPE '\\'");
            }
            Self::In(column, values) => {
                qb.push(column.as_str()).push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    push_value(qb, value);
                }
                qb.push(")");
            }
            Self::IsNull(column) => {
                qb.push(column.as_str()).push(" IS NULL");
            }
            Self::Or(conditions) => {
                qb.push("(");
                let parts = conditions.iter().filter(|c| c.is_predicate());
                for (i, condition) in parts.enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    condition.push_sql(qb);
                }
                qb.push(")");
            }
            Self::PreloadAssociations => {}
        }
    }
}

/// Whether any top-level condition asks for association preloading
pub fn wants_preload(conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .any(|c| matches!(c, Condition::PreloadAssociations))
}

/// Append ` WHERE …` for `conditions` (ANDed) plus any fixed `extra` predicate
///
/// Nothing is appended when no condition contributes a predicate and there is no
/// extra predicate.
pub fn push_where(
    qb: &mut QueryBuilder<'_, Postgres>,
    conditions: &[Condition],
    extra: Option<&str>,
) -> DomainResult<()> {
    conditions.iter().try_for_each(Condition::validate)?;

    let mut clauses = 0;
    if let Some(extra) = extra {
        qb.push(" WHERE ").push(extra);
        clauses += 1;
    }
    for condition in conditions.iter().filter(|c| c.is_predicate()) {
        qb.push(if clauses == 0 { " WHERE " } else { " AND " });
        condition.push_sql(qb);
        clauses += 1;
    }
    Ok(())
}

/// Build the LIKE pattern for a raw needle
///
/// Trims surrounding whitespace, escapes `\`, `%` and `_` so they match literally and
/// wraps the result in `%` wildcards.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn validate_identifier(column: &str) -> DomainResult<()> {
    if IDENTIFIER.is_match(column) {
        Ok(())
    } else {
        Err(DomainError::wrap(
            ErrorCode::InvalidArgument,
            format!("invalid column name '{}'", column),
        ))
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::String(s) => qb.push_bind(s.clone()),
        FilterValue::Integer(n) => qb.push_bind(*n),
        FilterValue::Float(n) => qb.push_bind(*n),
        FilterValue::Boolean(b) => qb.push_bind(*b),
        FilterValue::Uuid(id) => qb.push_bind(*id),
        FilterValue::Timestamp(ts) => qb.push_bind(*ts),
    };
}
