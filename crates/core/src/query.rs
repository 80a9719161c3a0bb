// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Field queries over stored documents (`field op value`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::record::RemoteRecord;

/// Comparison operator for a single-field query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl QueryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOp::Eq => "==",
            QueryOp::Ne => "!=",
            QueryOp::Lt => "<",
            QueryOp::Le => "<=",
            QueryOp::Gt => ">",
            QueryOp::Ge => ">=",
        }
    }

    /// Evaluates `actual op expected`.
    ///
    /// Numbers compare numerically and strings lexicographically. Other
    /// value types only support `==` and `!=`. A missing field never matches.
    pub fn matches(&self, actual: Option<&Value>, expected: &Value) -> bool {
        let Some(actual) = actual else {
            return false;
        };

        match self {
            QueryOp::Eq => values_equal(actual, expected),
            QueryOp::Ne => !values_equal(actual, expected),
            QueryOp::Lt => compare(actual, expected) == Some(Ordering::Less),
            QueryOp::Le => matches!(
                compare(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            QueryOp::Gt => compare(actual, expected) == Some(Ordering::Greater),
            QueryOp::Ge => matches!(
                compare(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" | "eq" => Ok(QueryOp::Eq),
            "!=" | "ne" => Ok(QueryOp::Ne),
            "<" | "lt" => Ok(QueryOp::Lt),
            "<=" | "le" => Ok(QueryOp::Le),
            ">" | "gt" => Ok(QueryOp::Gt),
            ">=" | "ge" => Ok(QueryOp::Ge),
            _ => Err(Error::InvalidQueryOp(s.to_string())),
        }
    }
}

/// A single-field filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldQuery {
    pub field: String,
    pub op: QueryOp,
    pub value: Value,
}

impl FieldQuery {
    pub fn new(field: impl Into<String>, op: QueryOp, value: Value) -> Self {
        FieldQuery {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn matches(&self, record: &RemoteRecord) -> bool {
        self.op.matches(record.field(&self.field), &self.value)
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
