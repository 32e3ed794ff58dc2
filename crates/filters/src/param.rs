//! Numeric-or-expression filter parameters and range checks.

use std::fmt;

use reelcut_common::error::{ReelcutError, ReelcutResult};
use serde::{Deserialize, Serialize};

/// A filter argument that is either a literal number or an engine expression
/// such as `iw/2` or `(W-w)/2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Num(f64),
    Expr(String),
}

impl Param {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Param::Num(value) => Some(*value),
            Param::Expr(_) => None,
        }
    }

    /// Numbers bare; expressions wrapped in single quotes when they contain
    /// anything the filtergraph parser would split on.
    pub fn quoted(&self) -> String {
        match self {
            Param::Num(value) => fmt_num(*value),
            Param::Expr(expr) if is_plain_token(expr) => expr.clone(),
            Param::Expr(expr) => format!("'{expr}'"),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Num(value) => f.write_str(&fmt_num(*value)),
            Param::Expr(expr) => f.write_str(expr),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Num(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Num(f64::from(value))
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Num(f64::from(value))
    }
}

impl From<&str> for Param {
    fn from(expr: &str) -> Self {
        Param::Expr(expr.to_string())
    }
}

impl From<String> for Param {
    fn from(expr: String) -> Self {
        Param::Expr(expr)
    }
}

/// Shortest decimal form of a number: `1`, `0.5`, `-23`.
pub fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        // Avoid printing `-0`.
        return "0".to_string();
    }
    format!("{value}")
}

/// Whether a string is safe to emit unquoted inside a filter argument.
pub(crate) fn is_plain_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@' | '+'))
}

/// Emit a free-form string value, quoted unless it is a plain token.
pub(crate) fn quote_str(value: &str) -> String {
    if is_plain_token(value) {
        value.to_string()
    } else {
        format!("'{value}'")
    }
}

/// Require `min <= value <= max`.
pub(crate) fn check_range(
    filter: &str,
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> ReelcutResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ReelcutError::validation(
            filter,
            format!(
                "{field} must be within [{}, {}] (got {})",
                fmt_num(min),
                fmt_num(max),
                fmt_num(value)
            ),
        ))
    }
}

/// Range-check a parameter when it is numeric; expressions pass through.
pub(crate) fn check_param_range(
    filter: &str,
    field: &str,
    param: &Param,
    min: f64,
    max: f64,
) -> ReelcutResult<()> {
    match param {
        Param::Num(value) => check_range(filter, field, *value, min, max),
        Param::Expr(expr) if expr.trim().is_empty() => Err(ReelcutError::validation(
            filter,
            format!("{field} expression must not be empty"),
        )),
        Param::Expr(_) => Ok(()),
    }
}

/// Require `value >= min`.
pub(crate) fn check_min(filter: &str, field: &str, value: f64, min: f64) -> ReelcutResult<()> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ReelcutError::validation(
            filter,
            format!("{field} must be at least {} (got {})", fmt_num(min), fmt_num(value)),
        ))
    }
}

/// Require a numeric value strictly greater than `min`.
pub(crate) fn check_above(filter: &str, field: &str, value: f64, min: f64) -> ReelcutResult<()> {
    if value.is_finite() && value > min {
        Ok(())
    } else {
        Err(ReelcutError::validation(
            filter,
            format!("{field} must be greater than {} (got {})", fmt_num(min), fmt_num(value)),
        ))
    }
}

/// Require at least one of the listed options to be present.
pub(crate) fn require_any(filter: &str, present: &[bool], fields: &str) -> ReelcutResult<()> {
    if present.iter().any(|set| *set) {
        Ok(())
    } else {
        Err(ReelcutError::validation(
            filter,
            format!("at least one of {fields} must be set"),
        ))
    }
}

/// Reject two options that cannot be combined.
pub(crate) fn exclusive(filter: &str, a: (&str, bool), b: (&str, bool)) -> ReelcutResult<()> {
    if a.1 && b.1 {
        Err(ReelcutError::validation(
            filter,
            format!("{} and {} cannot both be set", a.0, b.0),
        ))
    } else {
        Ok(())
    }
}

/// Append `key=value` pairs for the options that are set, joined with `:`.
pub(crate) fn join_options(pairs: &[(&str, Option<String>)]) -> String {
    pairs
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| format!("{key}={value}")))
        .collect::<Vec<_>>()
        .join(":")
}
