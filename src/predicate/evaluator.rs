//! Row-wise evaluation of parsed predicates.
//!
//! Evaluation follows three-valued logic: any comparison involving null or
//! values of incompatible kinds is unknown, and a row matches only when the
//! whole predicate is true.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;

use super::ast::Expr;
use crate::core::Value;

/// Access to the cells of one row by column name.
pub trait RowSource {
    fn value(&self, column: &str) -> Value;
}

impl<F> RowSource for F
where
    F: Fn(&str) -> Value,
{
    fn value(&self, column: &str) -> Value {
        self(column)
    }
}

/// Evaluates a parsed predicate against rows.
pub struct PredicateEvaluator<'a> {
    expr: &'a Expr,
    case_sensitive: bool,
    // compiled LIKE patterns; None when the pattern does not compile
    patterns: RefCell<HashMap<String, Option<Regex>>>,
}

impl<'a> PredicateEvaluator<'a> {
    pub fn new(expr: &'a Expr) -> Self {
        Self {
            expr,
            case_sensitive: false,
            patterns: RefCell::new(HashMap::new()),
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self.patterns.get_mut().clear();
        self
    }

    /// Whether the row satisfies the predicate; unknown counts as no match.
    pub fn matches<R: RowSource + ?Sized>(&self, row: &R) -> bool {
        self.truth(self.expr, row) == Some(true)
    }

    fn truth<R: RowSource + ?Sized>(&self, expr: &Expr, row: &R) -> Option<bool> {
        match expr {
            Expr::And(left, right) => match (self.truth(left, row), self.truth(right, row)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Expr::Or(left, right) => match (self.truth(left, row), self.truth(right, row)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Expr::Not(inner) => self.truth(inner, row).map(|b| !b),
            Expr::Compare { op, left, right } => {
                let left = self.value(left, row);
                let right = self.value(right, row);
                left.compare(&right, self.case_sensitive)
                    .map(|ordering| op.holds(ordering))
            }
            Expr::Like { expr, pattern } => {
                let text = self.value(expr, row).to_display_string()?;
                let pattern = self.value(pattern, row).to_display_string()?;
                self.like(&text, &pattern)
            }
            other => match self.value(other, row) {
                Value::Bool(b) => Some(b),
                _ => None,
            },
        }
    }

    fn like(&self, text: &str, pattern: &str) -> Option<bool> {
        let mut patterns = self.patterns.borrow_mut();
        let regex = patterns
            .entry(pattern.to_string())
            .or_insert_with(|| like_regex(pattern, self.case_sensitive));
        regex.as_ref().map(|re| re.is_match(text))
    }

    fn value<R: RowSource + ?Sized>(&self, expr: &Expr, row: &R) -> Value {
        match expr {
            Expr::Literal(value) => value.clone(),
            Expr::Column(name) => row.value(name),
            Expr::Convert { expr, target } => self
                .value(expr, row)
                .convert(*target)
                .unwrap_or(Value::Null),
            Expr::IsNull { expr, fallback } => match self.value(expr, row) {
                Value::Null => self.value(fallback, row),
                value => value,
            },
            logical => self.truth(logical, row).map(Value::Bool).unwrap_or(Value::Null),
        }
    }
}

/// `LIKE` matching where `*` and `%` match any run of characters.
pub fn like(text: &str, pattern: &str, case_sensitive: bool) -> bool {
    like_regex(pattern, case_sensitive).is_some_and(|re| re.is_match(text))
}

/// Anchored regex equivalent of a `LIKE` pattern
pub fn like_regex(pattern: &str, case_sensitive: bool) -> Option<Regex> {
    let body = pattern
        .split(['*', '%'])
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let flags = if case_sensitive { "(?s)" } else { "(?is)" };
    Regex::new(&format!("{flags}^{body}$")).ok()
}
