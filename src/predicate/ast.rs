//! Abstract Syntax Tree (AST) for predicate expressions.

use std::collections::BTreeSet;

use crate::core::{CompareOp, Value, ValueKind};

/// A parsed predicate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Value),

    /// Reference to a column by its unescaped name.
    Column(String),

    /// `Convert(expr, type)`: cast the operand to another value kind.
    Convert { expr: Box<Expr>, target: ValueKind },

    /// `IsNull(expr, fallback)`: the operand, or `fallback` when it is null.
    IsNull { expr: Box<Expr>, fallback: Box<Expr> },

    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `expr LIKE pattern` with `*` or `%` wildcards.
    Like { expr: Box<Expr>, pattern: Box<Expr> },

    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn like(expr: Expr, pattern: Expr) -> Self {
        Expr::Like {
            expr: Box::new(expr),
            pattern: Box::new(pattern),
        }
    }

    /// Every column name referenced anywhere in the expression, sorted and deduplicated.
    pub fn columns(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_columns(&mut names);
        names
    }

    fn collect_columns<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Column(name) => {
                names.insert(name.as_str());
            }
            Expr::Convert { expr, .. } | Expr::Not(expr) => expr.collect_columns(names),
            Expr::IsNull { expr, fallback } => {
                expr.collect_columns(names);
                fallback.collect_columns(names);
            }
            Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_columns(names);
                right.collect_columns(names);
            }
            Expr::Like { expr, pattern } => {
                expr.collect_columns(names);
                pattern.collect_columns(names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_collected_once() {
        let expr = Expr::and(
            Expr::compare(
                CompareOp::Gt,
                Expr::Column("count".to_string()),
                Expr::Literal(Value::from(3)),
            ),
            Expr::like(
                Expr::Convert {
                    expr: Box::new(Expr::Column("count".to_string())),
                    target: ValueKind::Text,
                },
                Expr::Column("body".to_string()),
            ),
        );
        let columns: Vec<&str> = expr.columns().into_iter().collect();
        assert_eq!(columns, vec!["body", "count"]);
    }
}
