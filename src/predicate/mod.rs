//! Predicate strings: building blocks, parsing and row evaluation.
//!
//! A predicate is a textual boolean expression over bracketed column
//! references, e.g. `([sender] LIKE 'smi*') AND ([size] > 10)`.
//!
//! # Supported Syntax
//!
//! - Comparisons: `=`, `<>`, `<`, `<=`, `>`, `>=`
//! - Pattern matching: `LIKE` with `*` or `%` wildcards
//! - Functions: `Convert(expr, 'System.String')`, `IsNull(expr, fallback)`
//! - Literals: numbers, `'text'`, `#MM/dd/yyyy#`, `true`, `false`, `null`
//! - Boolean operators: `AND`, `OR`, `NOT`, parentheses
//!
//! # Example
//!
//! ```
//! use gridfilter::predicate::{PredicateEvaluator, PredicateParser};
//! use gridfilter::core::Value;
//!
//! let expr = PredicateParser::parse("[size] > 10").unwrap();
//! let row = |_: &str| Value::from(12);
//! assert!(PredicateEvaluator::new(&expr).matches(&row));
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
pub mod literal;
mod parser;

pub use ast::Expr;
pub use error::{PredicateError, PredicateResult};
pub use evaluator::{PredicateEvaluator, RowSource, like};
pub use lexer::{Lexer, Token};
pub use parser::PredicateParser;

use crate::core::LogicalOperator;

/// Join column fragments with `op`, skipping empty ones.
///
/// A single fragment is returned bare; with more than one, each is parenthesised.
pub fn join<S: AsRef<str>>(fragments: &[S], op: LogicalOperator) -> String {
    let present: Vec<&str> = fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect();
    match present.as_slice() {
        [] => String::new(),
        [single] => (*single).to_string(),
        many => many
            .iter()
            .map(|f| format!("({f})"))
            .collect::<Vec<_>>()
            .join(op.joiner()),
    }
}

/// `(left) OP (right)`; when one side is empty the other is returned bare.
pub fn merge(left: &str, right: &str, op: LogicalOperator) -> String {
    match (left.trim(), right.trim()) {
        ("", "") => String::new(),
        (only, "") | ("", only) => only.to_string(),
        (l, r) => format!("({l}){}({r})", op.joiner()),
    }
}

/// `(result) AND (override)`; an override alone replaces an empty result.
pub fn with_override(result: &str, override_filter: &str) -> String {
    match (result.trim(), override_filter.trim()) {
        (r, "") => r.to_string(),
        ("", o) => o.to_string(),
        (r, o) => format!("({r}) AND ({o})"),
    }
}
