//! Error types shared by data views and the filter combinator.

use thiserror::Error;

use crate::predicate::PredicateError;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Error)]
pub enum FilterError {
    /// A predicate the view could not parse or resolve against its columns.
    #[error("malformed filter expression '{predicate}': {source}")]
    MalformedExpression {
        predicate: String,
        #[source]
        source: PredicateError,
    },

    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("data frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    pub fn malformed(predicate: impl Into<String>, source: PredicateError) -> Self {
        FilterError::MalformedExpression {
            predicate: predicate.into(),
            source,
        }
    }

    pub fn unknown_column(name: impl Into<String>) -> Self {
        FilterError::UnknownColumn { name: name.into() }
    }

    pub fn is_malformed_expression(&self) -> bool {
        matches!(self, FilterError::MalformedExpression { .. })
    }
}
