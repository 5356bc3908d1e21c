//! Error types for the predicate lexer and parser.

use thiserror::Error;

/// A specialized Result type for predicate parsing operations.
pub type PredicateResult<T> = Result<T, PredicateError>;

/// Errors that can occur while tokenizing or parsing a predicate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredicateError {
    #[error("predicate is empty")]
    EmptyExpression,

    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unterminated column reference starting at position {position}")]
    UnterminatedColumn { position: usize },

    #[error("unterminated date literal starting at position {position}")]
    UnterminatedDate { position: usize },

    #[error("invalid number: {text}")]
    InvalidNumber { text: String },

    #[error("invalid date literal: #{text}#")]
    InvalidDate { text: String },

    #[error("unexpected token: {token}")]
    UnexpectedToken { token: String },

    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    #[error("unknown function: {name}")]
    UnknownFunction { name: String },

    /// A `Convert` target that does not name a supported type.
    #[error("unknown type name: {name}")]
    UnknownType { name: String },

    #[error("unknown column: {name}")]
    UnknownColumn { name: String },
}

impl PredicateError {
    pub fn unexpected_token(token: impl ToString) -> Self {
        PredicateError::UnexpectedToken {
            token: token.to_string(),
        }
    }
}
