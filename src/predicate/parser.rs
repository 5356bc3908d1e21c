//! Recursive descent parser for predicate expressions.

use super::ast::Expr;
use super::error::{PredicateError, PredicateResult};
use super::lexer::{Lexer, Token};
use crate::core::{Value, ValueKind};

/// Parser for predicate expressions.
///
/// # Grammar
///
/// ```text
/// expr       ::= or
/// or         ::= and ("OR" and)*
/// and        ::= not ("AND" not)*
/// not        ::= "NOT" not | comparison
/// comparison ::= operand (cmp operand | "LIKE" operand)?
/// operand    ::= literal | column | call | "(" expr ")"
/// call       ::= Convert(expr, type) | IsNull(expr, expr)
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. comparison and `LIKE`
/// 2. `NOT`
/// 3. `AND`
/// 4. `OR`
pub struct PredicateParser {
    tokens: Vec<Token>,
    position: usize,
}

impl PredicateParser {
    /// Parses a predicate string into an [`Expr`].
    ///
    /// # Errors
    ///
    /// Returns `PredicateError::EmptyExpression` for blank input, a lexer error
    /// for malformed literals, and `UnexpectedToken` when tokens are left over.
    pub fn parse(input: &str) -> PredicateResult<Expr> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PredicateError::EmptyExpression);
        }

        let tokens = Lexer::new(trimmed).tokenize()?;
        let mut parser = Self { tokens, position: 0 };
        let expr = parser.parse_or()?;

        if let Some(remaining) = parser.peek() {
            return Err(PredicateError::unexpected_token(remaining));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    fn expect(&mut self, expected: Token) -> PredicateResult<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(PredicateError::unexpected_token(token)),
            None => Err(PredicateError::UnexpectedEndOfInput),
        }
    }

    fn parse_or(&mut self) -> PredicateResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PredicateResult<Expr> {
        let mut left = self.parse_not()?;
        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> PredicateResult<Expr> {
        if self.check(&Token::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::negate(inner));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PredicateResult<Expr> {
        let left = self.parse_operand()?;
        match self.peek() {
            Some(Token::Compare(op)) => {
                let op = *op;
                self.advance();
                let right = self.parse_operand()?;
                Ok(Expr::compare(op, left, right))
            }
            Some(Token::Like) => {
                self.advance();
                let pattern = self.parse_operand()?;
                Ok(Expr::like(left, pattern))
            }
            _ => Ok(left),
        }
    }

    fn parse_operand(&mut self) -> PredicateResult<Expr> {
        let token = self.advance().ok_or(PredicateError::UnexpectedEndOfInput)?;
        match token {
            Token::OpenParen => {
                let inner = self.parse_or()?;
                if !self.check(&Token::CloseParen) {
                    return Err(PredicateError::UnclosedParenthesis);
                }
                self.advance();
                Ok(inner)
            }
            Token::Column(name) => Ok(Expr::Column(name)),
            Token::Ident(name) if self.check(&Token::OpenParen) => self.parse_call(&name),
            Token::Ident(name) => Ok(Expr::Column(name)),
            Token::Str(text) => Ok(Expr::Literal(Value::Text(text))),
            Token::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            Token::Date(d) => Ok(Expr::Literal(Value::Date(d))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            other => Err(PredicateError::unexpected_token(other)),
        }
    }

    fn parse_call(&mut self, name: &str) -> PredicateResult<Expr> {
        self.expect(Token::OpenParen)?;
        let expr = match name.to_ascii_lowercase().as_str() {
            "convert" => {
                let inner = self.parse_or()?;
                self.expect(Token::Comma)?;
                let target = self.parse_type_name()?;
                Expr::Convert {
                    expr: Box::new(inner),
                    target,
                }
            }
            "isnull" => {
                let inner = self.parse_or()?;
                self.expect(Token::Comma)?;
                let fallback = self.parse_or()?;
                Expr::IsNull {
                    expr: Box::new(inner),
                    fallback: Box::new(fallback),
                }
            }
            _ => {
                return Err(PredicateError::UnknownFunction {
                    name: name.to_string(),
                })
            }
        };
        if !self.check(&Token::CloseParen) {
            return Err(PredicateError::UnclosedParenthesis);
        }
        self.advance();
        Ok(expr)
    }

    /// Type argument of `Convert`, quoted or bare.
    fn parse_type_name(&mut self) -> PredicateResult<ValueKind> {
        let name = match self.advance() {
            Some(Token::Str(name)) | Some(Token::Ident(name)) => name,
            Some(other) => return Err(PredicateError::unexpected_token(other)),
            None => return Err(PredicateError::UnexpectedEndOfInput),
        };
        type_kind(&name).ok_or(PredicateError::UnknownType { name })
    }
}

fn type_kind(name: &str) -> Option<ValueKind> {
    let short = name
        .strip_prefix("System.")
        .or_else(|| name.strip_prefix("system."))
        .unwrap_or(name);
    match short.to_ascii_lowercase().as_str() {
        "string" => Some(ValueKind::Text),
        "decimal" | "double" | "single" | "int16" | "int32" | "int64" => Some(ValueKind::Number),
        "boolean" => Some(ValueKind::Boolean),
        "datetime" => Some(ValueKind::Date),
        _ => None,
    }
}
