//! Lexer (tokenizer) for predicate expressions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{PredicateError, PredicateResult};
use crate::core::value::parse_decimal;
use crate::core::CompareOp;

/// A token in a predicate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A `[bracketed]` column reference, unescaped.
    Column(String),
    /// A bare word that is not a keyword: a column name, function name or type name.
    Ident(String),
    /// A single-quoted string, unescaped.
    Str(String),
    Number(Decimal),
    /// A `#MM/dd/yyyy#` date literal.
    Date(NaiveDate),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Like,
    Compare(CompareOp),
    OpenParen,
    CloseParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Column(name) => write!(f, "[{name}]"),
            Token::Ident(word) => write!(f, "{word}"),
            Token::Str(text) => write!(f, "'{text}'"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Date(d) => write!(f, "#{}#", d.format("%m/%d/%Y")),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::Compare(op) => write!(f, "{op}"),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Lexer for tokenizing predicate expressions.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Tokenize the whole input, failing on the first character that cannot start a token.
    pub fn tokenize(mut self) -> PredicateResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(&(position, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
                continue;
            }
            let token = match ch {
                '(' => self.single(Token::OpenParen),
                ')' => self.single(Token::CloseParen),
                ',' => self.single(Token::Comma),
                '=' => self.single(Token::Compare(CompareOp::Eq)),
                '<' => self.less_than(),
                '>' => self.greater_than(),
                '[' => self.column(position)?,
                '\'' => self.string(position)?,
                '#' => self.date(position)?,
                c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(position)?,
                c if c.is_alphabetic() || c == '_' => self.word(),
                other => {
                    return Err(PredicateError::UnexpectedCharacter {
                        character: other,
                        position,
                    })
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn less_than(&mut self) -> Token {
        self.chars.next();
        match self.chars.peek() {
            Some((_, '=')) => self.single(Token::Compare(CompareOp::Le)),
            Some((_, '>')) => self.single(Token::Compare(CompareOp::Ne)),
            _ => Token::Compare(CompareOp::Lt),
        }
    }

    fn greater_than(&mut self) -> Token {
        self.chars.next();
        match self.chars.peek() {
            Some((_, '=')) => self.single(Token::Compare(CompareOp::Ge)),
            _ => Token::Compare(CompareOp::Gt),
        }
    }

    fn column(&mut self, start: usize) -> PredicateResult<Token> {
        self.chars.next(); // consume '['
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, escaped)) => name.push(escaped),
                    None => return Err(PredicateError::UnterminatedColumn { position: start }),
                },
                Some((_, ']')) => break,
                Some((_, ch)) => name.push(ch),
                None => return Err(PredicateError::UnterminatedColumn { position: start }),
            }
        }
        if name.is_empty() {
            return Err(PredicateError::UnexpectedToken {
                token: "[]".to_string(),
            });
        }
        Ok(Token::Column(name))
    }

    fn string(&mut self, start: usize) -> PredicateResult<Token> {
        self.chars.next(); // consume opening quote
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\'')) => {
                    if matches!(self.chars.peek(), Some((_, '\''))) {
                        self.chars.next();
                        text.push('\'');
                    } else {
                        break;
                    }
                }
                Some((_, ch)) => text.push(ch),
                None => return Err(PredicateError::UnterminatedString { position: start }),
            }
        }
        Ok(Token::Str(text))
    }

    fn date(&mut self, start: usize) -> PredicateResult<Token> {
        self.chars.next(); // consume '#'
        let mut body = String::new();
        loop {
            match self.chars.next() {
                Some((_, '#')) => break,
                Some((_, ch)) => body.push(ch),
                None => return Err(PredicateError::UnterminatedDate { position: start }),
            }
        }
        NaiveDate::parse_from_str(body.trim(), "%m/%d/%Y")
            .map(Token::Date)
            .map_err(|_| PredicateError::InvalidDate { text: body })
    }

    fn number(&mut self, start: usize) -> PredicateResult<Token> {
        let mut end = start;
        let mut first = true;
        while let Some(&(idx, ch)) = self.chars.peek() {
            let sign_allowed = first && (ch == '-' || ch == '+');
            if !(ch.is_ascii_digit() || ch == '.' || sign_allowed) {
                break;
            }
            first = false;
            end = idx + ch.len_utf8();
            self.chars.next();
        }
        let text = &self.input[start..end];
        parse_decimal(text)
            .map(Token::Number)
            .ok_or_else(|| PredicateError::InvalidNumber {
                text: text.to_string(),
            })
    }

    fn word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                word.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.to_ascii_uppercase().as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "LIKE" => Token::Like,
            "TRUE" => Token::True,
            "FALSE" => Token::False,
            "NULL" => Token::Null,
            _ => Token::Ident(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    #[test]
    fn test_comparison_tokens() {
        assert_eq!(
            lex("[count] >= 10.5"),
            vec![
                Token::Column("count".to_string()),
                Token::Compare(CompareOp::Ge),
                Token::Number(Decimal::new(105, 1)),
            ]
        );
        assert_eq!(lex("<>")[0], Token::Compare(CompareOp::Ne));
        assert_eq!(lex("<=")[0], Token::Compare(CompareOp::Le));
        assert_eq!(lex("<")[0], Token::Compare(CompareOp::Lt));
    }

    #[test]
    fn test_escaped_column_and_string() {
        assert_eq!(
            lex(r"[a\]b] LIKE 'O''Br*'"),
            vec![
                Token::Column("a]b".to_string()),
                Token::Like,
                Token::Str("O'Br*".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(lex("and Or NOT like True false NULL"), vec![
            Token::And,
            Token::Or,
            Token::Not,
            Token::Like,
            Token::True,
            Token::False,
            Token::Null,
        ]);
    }

    #[test]
    fn test_function_call_tokens() {
        assert_eq!(
            lex("Convert([x], System.String)"),
            vec![
                Token::Ident("Convert".to_string()),
                Token::OpenParen,
                Token::Column("x".to_string()),
                Token::Comma,
                Token::Ident("System.String".to_string()),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_date_literal() {
        let tokens = lex("#03/09/2011#");
        assert_eq!(tokens, vec![Token::Date(NaiveDate::from_ymd_opt(2011, 3, 9).unwrap())]);
        assert!(matches!(
            Lexer::new("#13/45/2011#").tokenize(),
            Err(PredicateError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_negative_number_after_operator() {
        assert_eq!(
            lex("[n] > -79228162514264337593543950335"),
            vec![
                Token::Column("n".to_string()),
                Token::Compare(CompareOp::Gt),
                Token::Number(Decimal::MIN),
            ]
        );
    }

    #[test]
    fn test_errors_report_position() {
        assert_eq!(
            Lexer::new("[a] ? 1").tokenize(),
            Err(PredicateError::UnexpectedCharacter { character: '?', position: 4 })
        );
        assert!(matches!(
            Lexer::new("'open").tokenize(),
            Err(PredicateError::UnterminatedString { position: 0 })
        ));
        assert!(matches!(
            Lexer::new("[open").tokenize(),
            Err(PredicateError::UnterminatedColumn { position: 0 })
        ));
    }
}
