use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::types::ValueKind;

/// ISO date format used when a date is turned into text
pub const DATE_TEXT_FORMAT: &str = "%Y-%m-%d";

/// A single cell value as seen by the filter engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Kind of a non-null value
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueKind::Boolean),
            Self::Number(_) => Some(ValueKind::Number),
            Self::Text(_) => Some(ValueKind::Text),
            Self::Date(_) => Some(ValueKind::Date),
        }
    }

    /// Stringified form shared by the distinct-value scanner and `Convert(x, 'System.String')`
    ///
    /// Returns `None` for null so callers can keep null distinct from the empty string.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Date(d) => Some(d.format(DATE_TEXT_FORMAT).to_string()),
        }
    }

    /// Cast to another kind, `None` when the value cannot be represented
    pub fn convert(&self, kind: ValueKind) -> Option<Value> {
        match (self, kind) {
            (Self::Null, _) => Some(Self::Null),
            (_, ValueKind::Text | ValueKind::Enumerable) => self.to_display_string().map(Self::Text),
            (Self::Number(_), ValueKind::Number)
            | (Self::Bool(_), ValueKind::Boolean)
            | (Self::Date(_), ValueKind::Date) => Some(self.clone()),
            (Self::Text(s), ValueKind::Number) => parse_decimal(s).map(Self::Number),
            (Self::Text(s), ValueKind::Boolean) => parse_bool(s).map(Self::Bool),
            (Self::Text(s), ValueKind::Date) => parse_date::<&str>(s, &[]).map(Self::Date),
            (Self::Bool(b), ValueKind::Number) => Some(Self::Number(Decimal::from(*b as u8))),
            _ => None,
        }
    }

    /// Ordering between two values, `None` when either is null or the kinds are incompatible
    ///
    /// Text is coerced towards the other operand's kind when it parses as one.
    pub fn compare(&self, other: &Value, case_sensitive: bool) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Number(a), Self::Number(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(compare_text(a, b, case_sensitive)),
            (Self::Text(_), other_value) => {
                let coerced = self.convert(other_value.kind()?)?;
                coerced.compare(other_value, case_sensitive)
            }
            (value, Self::Text(_)) => {
                let coerced = other.convert(value.kind()?)?;
                value.compare(&coerced, case_sensitive)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_display_string() {
            Some(text) => write!(f, "{text}"),
            None => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

fn compare_text(a: &str, b: &str, case_sensitive: bool) -> Ordering {
    if case_sensitive {
        a.cmp(b)
    } else {
        a.to_lowercase().cmp(&b.to_lowercase())
    }
}

/// Parse user or predicate text as an invariant-culture decimal
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    Decimal::from_str(unsigned)
        .or_else(|_| Decimal::from_scientific(unsigned))
        .ok()
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse a date with the given formats, ISO `%Y-%m-%d` always being accepted last
pub fn parse_date<S: AsRef<str>>(text: &str, formats: &[S]) -> Option<NaiveDate> {
    let trimmed = text.trim();
    formats
        .iter()
        .map(|f| f.as_ref())
        .chain(std::iter::once(DATE_TEXT_FORMAT))
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}
