//! Textual building blocks of predicate fragments.
//!
//! Every strategy emits its fragment through these helpers and matches it back
//! with the accompanying patterns, so emission and parsing cannot drift apart.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::CompareOp;

/// Type name used by the string conversion in fragments
pub const STRING_TYPE: &str = "System.String";

/// Marker substituted for null by the presence test
pub const NULL_SENTINEL: &str = "\u{a4}null\u{a4}7c3e\u{a4}";

/// Regex matching one bracketed column reference
pub const COLUMN_REF_PATTERN: &str = r"\[(?:[^\]\\]|\\.)+\]";

/// Regex matching the body of a single-quoted string (without the quotes)
pub const QUOTED_BODY_PATTERN: &str = r"(?:[^']|'')*";

/// Regex matching an invariant decimal literal
pub const DECIMAL_PATTERN: &str = r"[+-]?[0-9]+(?:\.[0-9]*)?";

/// Regex matching a `#MM/dd/yyyy#` literal; group names carry `suffix`
pub fn date_pattern(suffix: &str) -> String {
    format!(
        r"#(?P<month{suffix}>[0-9]{{2}})/(?P<day{suffix}>[0-9]{{2}})/(?P<year{suffix}>[0-9]{{4}})#"
    )
}

/// Bracketed reference for a column name; `]` and `\` are backslash-escaped
pub fn column_ref(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('[');
    for ch in name.chars() {
        if ch == ']' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push(']');
    out
}

/// Single-quoted string literal with doubled-quote escaping
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Inverse of the escaping done by [`quote`] for a captured body
pub fn unquote(body: &str) -> String {
    body.replace("''", "'")
}

pub fn decimal(value: &Decimal) -> String {
    value.to_string()
}

pub fn date(value: &NaiveDate) -> String {
    format!("#{}#", value.format("%m/%d/%Y"))
}

pub fn comparison(column_ref: &str, op: CompareOp, literal: &str) -> String {
    format!("{column_ref} {} {literal}", op.as_str())
}

/// `Convert(<expr>, 'System.String')`
pub fn as_string(expr: &str) -> String {
    format!("Convert({expr}, '{STRING_TYPE}')")
}

/// Predicate that no row satisfies, used when user input cannot be parsed
pub fn always_false(column_ref: &str) -> String {
    format!("{column_ref} = false")
}
