use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::widget::{FilterWidget, HeadlessWidget, WidgetValue};
use super::{BETWEEN_OPERATOR, GridFilter};
use crate::core::CompareOp;
use crate::core::value::parse_decimal;
use crate::predicate::literal::{
    self, COLUMN_REF_PATTERN, DECIMAL_PATTERN, QUOTED_BODY_PATTERN, STRING_TYPE,
};

lazy_static! {
    static ref BETWEEN_FORM: Option<Regex> = Regex::new(&format!(
        r"^{COLUMN_REF_PATTERN} >= (?P<low>{DECIMAL_PATTERN}) AND {COLUMN_REF_PATTERN} <= (?P<high>{DECIMAL_PATTERN})$"
    ))
    .ok();
    static ref WILDCARD_FORM: Option<Regex> = Regex::new(&format!(
        r"^Convert\({COLUMN_REF_PATTERN}, '{}'\) LIKE '(?P<value>{QUOTED_BODY_PATTERN})\*'$",
        regex::escape(STRING_TYPE)
    ))
    .ok();
    static ref SINGLE_FORM: Option<Regex> = Regex::new(&format!(
        r"^{COLUMN_REF_PATTERN} (?P<op><=|>=|<>|=|<|>) (?P<value>{DECIMAL_PATTERN})$"
    ))
    .ok();
}

/// Operator choice of a numeric filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericOperator {
    Compare(CompareOp),
    /// `*`: prefix match on the number's text
    Wildcard,
    /// `<x<`: inclusive range
    Between,
}

impl NumericOperator {
    /// Operators offered by every numeric filter, in display order
    pub const BASE: [NumericOperator; 7] = [
        NumericOperator::Compare(CompareOp::Eq),
        NumericOperator::Compare(CompareOp::Ne),
        NumericOperator::Compare(CompareOp::Gt),
        NumericOperator::Compare(CompareOp::Lt),
        NumericOperator::Compare(CompareOp::Ge),
        NumericOperator::Compare(CompareOp::Le),
        NumericOperator::Wildcard,
    ];
}

impl Default for NumericOperator {
    fn default() -> Self {
        NumericOperator::Compare(CompareOp::Eq)
    }
}

impl fmt::Display for NumericOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericOperator::Compare(op) => write!(f, "{}", op.as_str()),
            NumericOperator::Wildcard => write!(f, "*"),
            NumericOperator::Between => write!(f, "{BETWEEN_OPERATOR}"),
        }
    }
}

impl FromStr for NumericOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(NumericOperator::Wildcard),
            BETWEEN_OPERATOR => Ok(NumericOperator::Between),
            other => CompareOp::from_str(other)
                .map(NumericOperator::Compare)
                .map_err(|_| format!("Unknown numeric operator: {other}")),
        }
    }
}

/// Comparison, prefix or range filter over a numeric column
#[derive(Debug)]
pub struct NumericFilter {
    widget: Box<dyn FilterWidget>,
    allow_between: bool,
}

impl NumericFilter {
    pub fn new(allow_between: bool) -> Self {
        Self::with_widget(
            HeadlessWidget::boxed(WidgetValue::operands(NumericOperator::default().to_string(), "", "")),
            allow_between,
        )
    }

    pub fn with_widget(widget: Box<dyn FilterWidget>, allow_between: bool) -> Self {
        Self {
            widget,
            allow_between,
        }
    }

    pub fn allow_between(&self) -> bool {
        self.allow_between
    }

    /// Toggle the range operator; turning it off resets a selected range to the first operator
    pub fn set_allow_between(&mut self, allow: bool) {
        self.allow_between = allow;
        if !allow && self.operator() == NumericOperator::Between {
            let (_, first, second) = self.parts();
            self.set_parts(NumericOperator::default(), first, second);
        }
    }

    pub fn operators(&self) -> Vec<NumericOperator> {
        let mut operators = NumericOperator::BASE.to_vec();
        if self.allow_between {
            operators.push(NumericOperator::Between);
        }
        operators
    }

    pub fn operator(&self) -> NumericOperator {
        self.parts().0
    }

    pub fn first(&self) -> String {
        self.parts().1
    }

    pub fn second(&self) -> String {
        self.parts().2
    }

    pub fn set_operator(&mut self, operator: NumericOperator) {
        let (_, first, second) = self.parts();
        self.set_parts(operator, first, second);
    }

    pub fn set_first(&mut self, text: impl Into<String>) {
        let (operator, _, second) = self.parts();
        self.set_parts(operator, text.into(), second);
    }

    pub fn set_second(&mut self, text: impl Into<String>) {
        let (operator, first, _) = self.parts();
        self.set_parts(operator, first, text.into());
    }

    /// Set operator and both operands with a single change notification
    pub fn set_parts(&mut self, operator: NumericOperator, first: String, second: String) {
        let operator = if operator == NumericOperator::Between && !self.allow_between {
            NumericOperator::default()
        } else {
            operator
        };
        self.widget
            .set_value(WidgetValue::operands(operator.to_string(), first, second));
    }

    fn parts(&self) -> (NumericOperator, String, String) {
        match self.widget.value() {
            WidgetValue::Operands {
                operator,
                first,
                second,
            } => (
                operator.parse().unwrap_or_default(),
                first.clone(),
                second.clone(),
            ),
            _ => (NumericOperator::default(), String::new(), String::new()),
        }
    }

    fn range_fragment(&self, column_ref: &str, first: &str, second: &str) -> Option<String> {
        let low = bound(first, Decimal::MIN)?;
        let high = bound(second, Decimal::MAX)?;
        Some(format!(
            "{} AND {}",
            literal::comparison(column_ref, CompareOp::Ge, &literal::decimal(&low)),
            literal::comparison(column_ref, CompareOp::Le, &literal::decimal(&high)),
        ))
    }

    fn restore_range(&mut self, caps: &Captures) -> bool {
        let (Some(low), Some(high)) = (parse_decimal(&caps["low"]), parse_decimal(&caps["high"])) else {
            return false;
        };
        let first = if low == Decimal::MIN { String::new() } else { low.to_string() };
        let second = if high == Decimal::MAX { String::new() } else { high.to_string() };
        self.set_parts(NumericOperator::Between, first, second);
        true
    }
}

/// A blank bound stands for `sentinel`; anything else must parse
fn bound(text: &str, sentinel: Decimal) -> Option<Decimal> {
    if text.trim().is_empty() {
        Some(sentinel)
    } else {
        parse_decimal(text)
    }
}

impl GridFilter for NumericFilter {
    fn has_filter(&self) -> bool {
        let (operator, first, second) = self.parts();
        match operator {
            NumericOperator::Between => !first.trim().is_empty() || !second.trim().is_empty(),
            _ => !first.trim().is_empty(),
        }
    }

    fn get_filter(&self, column_ref: &str) -> String {
        if !self.has_filter() {
            return String::new();
        }
        let (operator, first, second) = self.parts();
        let fragment = match operator {
            NumericOperator::Wildcard => Some(format!(
                "{} LIKE {}",
                literal::as_string(column_ref),
                literal::quote(&format!("{}*", first.trim()))
            )),
            NumericOperator::Between => self.range_fragment(column_ref, &first, &second),
            NumericOperator::Compare(op) => parse_decimal(&first)
                .map(|n| literal::comparison(column_ref, op, &literal::decimal(&n))),
        };
        fragment.unwrap_or_else(|| literal::always_false(column_ref))
    }

    /// Forms are tried as: range (when offered), prefix, single comparison.
    fn set_filter(&mut self, filter: &str) {
        if self.allow_between
            && let Some(caps) = BETWEEN_FORM.as_ref().and_then(|re| re.captures(filter))
            && self.restore_range(&caps)
        {
            return;
        }
        if let Some(caps) = WILDCARD_FORM.as_ref().and_then(|re| re.captures(filter)) {
            self.set_parts(NumericOperator::Wildcard, literal::unquote(&caps["value"]), String::new());
            return;
        }
        if let Some(caps) = SINGLE_FORM.as_ref().and_then(|re| re.captures(filter))
            && let (Ok(op), Some(value)) = (CompareOp::from_str(&caps["op"]), parse_decimal(&caps["value"]))
        {
            self.set_parts(NumericOperator::Compare(op), value.to_string(), String::new());
        }
    }

    fn clear(&mut self) {
        self.set_parts(NumericOperator::default(), String::new(), String::new());
    }

    fn widget(&self) -> &dyn FilterWidget {
        self.widget.as_ref()
    }

    fn widget_mut(&mut self) -> &mut dyn FilterWidget {
        self.widget.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter(operator: NumericOperator, first: &str, second: &str) -> NumericFilter {
        let mut filter = NumericFilter::new(true);
        filter.set_parts(operator, first.to_string(), second.to_string());
        filter
    }

    #[test]
    fn test_single_comparison() {
        let f = filter(NumericOperator::Compare(CompareOp::Gt), "10", "");
        assert_eq!(f.get_filter("[size]"), "[size] > 10");
    }

    #[test]
    fn test_between_bounds() {
        let f = filter(NumericOperator::Between, "1", "5");
        assert_eq!(f.get_filter("[c]"), "[c] >= 1 AND [c] <= 5");
    }

    #[test]
    fn test_blank_upper_bound_uses_max() {
        let f = filter(NumericOperator::Between, "2", "");
        assert_eq!(
            f.get_filter("[c]"),
            format!("[c] >= 2 AND [c] <= {}", Decimal::MAX)
        );
    }

    #[test]
    fn test_unparsable_number_is_always_false() {
        let f = filter(NumericOperator::Compare(CompareOp::Eq), "ten", "");
        assert_eq!(f.get_filter("[c]"), "[c] = false");
        let f = filter(NumericOperator::Between, "1", "x");
        assert_eq!(f.get_filter("[c]"), "[c] = false");
    }

    #[test]
    fn test_wildcard_fragment() {
        let f = filter(NumericOperator::Wildcard, "12", "");
        assert_eq!(f.get_filter("[c]"), "Convert([c], 'System.String') LIKE '12*'");
    }

    #[test]
    fn test_round_trips() {
        let cases = [
            (NumericOperator::Compare(CompareOp::Le), "-3.25", ""),
            (NumericOperator::Compare(CompareOp::Ne), "0", ""),
            (NumericOperator::Wildcard, "12", ""),
            (NumericOperator::Between, "1", "5"),
            (NumericOperator::Between, "", "5"),
            (NumericOperator::Between, "7", ""),
        ];
        for (operator, first, second) in cases {
            let fragment = filter(operator, first, second).get_filter("[c]");
            let mut restored = NumericFilter::new(true);
            restored.set_filter(&fragment);
            assert_eq!(restored.operator(), operator, "{fragment}");
            assert_eq!(restored.first(), first, "{fragment}");
            assert_eq!(restored.second(), second, "{fragment}");
        }
    }

    #[test]
    fn test_range_ignored_when_between_not_offered() {
        let mut restored = NumericFilter::new(false);
        restored.set_filter("[c] >= 1 AND [c] <= 5");
        assert!(!restored.has_filter());
        assert!(!restored.operators().contains(&NumericOperator::Between));
    }

    #[test]
    fn test_clear_resets_state() {
        let mut f = filter(NumericOperator::Between, "1", "5");
        f.clear();
        assert!(!f.has_filter());
        assert_eq!(f.operator(), NumericOperator::default());
    }

    #[test]
    fn test_disabling_between_resets_operator() {
        let mut f = filter(NumericOperator::Between, "1", "5");
        f.set_allow_between(false);
        assert_eq!(f.operator(), NumericOperator::default());
    }
}
