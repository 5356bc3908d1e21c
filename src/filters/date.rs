use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::widget::{FilterWidget, HeadlessWidget, WidgetValue};
use super::{BETWEEN_OPERATOR, GridFilter};
use crate::core::CompareOp;
use crate::core::value::{DATE_TEXT_FORMAT, parse_date};
use crate::predicate::literal::{self, COLUMN_REF_PATTERN, date_pattern};

lazy_static! {
    static ref BETWEEN_FORM: Option<Regex> = Regex::new(&format!(
        r"^{COLUMN_REF_PATTERN} >= {} AND {COLUMN_REF_PATTERN} <= {}$",
        date_pattern("1"),
        date_pattern("2")
    ))
    .ok();
    static ref SINGLE_FORM: Option<Regex> = Regex::new(&format!(
        r"^{COLUMN_REF_PATTERN} (?P<op><=|>=|<>|=|<|>) {}$",
        date_pattern("")
    ))
    .ok();
}

/// Lowest date a range filter can express; stands for a blank lower bound
pub fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Highest date a range filter can express; stands for a blank upper bound
pub fn max_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Operator choice of a date filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOperator {
    Compare(CompareOp),
    /// `<x<`: inclusive range
    Between,
}

impl DateOperator {
    /// Operators offered by every date filter, in display order
    pub const BASE: [DateOperator; 6] = [
        DateOperator::Compare(CompareOp::Eq),
        DateOperator::Compare(CompareOp::Ne),
        DateOperator::Compare(CompareOp::Gt),
        DateOperator::Compare(CompareOp::Lt),
        DateOperator::Compare(CompareOp::Ge),
        DateOperator::Compare(CompareOp::Le),
    ];
}

impl fmt::Display for DateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOperator::Compare(op) => write!(f, "{}", op.as_str()),
            DateOperator::Between => write!(f, "{BETWEEN_OPERATOR}"),
        }
    }
}

impl FromStr for DateOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            BETWEEN_OPERATOR => Ok(DateOperator::Between),
            other => CompareOp::from_str(other)
                .map(DateOperator::Compare)
                .map_err(|_| format!("Unknown date operator: {other}")),
        }
    }
}

/// Comparison or range filter over a date column
///
/// The operator selector starts blank, which means no filter. Operand text is
/// parsed with the configured formats; ISO dates are always accepted.
#[derive(Debug)]
pub struct DateFilter {
    widget: Box<dyn FilterWidget>,
    allow_between: bool,
    formats: Vec<String>,
}

impl DateFilter {
    pub fn new(allow_between: bool, formats: Vec<String>) -> Self {
        Self::with_widget(
            HeadlessWidget::boxed(WidgetValue::operands("", "", "")),
            allow_between,
            formats,
        )
    }

    pub fn with_widget(widget: Box<dyn FilterWidget>, allow_between: bool, formats: Vec<String>) -> Self {
        Self {
            widget,
            allow_between,
            formats,
        }
    }

    pub fn allow_between(&self) -> bool {
        self.allow_between
    }

    pub fn set_allow_between(&mut self, allow: bool) {
        self.allow_between = allow;
        if !allow && self.operator() == Some(DateOperator::Between) {
            let (_, first, second) = self.parts();
            self.set_parts(None, first, second);
        }
    }

    /// Selectable operators; `None` is the blank "no filter" entry
    pub fn operators(&self) -> Vec<Option<DateOperator>> {
        let mut operators = vec![None];
        operators.extend(DateOperator::BASE.iter().copied().map(Some));
        if self.allow_between {
            operators.push(Some(DateOperator::Between));
        }
        operators
    }

    pub fn operator(&self) -> Option<DateOperator> {
        self.parts().0
    }

    pub fn first(&self) -> String {
        self.parts().1
    }

    pub fn second(&self) -> String {
        self.parts().2
    }

    pub fn set_operator(&mut self, operator: Option<DateOperator>) {
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

    pub fn set_parts(&mut self, operator: Option<DateOperator>, first: String, second: String) {
        let operator = operator.filter(|op| *op != DateOperator::Between || self.allow_between);
        let label = operator.map(|op| op.to_string()).unwrap_or_default();
        self.widget.set_value(WidgetValue::operands(label, first, second));
    }

    fn parts(&self) -> (Option<DateOperator>, String, String) {
        match self.widget.value() {
            WidgetValue::Operands {
                operator,
                first,
                second,
            } => (operator.parse().ok(), first.clone(), second.clone()),
            _ => (None, String::new(), String::new()),
        }
    }

    fn bound(&self, text: &str, sentinel: NaiveDate) -> Option<NaiveDate> {
        if text.trim().is_empty() {
            Some(sentinel)
        } else {
            parse_date(text, &self.formats)
        }
    }

    fn restore_range(&mut self, caps: &Captures) -> bool {
        let (Some(low), Some(high)) = (captured_date(caps, "1"), captured_date(caps, "2")) else {
            return false;
        };
        let first = if low == min_date() { String::new() } else { iso(&low) };
        let second = if high == max_date() { String::new() } else { iso(&high) };
        self.set_parts(Some(DateOperator::Between), first, second);
        true
    }
}

fn iso(date: &NaiveDate) -> String {
    date.format(DATE_TEXT_FORMAT).to_string()
}

fn captured_date(caps: &Captures, suffix: &str) -> Option<NaiveDate> {
    let year = caps.name(&format!("year{suffix}"))?.as_str().parse().ok()?;
    let month = caps.name(&format!("month{suffix}"))?.as_str().parse().ok()?;
    let day = caps.name(&format!("day{suffix}"))?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

impl GridFilter for DateFilter {
    fn has_filter(&self) -> bool {
        let (operator, first, second) = self.parts();
        match operator {
            None => false,
            Some(DateOperator::Between) => !first.trim().is_empty() || !second.trim().is_empty(),
            Some(DateOperator::Compare(_)) => !first.trim().is_empty(),
        }
    }

    fn get_filter(&self, column_ref: &str) -> String {
        if !self.has_filter() {
            return String::new();
        }
        let (operator, first, second) = self.parts();
        let fragment = match operator {
            Some(DateOperator::Between) => self
                .bound(&first, min_date())
                .zip(self.bound(&second, max_date()))
                .map(|(low, high)| {
                    format!(
                        "{} AND {}",
                        literal::comparison(column_ref, CompareOp::Ge, &literal::date(&low)),
                        literal::comparison(column_ref, CompareOp::Le, &literal::date(&high)),
                    )
                }),
            Some(DateOperator::Compare(op)) => parse_date(&first, &self.formats)
                .map(|d| literal::comparison(column_ref, op, &literal::date(&d))),
            None => None,
        };
        fragment.unwrap_or_else(|| literal::always_false(column_ref))
    }

    /// Forms are tried as: range (when offered), single comparison.
    fn set_filter(&mut self, filter: &str) {
        if self.allow_between
            && let Some(caps) = BETWEEN_FORM.as_ref().and_then(|re| re.captures(filter))
            && self.restore_range(&caps)
        {
            return;
        }
        if let Some(caps) = SINGLE_FORM.as_ref().and_then(|re| re.captures(filter))
            && let (Ok(op), Some(date)) = (CompareOp::from_str(&caps["op"]), captured_date(&caps, ""))
        {
            self.set_parts(Some(DateOperator::Compare(op)), iso(&date), String::new());
        }
    }

    fn clear(&mut self) {
        self.set_parts(None, String::new(), String::new());
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

    fn formats() -> Vec<String> {
        vec!["%m/%d/%Y".to_string(), "%d.%m.%Y".to_string()]
    }

    fn filter(operator: Option<DateOperator>, first: &str, second: &str) -> DateFilter {
        let mut filter = DateFilter::new(true, formats());
        filter.set_parts(operator, first.to_string(), second.to_string());
        filter
    }

    #[test]
    fn test_blank_operator_means_no_filter() {
        let f = filter(None, "2011-03-09", "");
        assert!(!f.has_filter());
        assert_eq!(f.get_filter("[sent]"), "");
    }

    #[test]
    fn test_single_comparison_uses_fixed_literal() {
        let f = filter(Some(DateOperator::Compare(CompareOp::Ge)), "09.03.2011", "");
        assert_eq!(f.get_filter("[sent]"), "[sent] >= #03/09/2011#");
    }

    #[test]
    fn test_between_with_blank_bounds() {
        let f = filter(Some(DateOperator::Between), "", "2011-03-09");
        assert_eq!(
            f.get_filter("[sent]"),
            "[sent] >= #01/01/0001# AND [sent] <= #03/09/2011#"
        );
        let f = filter(Some(DateOperator::Between), "2011-03-09", "");
        assert_eq!(
            f.get_filter("[sent]"),
            "[sent] >= #03/09/2011# AND [sent] <= #12/31/9999#"
        );
    }

    #[test]
    fn test_unparsable_date_is_always_false() {
        let f = filter(Some(DateOperator::Compare(CompareOp::Eq)), "someday", "");
        assert_eq!(f.get_filter("[sent]"), "[sent] = false");
    }

    #[test]
    fn test_round_trips() {
        let cases = [
            (Some(DateOperator::Compare(CompareOp::Lt)), "2011-03-09", ""),
            (Some(DateOperator::Compare(CompareOp::Ne)), "1999-12-31", ""),
            (Some(DateOperator::Between), "2000-01-01", "2000-12-31"),
            (Some(DateOperator::Between), "", "2000-12-31"),
            (Some(DateOperator::Between), "2000-01-01", ""),
        ];
        for (operator, first, second) in cases {
            let fragment = filter(operator, first, second).get_filter("[sent]");
            let mut restored = DateFilter::new(true, formats());
            restored.set_filter(&fragment);
            assert_eq!(restored.operator(), operator, "{fragment}");
            assert_eq!(restored.first(), first, "{fragment}");
            assert_eq!(restored.second(), second, "{fragment}");
        }
    }

    #[test]
    fn test_restored_dates_are_iso() {
        let mut restored = DateFilter::new(false, formats());
        restored.set_filter("[sent] = #03/09/2011#");
        assert_eq!(restored.first(), "2011-03-09");
        assert_eq!(restored.operators().len(), 7);
    }
}
