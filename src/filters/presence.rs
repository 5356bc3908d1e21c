//! Null test that works on any column kind.
//!
//! The column is coalesced to a fixed sentinel string and the sentinel is
//! compared with `=` (is null) or `<>` (has a value), so no store-specific
//! null operator is needed.

use lazy_static::lazy_static;
use regex::Regex;

use super::GridFilter;
use super::widget::{FilterWidget, HeadlessWidget, WidgetValue};
use crate::core::TriState;
use crate::predicate::literal::{self, COLUMN_REF_PATTERN, NULL_SENTINEL, STRING_TYPE};

lazy_static! {
    static ref NULL_TEST_FORM: Option<Regex> = {
        let sentinel = regex::escape(&literal::quote(NULL_SENTINEL));
        Regex::new(&format!(
            r"^Convert\(IsNull\({COLUMN_REF_PATTERN}, {sentinel}\), '{}'\) (?P<op>=|<>) {sentinel}$",
            regex::escape(STRING_TYPE)
        ))
        .ok()
    };
}

/// Null-test fragment for a column
pub fn fragment(column_ref: &str, is_null: bool) -> String {
    let sentinel = literal::quote(NULL_SENTINEL);
    let coalesced = format!("IsNull({column_ref}, {sentinel})");
    format!(
        "{} {} {sentinel}",
        literal::as_string(&coalesced),
        if is_null { "=" } else { "<>" }
    )
}

/// Recognise a null-test fragment; `Some(true)` for is-null, `Some(false)` for has-value
pub fn parse(filter: &str) -> Option<bool> {
    let caps = NULL_TEST_FORM.as_ref()?.captures(filter)?;
    Some(&caps["op"] == "=")
}

/// Tri-state null test: checked keeps rows with a value, unchecked keeps null rows
#[derive(Debug)]
pub struct PresenceFilter {
    widget: Box<dyn FilterWidget>,
}

impl PresenceFilter {
    pub fn new() -> Self {
        Self::with_widget(HeadlessWidget::boxed(WidgetValue::Check(TriState::Unset)))
    }

    pub fn with_widget(widget: Box<dyn FilterWidget>) -> Self {
        Self { widget }
    }

    pub fn state(&self) -> TriState {
        match self.widget.value() {
            WidgetValue::Check(state) => *state,
            _ => TriState::Unset,
        }
    }

    pub fn set_state(&mut self, state: TriState) {
        self.widget.set_value(WidgetValue::Check(state));
    }

    pub fn set_is_null(&mut self) {
        self.set_state(TriState::False);
    }

    pub fn set_has_value(&mut self) {
        self.set_state(TriState::True);
    }
}

impl Default for PresenceFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GridFilter for PresenceFilter {
    fn has_filter(&self) -> bool {
        self.state().is_set()
    }

    fn get_filter(&self, column_ref: &str) -> String {
        match self.state().as_bool() {
            Some(has_value) => fragment(column_ref, !has_value),
            None => String::new(),
        }
    }

    fn set_filter(&mut self, filter: &str) {
        if let Some(is_null) = parse(filter) {
            self.set_state(TriState::from(!is_null));
        }
    }

    fn clear(&mut self) {
        self.set_state(TriState::Unset);
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

    #[test]
    fn test_fragment_shape() {
        let sentinel = literal::quote(NULL_SENTINEL);
        assert_eq!(
            fragment("[name]", true),
            format!("Convert(IsNull([name], {sentinel}), 'System.String') = {sentinel}")
        );
        assert!(fragment("[name]", false).contains(&format!(") <> {sentinel}")));
    }

    #[test]
    fn test_is_null_clear_has_value_sequence() {
        let mut filter = PresenceFilter::new();

        filter.set_is_null();
        let is_null = filter.get_filter("[name]");
        filter.clear();
        let cleared = filter.get_filter("[name]");
        filter.set_has_value();
        let has_value = filter.get_filter("[name]");

        assert_eq!(cleared, "");
        assert_ne!(is_null, has_value);
        assert!(!is_null.is_empty() && !has_value.is_empty());

        for (fragment, expected) in [(&is_null, TriState::False), (&has_value, TriState::True)] {
            let mut restored = PresenceFilter::new();
            restored.set_filter(fragment);
            assert_eq!(restored.state(), expected);
        }
        let mut restored = PresenceFilter::new();
        restored.set_filter(&cleared);
        assert!(!restored.has_filter());
    }

    #[test]
    fn test_parse_rejects_other_forms() {
        assert_eq!(parse("[name] = 'x'"), None);
        assert_eq!(parse(&fragment(r"[odd\]name]", true)), Some(true));
    }
}
