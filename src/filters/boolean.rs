use lazy_static::lazy_static;
use regex::Regex;

use super::GridFilter;
use super::widget::{FilterWidget, HeadlessWidget, WidgetValue};
use crate::core::TriState;
use crate::core::value::parse_bool;
use crate::predicate::literal::COLUMN_REF_PATTERN;

lazy_static! {
    static ref EQUALS_FORM: Option<Regex> =
        Regex::new(&format!(r"^{COLUMN_REF_PATTERN} = (?P<value>(?i:true|false))$")).ok();
}

/// Tri-state check over a boolean column: `[c] = true` / `[c] = false`
#[derive(Debug)]
pub struct BooleanFilter {
    widget: Box<dyn FilterWidget>,
}

impl BooleanFilter {
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
}

impl Default for BooleanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GridFilter for BooleanFilter {
    fn has_filter(&self) -> bool {
        self.state().is_set()
    }

    fn get_filter(&self, column_ref: &str) -> String {
        match self.state().as_bool() {
            Some(value) => format!("{column_ref} = {value}"),
            None => String::new(),
        }
    }

    fn set_filter(&mut self, filter: &str) {
        if let Some(caps) = EQUALS_FORM.as_ref().and_then(|re| re.captures(filter))
            && let Some(value) = parse_bool(&caps["value"])
        {
            self.set_state(TriState::from(value));
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
    fn test_unset_means_no_filter() {
        let filter = BooleanFilter::new();
        assert!(!filter.has_filter());
        assert_eq!(filter.get_filter("[read]"), "");
    }

    #[test]
    fn test_round_trip_both_states() {
        for state in [TriState::True, TriState::False] {
            let mut filter = BooleanFilter::new();
            filter.set_state(state);
            let fragment = filter.get_filter("[read]");

            let mut restored = BooleanFilter::new();
            restored.set_filter(&fragment);
            assert_eq!(restored.state(), state, "{fragment}");
        }
        let mut filter = BooleanFilter::new();
        filter.set_state(TriState::True);
        assert_eq!(filter.get_filter("[read]"), "[read] = true");
    }

    #[test]
    fn test_clear() {
        let mut filter = BooleanFilter::new();
        filter.set_filter("[read] = FALSE");
        assert_eq!(filter.state(), TriState::False);
        filter.clear();
        assert!(!filter.has_filter());
    }
}
