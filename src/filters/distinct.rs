use lazy_static::lazy_static;
use regex::Regex;

use super::widget::{Choice, FilterWidget, HeadlessWidget, WidgetValue};
use super::{GridFilter, presence};
use crate::predicate::literal::{self, COLUMN_REF_PATTERN, QUOTED_BODY_PATTERN, STRING_TYPE};

lazy_static! {
    static ref VALUE_FORM: Option<Regex> = Regex::new(&format!(
        r"^Convert\({COLUMN_REF_PATTERN}, '{}'\) = '(?P<value>{QUOTED_BODY_PATTERN})'$",
        regex::escape(STRING_TYPE)
    ))
    .ok();
}

/// Pick one of a column's distinct values, or its nulls
///
/// The value list is fixed at construction, usually from a
/// [`DistinctValueScanner`](crate::scanner::DistinctValueScanner) pass, and
/// offered sorted.
#[derive(Debug)]
pub struct DistinctValuesFilter {
    widget: Box<dyn FilterWidget>,
    values: Vec<String>,
    contains_null: bool,
}

impl DistinctValuesFilter {
    pub fn new(values: Vec<String>, contains_null: bool) -> Self {
        Self::with_widget(
            HeadlessWidget::boxed(WidgetValue::Choice(Choice::NoFilter)),
            values,
            contains_null,
        )
    }

    pub fn with_widget(widget: Box<dyn FilterWidget>, mut values: Vec<String>, contains_null: bool) -> Self {
        values.sort();
        Self {
            widget,
            values,
            contains_null,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains_null(&self) -> bool {
        self.contains_null
    }

    /// Entries offered to the user: no filter, then null when present, then the values
    pub fn choices(&self) -> Vec<Choice> {
        let mut choices = vec![Choice::NoFilter];
        if self.contains_null {
            choices.push(Choice::Null);
        }
        choices.extend(self.values.iter().cloned().map(Choice::Value));
        choices
    }

    pub fn selection(&self) -> Choice {
        match self.widget.value() {
            WidgetValue::Choice(choice) => choice.clone(),
            _ => Choice::NoFilter,
        }
    }

    /// Select an entry; choices that are not offered are ignored
    pub fn select(&mut self, choice: Choice) -> bool {
        let offered = match &choice {
            Choice::NoFilter => true,
            Choice::Null => self.contains_null,
            Choice::Value(value) => self.values.contains(value),
        };
        if offered {
            self.widget.set_value(WidgetValue::Choice(choice));
        }
        offered
    }
}

impl GridFilter for DistinctValuesFilter {
    fn has_filter(&self) -> bool {
        self.selection() != Choice::NoFilter
    }

    fn get_filter(&self, column_ref: &str) -> String {
        match self.selection() {
            Choice::NoFilter => String::new(),
            Choice::Null => presence::fragment(column_ref, true),
            Choice::Value(value) => {
                format!("{} = {}", literal::as_string(column_ref), literal::quote(&value))
            }
        }
    }

    /// Forms are tried as: null test, then value equality.
    fn set_filter(&mut self, filter: &str) {
        if presence::parse(filter) == Some(true) {
            self.select(Choice::Null);
            return;
        }
        if let Some(caps) = VALUE_FORM.as_ref().and_then(|re| re.captures(filter)) {
            self.select(Choice::Value(literal::unquote(&caps["value"])));
        }
    }

    fn clear(&mut self) {
        self.select(Choice::NoFilter);
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

    fn filter() -> DistinctValuesFilter {
        DistinctValuesFilter::new(vec!["sms".into(), "mms".into(), "it's".into()], true)
    }

    #[test]
    fn test_choices_are_sorted_after_null() {
        assert_eq!(
            filter().choices(),
            vec![
                Choice::NoFilter,
                Choice::Null,
                Choice::Value("it's".into()),
                Choice::Value("mms".into()),
                Choice::Value("sms".into()),
            ]
        );
    }

    #[test]
    fn test_value_fragment_and_round_trip() {
        let mut f = filter();
        assert!(f.select(Choice::Value("it's".into())));
        let fragment = f.get_filter("[kind]");
        assert_eq!(fragment, "Convert([kind], 'System.String') = 'it''s'");

        let mut restored = filter();
        restored.set_filter(&fragment);
        assert_eq!(restored.selection(), Choice::Value("it's".into()));
    }

    #[test]
    fn test_null_selection_uses_presence_fragment() {
        let mut f = filter();
        f.select(Choice::Null);
        let fragment = f.get_filter("[kind]");
        assert_eq!(fragment, presence::fragment("[kind]", true));

        let mut restored = filter();
        restored.set_filter(&fragment);
        assert_eq!(restored.selection(), Choice::Null);
    }

    #[test]
    fn test_unknown_value_leaves_selection_untouched() {
        let mut f = filter();
        f.select(Choice::Value("sms".into()));
        f.set_filter("Convert([kind], 'System.String') = 'fax'");
        assert_eq!(f.selection(), Choice::Value("sms".into()));
        assert!(!f.select(Choice::Value("fax".into())));
    }

    #[test]
    fn test_null_choice_requires_nulls() {
        let mut f = DistinctValuesFilter::new(vec!["a".into()], false);
        assert!(!f.select(Choice::Null));
        f.set_filter(&presence::fragment("[kind]", true));
        assert!(!f.has_filter());
    }
}
