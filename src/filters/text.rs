use lazy_static::lazy_static;
use regex::Regex;

use super::GridFilter;
use super::widget::{FilterWidget, HeadlessWidget, WidgetValue};
use crate::predicate::literal::{self, COLUMN_REF_PATTERN, QUOTED_BODY_PATTERN};

lazy_static! {
    static ref PREFIX_FORM: Option<Regex> = Regex::new(&format!(
        r"^{COLUMN_REF_PATTERN} LIKE '(?P<value>{QUOTED_BODY_PATTERN})\*'$"
    ))
    .ok();
}

/// Prefix match on the column's text: `[c] LIKE 'input*'`
#[derive(Debug)]
pub struct TextFilter {
    widget: Box<dyn FilterWidget>,
}

impl TextFilter {
    pub fn new() -> Self {
        Self::with_widget(HeadlessWidget::boxed(WidgetValue::Text(String::new())))
    }

    pub fn with_widget(widget: Box<dyn FilterWidget>) -> Self {
        Self { widget }
    }

    pub fn input(&self) -> &str {
        match self.widget.value() {
            WidgetValue::Text(text) => text,
            _ => "",
        }
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.widget.set_value(WidgetValue::Text(input.into()));
    }
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GridFilter for TextFilter {
    fn has_filter(&self) -> bool {
        !self.input().is_empty()
    }

    fn get_filter(&self, column_ref: &str) -> String {
        if !self.has_filter() {
            return String::new();
        }
        format!("{column_ref} LIKE {}", literal::quote(&format!("{}*", self.input())))
    }

    fn set_filter(&mut self, filter: &str) {
        let Some(caps) = PREFIX_FORM.as_ref().and_then(|re| re.captures(filter)) else {
            return;
        };
        self.set_input(literal::unquote(&caps["value"]));
    }

    fn clear(&mut self) {
        self.set_input("");
    }

    fn widget(&self) -> &dyn FilterWidget {
        self.widget.as_ref()
    }

    fn widget_mut(&mut self) -> &mut dyn FilterWidget {
        self.widget.as_mut()
    }
}
