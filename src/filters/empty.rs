use super::GridFilter;
use super::widget::{FilterWidget, HeadlessWidget, WidgetValue};

/// Placeholder for columns that cannot be filtered
#[derive(Debug)]
pub struct EmptyFilter {
    widget: Box<dyn FilterWidget>,
}

impl EmptyFilter {
    pub fn new() -> Self {
        Self {
            widget: HeadlessWidget::boxed(WidgetValue::Empty),
        }
    }
}

impl Default for EmptyFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GridFilter for EmptyFilter {
    fn has_filter(&self) -> bool {
        false
    }

    fn get_filter(&self, _column_ref: &str) -> String {
        String::new()
    }

    fn set_filter(&mut self, _filter: &str) {}

    fn clear(&mut self) {}

    fn widget(&self) -> &dyn FilterWidget {
        self.widget.as_ref()
    }

    fn widget_mut(&mut self) -> &mut dyn FilterWidget {
        self.widget.as_mut()
    }
}
