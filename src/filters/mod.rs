//! Per-column filter strategies.
//!
//! Every bound column gets one [`FilterStrategy`]. A strategy turns the user's
//! criteria into a predicate fragment, parses a fragment it produced back into
//! the same criteria, and keeps its parameters in a [`FilterWidget`].

pub mod boolean;
pub mod date;
pub mod distinct;
pub mod empty;
pub mod factory;
pub mod numeric;
pub mod presence;
pub mod text;
pub mod widget;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub use boolean::BooleanFilter;
pub use date::{DateFilter, DateOperator};
pub use distinct::DistinctValuesFilter;
pub use empty::EmptyFilter;
pub use factory::{DefaultFilterFactory, FilterFactory};
pub use numeric::{NumericFilter, NumericOperator};
pub use presence::PresenceFilter;
pub use text::TextFilter;
pub use widget::{Choice, FilterWidget, HeadlessWidget, WidgetEvent, WidgetHandle, WidgetListener, WidgetValue};

/// Operator label of the inclusive range choice
pub const BETWEEN_OPERATOR: &str = "<x<";

/// Common contract of all filter strategies
pub trait GridFilter {
    /// Whether the current criteria restrict any rows
    fn has_filter(&self) -> bool;

    /// Predicate fragment for the column, empty when [`has_filter`](Self::has_filter) is false
    fn get_filter(&self, column_ref: &str) -> String;

    /// Restore criteria from a fragment; unrecognised input is ignored
    fn set_filter(&mut self, filter: &str);

    fn clear(&mut self);

    fn widget(&self) -> &dyn FilterWidget;

    fn widget_mut(&mut self) -> &mut dyn FilterWidget;
}

/// Kind tag of a [`FilterStrategy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Text,
    Numeric,
    Date,
    Boolean,
    Presence,
    Distinct,
    Empty,
}

#[derive(Debug)]
pub enum FilterStrategy {
    Text(TextFilter),
    Numeric(NumericFilter),
    Date(DateFilter),
    Boolean(BooleanFilter),
    Presence(PresenceFilter),
    Distinct(DistinctValuesFilter),
    Empty(EmptyFilter),
}

impl FilterStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            FilterStrategy::Text(_) => StrategyKind::Text,
            FilterStrategy::Numeric(_) => StrategyKind::Numeric,
            FilterStrategy::Date(_) => StrategyKind::Date,
            FilterStrategy::Boolean(_) => StrategyKind::Boolean,
            FilterStrategy::Presence(_) => StrategyKind::Presence,
            FilterStrategy::Distinct(_) => StrategyKind::Distinct,
            FilterStrategy::Empty(_) => StrategyKind::Empty,
        }
    }

    fn inner(&self) -> &dyn GridFilter {
        match self {
            FilterStrategy::Text(f) => f,
            FilterStrategy::Numeric(f) => f,
            FilterStrategy::Date(f) => f,
            FilterStrategy::Boolean(f) => f,
            FilterStrategy::Presence(f) => f,
            FilterStrategy::Distinct(f) => f,
            FilterStrategy::Empty(f) => f,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn GridFilter {
        match self {
            FilterStrategy::Text(f) => f,
            FilterStrategy::Numeric(f) => f,
            FilterStrategy::Date(f) => f,
            FilterStrategy::Boolean(f) => f,
            FilterStrategy::Presence(f) => f,
            FilterStrategy::Distinct(f) => f,
            FilterStrategy::Empty(f) => f,
        }
    }

    /// Detach listeners and release the widget
    pub fn dispose(&mut self) {
        let widget = self.widget_mut();
        widget.unsubscribe();
        widget.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.widget().is_disposed()
    }
}

impl GridFilter for FilterStrategy {
    fn has_filter(&self) -> bool {
        self.inner().has_filter()
    }

    fn get_filter(&self, column_ref: &str) -> String {
        self.inner().get_filter(column_ref)
    }

    fn set_filter(&mut self, filter: &str) {
        self.inner_mut().set_filter(filter);
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn widget(&self) -> &dyn FilterWidget {
        self.inner().widget()
    }

    fn widget_mut(&mut self) -> &mut dyn FilterWidget {
        self.inner_mut().widget_mut()
    }
}
