use std::collections::HashMap;

use tracing::{debug, warn};

use super::{
    BooleanFilter, DateFilter, DistinctValuesFilter, EmptyFilter, FilterStrategy, NumericFilter,
    PresenceFilter, StrategyKind, TextFilter,
};
use crate::config::FilterSettings;
use crate::core::{ColumnDescriptor, ValueKind};
use crate::scanner::{DistinctScan, DistinctValueScanner};
use crate::view::DataView;

/// Creates the strategy bound to a column
pub trait FilterFactory {
    fn create(&self, column: &ColumnDescriptor, view: &dyn DataView) -> FilterStrategy;
}

/// Picks a strategy from the column's value kind, with optional per-column overrides
#[derive(Debug, Clone)]
pub struct DefaultFilterFactory {
    allow_between: bool,
    date_formats: Vec<String>,
    scanner: DistinctValueScanner,
    overrides: HashMap<String, StrategyKind>,
}

impl Default for DefaultFilterFactory {
    fn default() -> Self {
        Self::from_settings(&FilterSettings::default())
    }
}

impl DefaultFilterFactory {
    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self {
            allow_between: settings.between_operator,
            date_formats: settings.date_formats.clone(),
            scanner: DistinctValueScanner::new(settings.distinct_value_cap),
            overrides: HashMap::new(),
        }
    }

    /// Force a strategy kind for the named column
    pub fn with_override(mut self, column: impl Into<String>, kind: StrategyKind) -> Self {
        self.overrides.insert(column.into(), kind);
        self
    }

    pub fn set_override(&mut self, column: impl Into<String>, kind: StrategyKind) {
        self.overrides.insert(column.into(), kind);
    }

    pub fn scanner(&self) -> &DistinctValueScanner {
        &self.scanner
    }

    fn kind_for(&self, column: &ColumnDescriptor) -> StrategyKind {
        if let Some(kind) = self.overrides.get(&column.name) {
            return *kind;
        }
        match column.kind {
            ValueKind::Text => StrategyKind::Text,
            ValueKind::Number => StrategyKind::Numeric,
            ValueKind::Date => StrategyKind::Date,
            ValueKind::Boolean => StrategyKind::Boolean,
            ValueKind::Enumerable => StrategyKind::Distinct,
        }
    }

    fn distinct(&self, column: &ColumnDescriptor, view: &dyn DataView) -> FilterStrategy {
        match self.scanner.scan(view, &column.name) {
            Ok(DistinctScan::Values {
                values,
                contains_null,
            }) => FilterStrategy::Distinct(DistinctValuesFilter::new(values, contains_null)),
            Ok(DistinctScan::Unavailable) => {
                debug!(
                    "Too many distinct values in '{}', leaving it unfiltered",
                    column.name
                );
                FilterStrategy::Empty(EmptyFilter::new())
            }
            Err(e) => {
                warn!("Could not scan distinct values of '{}': {}", column.name, e);
                FilterStrategy::Empty(EmptyFilter::new())
            }
        }
    }
}

impl FilterFactory for DefaultFilterFactory {
    fn create(&self, column: &ColumnDescriptor, view: &dyn DataView) -> FilterStrategy {
        match self.kind_for(column) {
            StrategyKind::Text => FilterStrategy::Text(TextFilter::new()),
            StrategyKind::Numeric => FilterStrategy::Numeric(NumericFilter::new(self.allow_between)),
            StrategyKind::Date => {
                FilterStrategy::Date(DateFilter::new(self.allow_between, self.date_formats.clone()))
            }
            StrategyKind::Boolean => FilterStrategy::Boolean(BooleanFilter::new()),
            StrategyKind::Presence => FilterStrategy::Presence(PresenceFilter::new()),
            StrategyKind::Distinct => self.distinct(column, view),
            StrategyKind::Empty => FilterStrategy::Empty(EmptyFilter::new()),
        }
    }
}
