//! Composition of column filters into the predicate applied to a view.
//!
//! A [`FilterCombinator`] owns a [`DataView`] and binds one
//! [`FilterStrategy`] to every column the view publishes. Widget edits arrive
//! over a channel; the [`RefreshMode`] decides whether they trigger a
//! recompute. A recompute joins the column fragments, merges them with the
//! table's base filter and the custom override, and pushes the result to the
//! view only when it differs from the last applied predicate.
//!
//! # Example
//!
//! ```
//! use gridfilter::combinator::FilterCombinator;
//! use gridfilter::core::{ColumnDescriptor, Value, ValueKind};
//! use gridfilter::filters::FilterStrategy;
//! use gridfilter::view::{DataView, MemoryView};
//!
//! let view = MemoryView::new("inbox", vec![ColumnDescriptor::new("sender", ValueKind::Text)])
//!     .with_rows(vec![vec![Value::text("smith")], vec![Value::text("jones")]]);
//! let mut combinator = FilterCombinator::new(view);
//! combinator
//!     .edit_filter("sender", |strategy| {
//!         if let FilterStrategy::Text(text) = strategy {
//!             text.set_input("smi");
//!         }
//!     })
//!     .unwrap();
//! assert_eq!(combinator.view().predicate(), "[sender] LIKE 'smi*'");
//! assert_eq!(combinator.view().row_count(), 1);
//! ```

mod events;
mod memory;
mod refresh;
mod report;

pub use events::FilterEvent;
pub use memory::{TableFilterMemory, TableFilterSnapshot};
pub use refresh::{RefreshAction, RefreshMode};
pub use report::{ErrorModes, ErrorReporter, MemorySink, NotificationSink, StderrSink};

use std::collections::HashMap;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, trace};

use crate::config::FilterSettings;
use crate::core::{LogicalOperator, TableId};
use crate::error::{FilterError, Result};
use crate::filters::{
    DefaultFilterFactory, FilterFactory, FilterStrategy, GridFilter, StrategyKind, WidgetEvent,
    WidgetListener,
};
use crate::predicate::{self, literal};
use crate::view::DataView;

/// A strategy bound to one column of the view
#[derive(Debug)]
pub struct FilterBinding {
    column: String,
    display_name: String,
    strategy: FilterStrategy,
}

impl FilterBinding {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn strategy(&self) -> &FilterStrategy {
        &self.strategy
    }

    fn column_ref(&self) -> String {
        literal::column_ref(&self.column)
    }

    fn fragment(&self) -> String {
        if self.strategy.has_filter() {
            self.strategy.get_filter(&self.column_ref())
        } else {
            String::new()
        }
    }
}

pub struct FilterCombinator<V: DataView> {
    view: V,
    bindings: Vec<FilterBinding>,
    factory: Box<dyn FilterFactory>,
    base_filters: HashMap<TableId, String>,
    base_filter_enabled: bool,
    base_filter_operator: LogicalOperator,
    operator: LogicalOperator,
    custom_filter: String,
    /// `None` forces the next recompute to push
    last_applied: Option<String>,
    refresh_mode: RefreshMode,
    suspended: usize,
    memory: TableFilterMemory,
    reporter: ErrorReporter,
    event_tx: Option<UnboundedSender<FilterEvent>>,
    widget_tx: UnboundedSender<WidgetEvent>,
    widget_rx: UnboundedReceiver<WidgetEvent>,
}

impl<V: DataView> std::fmt::Debug for FilterCombinator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterCombinator")
            .field("table", self.view.table_id())
            .field("bindings", &self.bindings)
            .field("operator", &self.operator)
            .field("custom_filter", &self.custom_filter)
            .field("last_applied", &self.last_applied)
            .field("refresh_mode", &self.refresh_mode)
            .finish_non_exhaustive()
    }
}

impl<V: DataView> FilterCombinator<V> {
    pub fn new(view: V) -> Self {
        Self::with_settings(view, &FilterSettings::default())
    }

    pub fn with_settings(view: V, settings: &FilterSettings) -> Self {
        Self::with_factory(view, settings, Box::new(DefaultFilterFactory::from_settings(settings)))
    }

    /// Bind every column of `view` using strategies from `factory`
    pub fn with_factory(view: V, settings: &FilterSettings, factory: Box<dyn FilterFactory>) -> Self {
        let (widget_tx, widget_rx) = unbounded_channel();
        let mut combinator = Self {
            view,
            bindings: Vec::new(),
            factory,
            base_filters: HashMap::new(),
            base_filter_enabled: settings.base_filter_enabled,
            base_filter_operator: settings.base_filter_operator,
            operator: settings.operator,
            custom_filter: String::new(),
            last_applied: Some(String::new()),
            refresh_mode: settings.refresh_mode,
            suspended: 0,
            memory: TableFilterMemory::new(settings.keep_filters),
            reporter: ErrorReporter::new(settings.log_errors, settings.notify_errors),
            event_tx: None,
            widget_tx,
            widget_rx,
        };
        combinator.rebuild();
        combinator
    }

    pub fn register_event_handler(&mut self, tx: UnboundedSender<FilterEvent>) -> Result<()> {
        self.event_tx = Some(tx);
        Ok(())
    }

    fn emit(&self, event: FilterEvent) {
        if let Some(tx) = &self.event_tx
            && tx.send(event).is_err()
        {
            trace!("Filter event handler is gone");
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view. Call [`sync_columns`](Self::sync_columns)
    /// after changing its columns.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(mut self) -> V {
        self.dispose_bindings();
        self.view
    }

    /// Swap in another view and rebind to it, returning the previous one
    pub fn set_view(&mut self, view: V) -> V {
        let previous = std::mem::replace(&mut self.view, view);
        self.on_data_source_changed();
        previous
    }

    // --- binding -------------------------------------------------------------

    fn dispose_bindings(&mut self) {
        for mut binding in std::mem::take(&mut self.bindings) {
            binding.strategy.dispose();
            self.emit(FilterEvent::StrategyUnbound {
                column: binding.column,
                kind: binding.strategy.kind(),
            });
        }
    }

    /// Dispose every strategy and bind fresh ones to the view's current columns.
    ///
    /// A remembered snapshot for the bound table is replayed before the single
    /// recompute that follows.
    pub fn rebuild(&mut self) {
        self.dispose_bindings();

        let (widget_tx, widget_rx) = unbounded_channel();
        self.widget_tx = widget_tx;
        self.widget_rx = widget_rx;

        let mut bindings = Vec::with_capacity(self.view.columns().len());
        for (index, column) in self.view.columns().iter().enumerate() {
            let mut strategy = self.factory.create(column, &self.view);
            strategy
                .widget_mut()
                .subscribe(WidgetListener::new(index, self.widget_tx.clone()));
            bindings.push(FilterBinding {
                column: column.name.clone(),
                display_name: column.display_name.clone(),
                strategy,
            });
        }
        for binding in &bindings {
            self.emit(FilterEvent::StrategyBound {
                column: binding.column.clone(),
                kind: binding.strategy.kind(),
            });
        }
        self.bindings = bindings;
        debug!(
            "Bound {} filter(s) to {}",
            self.bindings.len(),
            self.view.table_id()
        );

        if let Some(snapshot) = self.memory.snapshot(self.view.table_id()) {
            debug!("Restoring remembered filters of {}", snapshot.table);
            self.apply_filters(snapshot.filters.as_slice());
        }
        self.discard_widget_events();
        self.recompute(false);
    }

    /// Rebuild when the view's column set changed, otherwise pick up
    /// display changes and recompute
    pub fn sync_columns(&mut self) {
        let same_columns = self.bindings.len() == self.view.columns().len()
            && self
                .bindings
                .iter()
                .zip(self.view.columns())
                .all(|(binding, column)| binding.column == column.name);
        if !same_columns {
            self.rebuild();
            return;
        }
        for (binding, column) in self.bindings.iter_mut().zip(self.view.columns()) {
            binding.display_name.clone_from(&column.display_name);
        }
        self.recompute(false);
    }

    /// The view now shows another table
    pub fn on_data_source_changed(&mut self) {
        self.last_applied = Some(String::new());
        self.rebuild();
    }

    // --- lookup --------------------------------------------------------------

    pub fn bindings(&self) -> &[FilterBinding] {
        &self.bindings
    }

    pub fn filter(&self, column: &str) -> Option<&FilterStrategy> {
        self.bindings
            .iter()
            .find(|b| b.column == column)
            .map(|b| &b.strategy)
    }

    /// Direct mutable access; widget events are handled on the next
    /// [`process_widget_events`](Self::process_widget_events)
    pub fn filter_mut(&mut self, column: &str) -> Option<&mut FilterStrategy> {
        self.bindings
            .iter_mut()
            .find(|b| b.column == column)
            .map(|b| &mut b.strategy)
    }

    pub fn filter_by_display_name(&self, display_name: &str) -> Option<&FilterStrategy> {
        self.bindings
            .iter()
            .find(|b| b.display_name == display_name)
            .map(|b| &b.strategy)
    }

    pub fn filters_of_kind(&self, kind: StrategyKind) -> impl Iterator<Item = (&str, &FilterStrategy)> + '_ {
        self.bindings
            .iter()
            .filter(move |b| b.strategy.kind() == kind)
            .map(|b| (b.column.as_str(), &b.strategy))
    }

    // --- composition ---------------------------------------------------------

    /// Predicate the current state composes to, without applying it
    pub fn compose_predicate(&self) -> String {
        let columns = self.view.columns();
        let mut active: Vec<(usize, usize, String)> = self
            .bindings
            .iter()
            .enumerate()
            .filter_map(|(position, binding)| {
                let column = columns.iter().find(|c| c.name == binding.column)?;
                if !column.visible || !binding.strategy.has_filter() {
                    return None;
                }
                Some((column.display_index, position, binding.fragment()))
            })
            .collect();
        active.sort_by_key(|(display_index, position, _)| (*display_index, *position));
        let fragments: Vec<String> = active.into_iter().map(|(_, _, fragment)| fragment).collect();

        let columns_part = predicate::join(&fragments, self.operator);
        let base = if self.base_filter_enabled {
            self.base_filter()
        } else {
            ""
        };
        let merged = predicate::merge(&columns_part, base, self.base_filter_operator);
        predicate::with_override(&merged, &self.custom_filter)
    }

    fn recompute(&mut self, manual: bool) {
        if self.refresh_mode == RefreshMode::Off && !manual {
            trace!("Automatic refresh is off");
            return;
        }
        if self.suspended > 0 {
            trace!("Refresh suspended");
            return;
        }
        if self.bindings.is_empty() && self.custom_filter.trim().is_empty() {
            return;
        }

        let predicate = self.compose_predicate();
        if self.last_applied.as_deref() != Some(predicate.as_str()) {
            self.last_applied = Some(predicate.clone());
            self.emit(FilterEvent::BeforeChange {
                predicate: predicate.clone(),
            });
            match self.view.set_predicate(&predicate) {
                Ok(()) => {
                    debug!("Applied filter '{}' to {}", predicate, self.view.table_id());
                    self.emit(FilterEvent::AfterChange { predicate });
                }
                Err(e) => self.reporter.report(&e),
            }
        } else {
            trace!("Filter unchanged");
        }

        // a rejected predicate is not snapshotted
        if self.memory.is_enabled() && self.view.predicate() == self.compose_predicate() {
            let filters = self.get_filters();
            let table = self.view.table_id().clone();
            self.memory.record(&table, filters);
        }
    }

    /// Recompute and push, ignoring the refresh mode and the last applied predicate
    pub fn refresh_filters(&mut self) {
        self.last_applied = None;
        self.recompute(true);
    }

    /// Every column's fragment in column order, empty for unfiltered columns
    pub fn get_filters(&self) -> Vec<String> {
        self.bindings.iter().map(FilterBinding::fragment).collect()
    }

    fn apply_filters<S: AsRef<str>>(&mut self, filters: &[S]) {
        self.suspended += 1;
        for (binding, filter) in self.bindings.iter_mut().zip(filters) {
            let filter = filter.as_ref();
            if filter.is_empty() {
                binding.strategy.clear();
            } else {
                binding.strategy.set_filter(filter);
            }
        }
        self.suspended -= 1;
    }

    /// Restore fragments previously returned by [`get_filters`](Self::get_filters)
    pub fn set_filters<S: AsRef<str>>(&mut self, filters: &[S]) {
        self.apply_filters(filters);
        self.discard_widget_events();
        self.recompute(false);
    }

    pub fn clear_filters(&mut self) {
        self.suspended += 1;
        for binding in &mut self.bindings {
            binding.strategy.clear();
        }
        self.suspended -= 1;
        self.discard_widget_events();
        self.recompute(false);
    }

    /// Suspend recomputes until the matching [`end_update`](Self::end_update)
    pub fn begin_update(&mut self) {
        self.suspended += 1;
    }

    pub fn end_update(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
        if self.suspended == 0 {
            self.discard_widget_events();
            self.recompute(false);
        }
    }

    // --- settings ------------------------------------------------------------

    pub fn custom_filter(&self) -> &str {
        &self.custom_filter
    }

    /// Predicate ANDed on top of everything else
    pub fn set_custom_filter(&mut self, filter: impl Into<String>) {
        self.custom_filter = filter.into();
        self.recompute(false);
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn set_operator(&mut self, operator: LogicalOperator) {
        self.operator = operator;
        self.recompute(false);
    }

    /// Base filter of the bound table, empty when none is set
    pub fn base_filter(&self) -> &str {
        self.base_filters
            .get(self.view.table_id())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_base_filter(&mut self, filter: impl Into<String>) {
        let table = self.view.table_id().clone();
        self.set_base_filter_for(table, filter);
    }

    pub fn set_base_filter_for(&mut self, table: impl Into<TableId>, filter: impl Into<String>) {
        let filter = filter.into();
        let table = table.into();
        if filter.trim().is_empty() {
            self.base_filters.remove(&table);
        } else {
            self.base_filters.insert(table, filter);
        }
        self.recompute(false);
    }

    pub fn base_filter_enabled(&self) -> bool {
        self.base_filter_enabled
    }

    pub fn set_base_filter_enabled(&mut self, enabled: bool) {
        self.base_filter_enabled = enabled;
        self.recompute(false);
    }

    pub fn base_filter_operator(&self) -> LogicalOperator {
        self.base_filter_operator
    }

    pub fn set_base_filter_operator(&mut self, operator: LogicalOperator) {
        self.base_filter_operator = operator;
        self.recompute(false);
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.refresh_mode
    }

    pub fn set_refresh_mode(&mut self, mode: RefreshMode) {
        self.refresh_mode = mode;
    }

    pub fn keep_filters(&self) -> bool {
        self.memory.is_enabled()
    }

    pub fn set_keep_filters(&mut self, keep: bool) {
        self.memory.set_enabled(keep);
    }

    pub fn memory(&self) -> &TableFilterMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut TableFilterMemory {
        &mut self.memory
    }

    pub fn reporter_mut(&mut self) -> &mut ErrorReporter {
        &mut self.reporter
    }

    pub fn set_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.reporter.set_sink(sink);
    }

    // --- widget events -------------------------------------------------------

    fn discard_widget_events(&mut self) {
        while self.widget_rx.try_recv().is_ok() {}
    }

    /// Handle every queued widget event according to the refresh mode
    pub fn process_widget_events(&mut self) {
        while let Ok(event) = self.widget_rx.try_recv() {
            self.handle_widget_event(event);
        }
    }

    pub fn handle_widget_event(&mut self, event: WidgetEvent) {
        match self.refresh_mode.decide(&event) {
            RefreshAction::Ignore => trace!("Ignoring {:?}", event),
            RefreshAction::Recompute => self.recompute(false),
            RefreshAction::ForceRefresh => self.refresh_filters(),
        }
    }

    /// Mutate one column's strategy, then handle the widget events it raised
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownColumn` when no strategy is bound to `column`.
    pub fn edit_filter<F>(&mut self, column: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut FilterStrategy),
    {
        let strategy = self
            .filter_mut(column)
            .ok_or_else(|| FilterError::unknown_column(column))?;
        edit(strategy);
        self.process_widget_events();
        Ok(())
    }

    /// Simulate Enter in the column's widget
    pub fn commit(&mut self, column: &str) -> Result<()> {
        let strategy = self
            .filter(column)
            .ok_or_else(|| FilterError::unknown_column(column))?;
        strategy.widget().commit();
        self.process_widget_events();
        Ok(())
    }

    /// Simulate the column's widget losing focus
    pub fn leave(&mut self, column: &str) -> Result<()> {
        let strategy = self
            .filter(column)
            .ok_or_else(|| FilterError::unknown_column(column))?;
        strategy.widget().leave();
        self.process_widget_events();
        Ok(())
    }
}
