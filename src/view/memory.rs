use tracing::debug;

use super::{DataView, compile};
use crate::core::{ColumnDescriptor, TableId, Value};
use crate::error::{FilterError, Result};
use crate::predicate::{Expr, PredicateEvaluator};

/// In-memory view over rows of [`Value`]
#[derive(Debug, Clone)]
pub struct MemoryView {
    table_id: TableId,
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<Value>>,
    predicate: String,
    expr: Option<Expr>,
    visible: Vec<usize>,
    case_sensitive: bool,
    apply_count: usize,
}

impl MemoryView {
    pub fn new(table_id: impl Into<TableId>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table_id: table_id.into(),
            columns,
            rows: Vec::new(),
            predicate: String::new(),
            expr: None,
            visible: Vec::new(),
            case_sensitive: false,
            apply_count: 0,
        }
    }

    pub fn with_rows<R, V>(mut self, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for row in rows {
            self.rows.push(row.into_iter().map(Into::into).collect());
        }
        self.refilter();
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self.refilter();
        self
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
        self.refilter();
    }

    /// Rebind the view to another table, dropping the active predicate
    pub fn set_table(
        &mut self,
        table_id: impl Into<TableId>,
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Vec<Value>>,
    ) {
        self.table_id = table_id.into();
        self.columns = columns;
        self.rows = rows;
        self.predicate.clear();
        self.expr = None;
        self.refilter();
    }

    /// How many predicates have been applied successfully
    pub fn apply_count(&self) -> usize {
        self.apply_count
    }

    /// Rows passing the active predicate, in source order
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.visible.iter().map(|&i| self.rows[i].as_slice())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    fn refilter(&mut self) {
        let Some(expr) = &self.expr else {
            self.visible = (0..self.rows.len()).collect();
            return;
        };
        let evaluator = PredicateEvaluator::new(expr).case_sensitive(self.case_sensitive);
        let columns = &self.columns;
        self.visible = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                let lookup = |name: &str| {
                    columns
                        .iter()
                        .position(|c| c.name == name)
                        .and_then(|i| row.get(i).cloned())
                        .unwrap_or_default()
                };
                evaluator.matches(&lookup)
            })
            .map(|(i, _)| i)
            .collect();
    }
}

impl DataView for MemoryView {
    fn table_id(&self) -> &TableId {
        &self.table_id
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [ColumnDescriptor] {
        &mut self.columns
    }

    fn predicate(&self) -> &str {
        &self.predicate
    }

    fn set_predicate(&mut self, predicate: &str) -> Result<()> {
        let expr = compile(predicate, &self.columns)?;
        self.predicate = predicate.to_string();
        self.expr = expr;
        self.apply_count += 1;
        self.refilter();
        debug!(
            "Applied predicate '{}' to {}: {} of {} rows visible",
            self.predicate,
            self.table_id,
            self.visible.len(),
            self.rows.len()
        );
        Ok(())
    }

    fn column_values(&self, column: &str) -> Result<Box<dyn Iterator<Item = Value> + '_>> {
        let index = self
            .column_index(column)
            .ok_or_else(|| FilterError::unknown_column(column))?;
        Ok(Box::new(
            self.rows
                .iter()
                .map(move |row| row.get(index).cloned().unwrap_or_default()),
        ))
    }

    fn row_count(&self) -> usize {
        self.visible.len()
    }
}
