//! Data views the filter engine pushes predicates into.
//!
//! A view owns the rows, publishes column metadata and re-filters itself when
//! handed a new predicate. Two views are bundled: [`MemoryView`] over plain
//! rows of [`Value`] and [`FrameView`] over a polars `DataFrame`.

mod frame;
mod memory;

pub use frame::FrameView;
pub use memory::MemoryView;

use crate::core::{ColumnDescriptor, TableId, Value};
use crate::error::{FilterError, Result};
use crate::predicate::{Expr, PredicateError, PredicateParser};

/// Row source bound to a grid: holds the active predicate and enumerates column values.
pub trait DataView {
    /// Logical identity of the bound table.
    fn table_id(&self) -> &TableId;

    fn columns(&self) -> &[ColumnDescriptor];

    /// Mutable column metadata, used to mirror visibility, order and width changes.
    fn columns_mut(&mut self) -> &mut [ColumnDescriptor];

    /// The predicate currently applied, empty when unrestricted.
    fn predicate(&self) -> &str;

    /// Apply a predicate and re-filter the rows.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MalformedExpression` when the predicate does not
    /// parse or names an unknown column. The previous predicate stays active.
    fn set_predicate(&mut self, predicate: &str) -> Result<()>;

    /// Every source row's value for `column`, regardless of the active predicate.
    fn column_values(&self, column: &str) -> Result<Box<dyn Iterator<Item = Value> + '_>>;

    /// Number of rows passing the active predicate.
    fn row_count(&self) -> usize;

    fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns().iter().find(|c| c.name == name)
    }
}

/// Parse a predicate and check it only references known columns.
///
/// Blank input compiles to `None`, meaning every row passes.
pub(crate) fn compile(predicate: &str, columns: &[ColumnDescriptor]) -> Result<Option<Expr>> {
    if predicate.trim().is_empty() {
        return Ok(None);
    }
    let expr =
        PredicateParser::parse(predicate).map_err(|e| FilterError::malformed(predicate, e))?;
    if let Some(unknown) = expr
        .columns()
        .into_iter()
        .find(|name| !columns.iter().any(|c| c.name == *name))
    {
        return Err(FilterError::malformed(
            predicate,
            PredicateError::UnknownColumn {
                name: unknown.to_string(),
            },
        ));
    }
    Ok(Some(expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueKind;

    #[test]
    fn test_compile_rejects_unknown_columns() {
        let columns = vec![ColumnDescriptor::new("a", ValueKind::Number)];
        assert!(compile("  ", &columns).unwrap().is_none());
        assert!(compile("[a] > 1", &columns).unwrap().is_some());
        let err = compile("[b] > 1", &columns).unwrap_err();
        assert!(err.is_malformed_expression());
        assert!(err.to_string().contains("unknown column: b"));
    }
}
