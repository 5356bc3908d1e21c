//! Distinct-value enumeration for a single column.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::view::DataView;

/// Outcome of a distinct-value scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistinctScan {
    /// Stringified distinct values in first-seen order
    Values {
        values: Vec<String>,
        contains_null: bool,
    },
    /// The column holds more distinct values than the cap allows
    Unavailable,
}

impl DistinctScan {
    pub fn is_available(&self) -> bool {
        matches!(self, DistinctScan::Values { .. })
    }
}

/// Collects the distinct values of a column, bounded by an optional cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistinctValueScanner {
    max_values: Option<usize>,
}

impl DistinctValueScanner {
    pub fn new(max_values: Option<usize>) -> Self {
        Self { max_values }
    }

    pub fn unbounded() -> Self {
        Self { max_values: None }
    }

    pub fn max_values(&self) -> Option<usize> {
        self.max_values
    }

    /// Scan every source row's value of `column` once.
    ///
    /// Stops early with [`DistinctScan::Unavailable`] as soon as the number of
    /// distinct non-null values exceeds the cap. Nulls are recorded separately
    /// and never count towards it.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownColumn` when the view has no such column.
    pub fn scan<V: DataView + ?Sized>(&self, view: &V, column: &str) -> Result<DistinctScan> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        let mut contains_null = false;

        for value in view.column_values(column)? {
            let Some(text) = value.to_display_string() else {
                contains_null = true;
                continue;
            };
            if seen.insert(text.clone()) {
                values.push(text);
                if self.max_values.is_some_and(|max| values.len() > max) {
                    debug!(
                        "Column '{}' of {} exceeds {} distinct values",
                        column,
                        view.table_id(),
                        values.len() - 1
                    );
                    return Ok(DistinctScan::Unavailable);
                }
            }
        }

        Ok(DistinctScan::Values {
            values,
            contains_null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnDescriptor, Value, ValueKind};
    use crate::error::FilterError;
    use crate::view::MemoryView;

    fn view(distinct: usize) -> MemoryView {
        let mut rows: Vec<Vec<Value>> = (0..distinct)
            .map(|i| vec![Value::text(format!("v{i:03}"))])
            .collect();
        rows.push(vec![Value::Null]);
        rows.push(vec![Value::text("v000")]);
        MemoryView::new("t", vec![ColumnDescriptor::new("c", ValueKind::Enumerable)]).with_rows(rows)
    }

    #[test]
    fn test_cap_exceeded_is_unavailable() {
        let scan = DistinctValueScanner::new(Some(100)).scan(&view(101), "c").unwrap();
        assert_eq!(scan, DistinctScan::Unavailable);
    }

    #[test]
    fn test_values_within_cap() {
        let scan = DistinctValueScanner::new(Some(200)).scan(&view(101), "c").unwrap();
        match scan {
            DistinctScan::Values {
                values,
                contains_null,
            } => {
                assert_eq!(values.len(), 101);
                assert_eq!(values[0], "v000");
                assert!(contains_null);
            }
            DistinctScan::Unavailable => panic!("expected values"),
        }
    }

    #[test]
    fn test_exactly_at_cap_is_available() {
        let scan = DistinctValueScanner::new(Some(5)).scan(&view(5), "c").unwrap();
        assert!(scan.is_available());
    }

    #[test]
    fn test_first_seen_order_and_no_nulls() {
        let view = MemoryView::new("t", vec![ColumnDescriptor::new("n", ValueKind::Number)])
            .with_rows(vec![vec![Value::from(3)], vec![Value::from(1)], vec![Value::from(3)]]);
        let scan = DistinctValueScanner::unbounded().scan(&view, "n").unwrap();
        assert_eq!(
            scan,
            DistinctScan::Values {
                values: vec!["3".to_string(), "1".to_string()],
                contains_null: false,
            }
        );
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let result = DistinctValueScanner::unbounded().scan(&view(1), "missing");
        assert!(matches!(result, Err(FilterError::UnknownColumn { .. })));
    }
}
