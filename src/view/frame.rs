use std::path::Path;

use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

use super::{DataView, compile};
use crate::core::{ColumnDescriptor, TableId, Value, ValueKind};
use crate::error::{FilterError, Result};
use crate::predicate::{Expr, PredicateEvaluator};

/// Days from 0001-01-01 (CE) to the Unix epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// View over a polars `DataFrame`, filtered row-wise
#[derive(Debug, Clone)]
pub struct FrameView {
    table_id: TableId,
    df: DataFrame,
    columns: Vec<ColumnDescriptor>,
    predicate: String,
    expr: Option<Expr>,
    mask: Vec<bool>,
    case_sensitive: bool,
}

impl FrameView {
    /// Wrap a frame, deriving one column descriptor per frame column
    pub fn new(table_id: impl Into<TableId>, df: DataFrame) -> Self {
        let columns = describe_columns(&df);
        let mask = vec![true; df.height()];
        Self {
            table_id: table_id.into(),
            df,
            columns,
            predicate: String::new(),
            expr: None,
            mask,
            case_sensitive: false,
        }
    }

    /// Load a CSV file with a header row; the file stem becomes the table identity
    pub fn from_csv(path: &Path) -> Result<Self> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_try_parse_dates(true)
            .finish()?
            .collect()?;
        let table_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(TableId::new(table_id), df))
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Materialise the rows passing the active predicate
    pub fn filtered_frame(&self) -> Result<DataFrame> {
        let mask = BooleanChunked::new("mask".into(), &self.mask);
        Ok(self.df.filter(&mask)?)
    }

    fn evaluate(&self, expr: &Expr) -> Result<Vec<bool>> {
        let mut referenced: Vec<(&str, &Column)> = Vec::new();
        for name in expr.columns() {
            referenced.push((name, self.df.column(name)?));
        }
        let evaluator = PredicateEvaluator::new(expr).case_sensitive(self.case_sensitive);

        let mask = (0..self.df.height())
            .map(|row| {
                let lookup = |name: &str| {
                    referenced
                        .iter()
                        .find(|(n, _)| *n == name)
                        .and_then(|(_, column)| column.get(row).ok())
                        .map(|av| any_value_to_value(&av))
                        .unwrap_or_default()
                };
                evaluator.matches(&lookup)
            })
            .collect();
        Ok(mask)
    }
}

impl DataView for FrameView {
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
        let mask = match &expr {
            Some(expr) => self.evaluate(expr)?,
            None => vec![true; self.df.height()],
        };
        self.predicate = predicate.to_string();
        self.expr = expr;
        self.mask = mask;
        debug!(
            "Applied predicate '{}' to {}: {} of {} rows visible",
            self.predicate,
            self.table_id,
            self.row_count(),
            self.df.height()
        );
        Ok(())
    }

    fn column_values(&self, column: &str) -> Result<Box<dyn Iterator<Item = Value> + '_>> {
        let column = self
            .df
            .column(column)
            .map_err(|_| FilterError::unknown_column(column))?;
        Ok(Box::new((0..column.len()).map(move |row| {
            column
                .get(row)
                .map(|av| any_value_to_value(&av))
                .unwrap_or_default()
        })))
    }

    fn row_count(&self) -> usize {
        self.mask.iter().filter(|visible| **visible).count()
    }
}

fn describe_columns(df: &DataFrame) -> Vec<ColumnDescriptor> {
    df.get_columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            ColumnDescriptor::new(column.name().as_str(), dtype_kind(column.dtype()))
                .with_display_index(index)
        })
        .collect()
}

/// Value kind a frame column is filtered as
pub fn dtype_kind(dtype: &DataType) -> ValueKind {
    match dtype {
        DataType::Boolean => ValueKind::Boolean,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ValueKind::Number,
        DataType::Date | DataType::Datetime(_, _) => ValueKind::Date,
        _ => ValueKind::Text,
    }
}

/// Convert a polars cell into the engine's value model
pub fn any_value_to_value(av: &AnyValue) -> Value {
    match av {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        AnyValue::UInt8(n) => Value::Number((*n).into()),
        AnyValue::UInt16(n) => Value::Number((*n).into()),
        AnyValue::UInt32(n) => Value::Number((*n).into()),
        AnyValue::UInt64(n) => Value::Number((*n).into()),
        AnyValue::Int8(n) => Value::Number((*n).into()),
        AnyValue::Int16(n) => Value::Number((*n).into()),
        AnyValue::Int32(n) => Value::Number((*n).into()),
        AnyValue::Int64(n) => Value::Number((*n).into()),
        AnyValue::Float32(n) => Decimal::from_f32(*n).map(Value::Number).unwrap_or_default(),
        AnyValue::Float64(n) => Decimal::from_f64(*n).map(Value::Number).unwrap_or_default(),
        AnyValue::Date(days) => NaiveDate::from_num_days_from_ce_opt(*days + UNIX_EPOCH_DAYS_FROM_CE)
            .map(Value::Date)
            .unwrap_or_default(),
        AnyValue::Datetime(ts, unit, _) => datetime_date(*ts, *unit),
        AnyValue::DatetimeOwned(ts, unit, _) => datetime_date(*ts, *unit),
        other => Value::Text(other.str_value().to_string()),
    }
}

fn datetime_date(ts: i64, unit: TimeUnit) -> Value {
    let micros = match unit {
        TimeUnit::Nanoseconds => ts / 1_000,
        TimeUnit::Microseconds => ts,
        TimeUnit::Milliseconds => ts.saturating_mul(1_000),
    };
    DateTime::from_timestamp_micros(micros)
        .map(|dt| Value::Date(dt.date_naive()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "sender" => ["alice", "bob", "alina"],
            "size" => [10i64, 250, 42],
            "read" => [true, false, true],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_follow_dtypes() {
        let view = FrameView::new("inbox", frame());
        let kinds: Vec<ValueKind> = view.columns().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ValueKind::Text, ValueKind::Number, ValueKind::Boolean]);
        assert_eq!(view.columns()[2].display_index, 2);
    }

    #[test]
    fn test_predicate_filters_frame() {
        let mut view = FrameView::new("inbox", frame());
        view.set_predicate("([sender] LIKE 'ali*') AND ([size] > 20)").unwrap();
        assert_eq!(view.row_count(), 1);
        let filtered = view.filtered_frame().unwrap();
        assert_eq!(filtered.height(), 1);
        let sender = filtered.column("sender").unwrap().get(0).unwrap();
        assert_eq!(any_value_to_value(&sender), Value::text("alina"));
    }

    #[test]
    fn test_any_value_mapping() {
        assert_eq!(any_value_to_value(&AnyValue::Int32(7)), Value::from(7));
        assert_eq!(any_value_to_value(&AnyValue::Null), Value::Null);
        assert_eq!(
            any_value_to_value(&AnyValue::Date(0)),
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
    }
}
