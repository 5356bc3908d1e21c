//! Combinator driving a polars-backed view.

use std::fs;

use gridfilter::combinator::FilterCombinator;
use gridfilter::core::{CompareOp, ValueKind};
use gridfilter::filters::{FilterStrategy, GridFilter, NumericOperator};
use gridfilter::scanner::{DistinctScan, DistinctValueScanner};
use gridfilter::view::{DataView, FrameView};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MESSAGES_CSV: &str = "\
sender,size,kind,sent
alice,10,sms,2021-03-04
Bob,250,mms,2021-07-01
alina,42,sms,
carol,7,,2022-01-15
";

fn write_csv(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("messages.csv");
    fs::write(&path, MESSAGES_CSV).unwrap();
    path
}

#[test]
fn csv_columns_and_table_identity() {
    let dir = TempDir::new().unwrap();
    let view = FrameView::from_csv(&write_csv(&dir)).unwrap();
    assert_eq!(view.table_id().as_str(), "messages");
    assert_eq!(view.row_count(), 4);

    let kinds: Vec<(String, ValueKind)> = view
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.kind))
        .collect();
    assert_eq!(kinds[0], ("sender".to_string(), ValueKind::Text));
    assert_eq!(kinds[1], ("size".to_string(), ValueKind::Number));
    assert_eq!(kinds[3], ("sent".to_string(), ValueKind::Date));
}

#[test]
fn column_filters_reduce_the_frame() {
    let dir = TempDir::new().unwrap();
    let view = FrameView::from_csv(&write_csv(&dir)).unwrap();
    let mut combinator = FilterCombinator::new(view);

    combinator
        .edit_filter("size", |strategy| {
            if let FilterStrategy::Numeric(numeric) = strategy {
                numeric.set_parts(NumericOperator::Compare(CompareOp::Gt), "9".into(), String::new());
            }
        })
        .unwrap();
    combinator
        .edit_filter("sender", |strategy| strategy.set_filter("[sender] LIKE 'ali*'"))
        .unwrap();

    assert_eq!(
        combinator.view().predicate(),
        "([sender] LIKE 'ali*') AND ([size] > 9)"
    );
    let filtered = combinator.view().filtered_frame().unwrap();
    assert_eq!(filtered.height(), 2);
    let sizes: Vec<Option<i64>> = filtered.column("size").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(sizes, vec![Some(10), Some(42)]);
}

#[test]
fn date_filter_on_parsed_dates() {
    let dir = TempDir::new().unwrap();
    let view = FrameView::from_csv(&write_csv(&dir)).unwrap();
    let mut combinator = FilterCombinator::new(view);
    combinator
        .edit_filter("sent", |strategy| strategy.set_filter("[sent] >= #06/01/2021#"))
        .unwrap();
    assert_eq!(combinator.view().row_count(), 2);
}

#[test]
fn case_sensitivity_is_a_view_setting() {
    let frame = df!(
        "sender" => ["Bob", "bobby", "alice"],
    )
    .unwrap();

    let mut insensitive = FrameView::new("people", frame.clone());
    insensitive.set_predicate("[sender] LIKE 'bob*'").unwrap();
    assert_eq!(insensitive.row_count(), 2);

    let mut sensitive = FrameView::new("people", frame).with_case_sensitive(true);
    sensitive.set_predicate("[sender] LIKE 'bob*'").unwrap();
    assert_eq!(sensitive.row_count(), 1);
}

#[test]
fn distinct_scan_over_frame_column() {
    let frame = df!(
        "kind" => [Some("sms"), None, Some("mms"), Some("sms")],
    )
    .unwrap();
    let view = FrameView::new("messages", frame);
    let scan = DistinctValueScanner::new(Some(10)).scan(&view, "kind").unwrap();
    assert_eq!(
        scan,
        DistinctScan::Values {
            values: vec!["sms".to_string(), "mms".to_string()],
            contains_null: true,
        }
    );
}

#[test]
fn malformed_predicate_leaves_frame_untouched() {
    let frame = df!("size" => [1i64, 2, 3]).unwrap();
    let mut view = FrameView::new("numbers", frame);
    view.set_predicate("[size] > 1").unwrap();

    let err = view.set_predicate("[size] >").unwrap_err();
    assert!(err.is_malformed_expression());
    assert_eq!(view.predicate(), "[size] > 1");
    assert_eq!(view.row_count(), 2);
}
