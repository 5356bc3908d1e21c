//! Every strategy parses back the fragments it produces, and the bundled
//! views accept those fragments.

use gridfilter::core::{ColumnDescriptor, CompareOp, TriState, Value, ValueKind};
use gridfilter::filters::{
    BooleanFilter, Choice, DateFilter, DateOperator, DistinctValuesFilter, GridFilter,
    NumericFilter, NumericOperator, PresenceFilter, TextFilter,
};
use gridfilter::view::{DataView, MemoryView};
use pretty_assertions::assert_eq;

fn formats() -> Vec<String> {
    vec!["%Y-%m-%d".to_string(), "%m/%d/%Y".to_string()]
}

fn messages() -> MemoryView {
    MemoryView::new(
        "messages",
        vec![
            ColumnDescriptor::new("sender", ValueKind::Text),
            ColumnDescriptor::new("size", ValueKind::Number),
            ColumnDescriptor::new("sent", ValueKind::Date),
            ColumnDescriptor::new("read", ValueKind::Boolean),
            ColumnDescriptor::new("kind", ValueKind::Enumerable),
        ],
    )
    .with_rows(vec![
        vec![
            Value::text("smith"),
            Value::from(12),
            Value::text("2021-03-04").convert(ValueKind::Date).unwrap_or(Value::Null),
            Value::from(true),
            Value::text("sms"),
        ],
        vec![
            Value::text("O'Brien"),
            Value::from(125),
            Value::Null,
            Value::from(false),
            Value::Null,
        ],
        vec![
            Value::text("jones"),
            Value::from(3),
            Value::text("2022-12-31").convert(ValueKind::Date).unwrap_or(Value::Null),
            Value::Null,
            Value::text("mms"),
        ],
    ])
}

/// Apply `fragment` to the sample view and return the matching row count
fn matching(fragment: &str) -> usize {
    let mut view = messages();
    view.set_predicate(fragment).unwrap();
    view.row_count()
}

#[test]
fn text_round_trip() {
    let mut filter = TextFilter::new();
    filter.set_input("O'Br");
    let fragment = filter.get_filter("[sender]");
    assert_eq!(fragment, "[sender] LIKE 'O''Br*'");

    let mut restored = TextFilter::new();
    restored.set_filter(&fragment);
    assert_eq!(restored.input(), "O'Br");
    assert_eq!(matching(&fragment), 1);
}

#[test]
fn numeric_round_trips() {
    let cases = [
        (NumericOperator::Compare(CompareOp::Ge), "12", "", 2),
        (NumericOperator::Compare(CompareOp::Ne), "3", "", 2),
        (NumericOperator::Wildcard, "12", "", 2),
        (NumericOperator::Between, "1", "5", 1),
        (NumericOperator::Between, "", "12", 2),
        (NumericOperator::Between, "100", "", 1),
    ];
    for (operator, first, second, expected_rows) in cases {
        let mut filter = NumericFilter::new(true);
        filter.set_parts(operator, first.to_string(), second.to_string());
        let fragment = filter.get_filter("[size]");

        let mut restored = NumericFilter::new(true);
        restored.set_filter(&fragment);
        assert_eq!(restored.operator(), operator, "{fragment}");
        assert_eq!(restored.first(), first, "{fragment}");
        assert_eq!(restored.second(), second, "{fragment}");
        assert_eq!(restored.get_filter("[size]"), fragment);
        assert_eq!(matching(&fragment), expected_rows, "{fragment}");
    }
}

#[test]
fn numeric_between_bounds() {
    let mut filter = NumericFilter::new(true);
    filter.set_parts(NumericOperator::Between, "1".into(), "5".into());
    assert_eq!(filter.get_filter("[c]"), "[c] >= 1 AND [c] <= 5");

    filter.set_parts(NumericOperator::Between, "2".into(), String::new());
    assert_eq!(
        filter.get_filter("[c]"),
        format!("[c] >= 2 AND [c] <= {}", rust_decimal::Decimal::MAX)
    );
}

#[test]
fn unparsable_number_rejects_everything() {
    let mut filter = NumericFilter::new(false);
    filter.set_parts(NumericOperator::Compare(CompareOp::Eq), "abc".into(), String::new());
    let fragment = filter.get_filter("[size]");
    assert_eq!(fragment, "[size] = false");
    assert_eq!(matching(&fragment), 0);
}

#[test]
fn date_round_trips() {
    let cases = [
        (DateOperator::Compare(CompareOp::Eq), "2021-03-04", "", 1),
        (DateOperator::Compare(CompareOp::Gt), "2021-03-04", "", 1),
        (DateOperator::Between, "2021-01-01", "2021-12-31", 1),
        (DateOperator::Between, "", "2023-01-01", 2),
    ];
    for (operator, first, second, expected_rows) in cases {
        let mut filter = DateFilter::new(true, formats());
        filter.set_parts(Some(operator), first.to_string(), second.to_string());
        let fragment = filter.get_filter("[sent]");

        let mut restored = DateFilter::new(true, formats());
        restored.set_filter(&fragment);
        assert_eq!(restored.operator(), Some(operator), "{fragment}");
        assert_eq!(restored.first(), first, "{fragment}");
        assert_eq!(restored.second(), second, "{fragment}");
        assert_eq!(matching(&fragment), expected_rows, "{fragment}");
    }
}

#[test]
fn date_input_formats_are_restored_as_iso() {
    let mut filter = DateFilter::new(false, formats());
    filter.set_parts(Some(DateOperator::Compare(CompareOp::Le)), "03/04/2021".into(), String::new());
    let fragment = filter.get_filter("[sent]");
    assert_eq!(fragment, "[sent] <= #03/04/2021#");

    let mut restored = DateFilter::new(false, formats());
    restored.set_filter(&fragment);
    assert_eq!(restored.first(), "2021-03-04");
}

#[test]
fn boolean_round_trip() {
    for (state, expected_rows) in [(TriState::True, 1), (TriState::False, 1)] {
        let mut filter = BooleanFilter::new();
        filter.set_state(state);
        let fragment = filter.get_filter("[read]");

        let mut restored = BooleanFilter::new();
        restored.set_filter(&fragment);
        assert_eq!(restored.state(), state);
        assert_eq!(matching(&fragment), expected_rows);
    }
    assert_eq!(BooleanFilter::new().get_filter("[read]"), "");
}

#[test]
fn presence_scenario() {
    let mut filter = PresenceFilter::new();
    filter.set_is_null();
    let is_null = filter.get_filter("[sent]");
    filter.clear();
    let cleared = filter.get_filter("[sent]");
    filter.set_has_value();
    let has_value = filter.get_filter("[sent]");

    assert_eq!(cleared, "");
    assert_ne!(is_null, has_value);
    assert_eq!(matching(&is_null), 1);
    assert_eq!(matching(&has_value), 2);

    let mut restored = PresenceFilter::new();
    restored.set_filter(&is_null);
    assert_eq!(restored.get_filter("[sent]"), is_null);
    restored.set_filter(&has_value);
    assert_eq!(restored.get_filter("[sent]"), has_value);
}

#[test]
fn distinct_round_trip() {
    let values = vec!["sms".to_string(), "mms".to_string()];
    let mut filter = DistinctValuesFilter::new(values.clone(), true);
    assert_eq!(
        filter.choices(),
        vec![
            Choice::NoFilter,
            Choice::Null,
            Choice::Value("mms".into()),
            Choice::Value("sms".into()),
        ]
    );

    for (choice, expected_rows) in [(Choice::Value("sms".into()), 1), (Choice::Null, 1)] {
        assert!(filter.select(choice.clone()));
        let fragment = filter.get_filter("[kind]");

        let mut restored = DistinctValuesFilter::new(values.clone(), true);
        restored.set_filter(&fragment);
        assert_eq!(restored.selection(), choice);
        assert_eq!(matching(&fragment), expected_rows, "{fragment}");
    }
}
