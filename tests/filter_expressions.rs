use tabular_analyze::expr::{compile, parse_expr, CompareOp, Expr, ExprError, Literal};
use tabular_analyze::ingestion::{ingest_from_path, IngestionOptions};
use tabular_analyze::processing::filter_summary;
use tabular_analyze::types::DataSet;

fn orders() -> DataSet {
    ingest_from_path("tests/fixtures/orders.csv", &IngestionOptions::default()).unwrap()
}

fn matching_ids(ds: &DataSet, condition: &str) -> Vec<String> {
    let predicate = compile(condition, &ds.schema).unwrap();
    ds.rows
        .iter()
        .zip(predicate.mask(ds))
        .filter(|(_, keep)| *keep)
        .map(|(row, _)| row[0].to_string())
        .collect()
}

fn col(name: &str) -> Box<Expr> {
    Box::new(Expr::Column { name: name.into() })
}

fn lit(value: Literal) -> Box<Expr> {
    Box::new(Expr::Literal { value })
}

#[test]
fn and_binds_tighter_than_or() {
    let expr = parse_expr("a > 1 or b == 'x' and c").unwrap();
    assert_eq!(
        expr,
        Expr::Or {
            left: Box::new(Expr::Compare {
                left: col("a"),
                op: CompareOp::Gt,
                right: lit(Literal::Int(1)),
            }),
            right: Box::new(Expr::And {
                left: Box::new(Expr::Compare {
                    left: col("b"),
                    op: CompareOp::Eq,
                    right: lit(Literal::Str("x".into())),
                }),
                right: col("c"),
            }),
        }
    );
}

#[test]
fn parentheses_and_not_change_grouping() {
    let ds = orders();
    assert_eq!(
        matching_ids(&ds, "not (region == 'north' or region == 'south')"),
        vec!["1004", "1007", "1008"]
    );
    assert_eq!(
        matching_ids(&ds, "(region == 'east' or region == 'west') and units >= 7"),
        vec!["1004", "1008"]
    );
}

#[test]
fn missing_values_only_satisfy_not_equal() {
    let ds = orders();
    assert_eq!(matching_ids(&ds, "units == 4"), vec!["1001", "1006"]);
    assert_eq!(matching_ids(&ds, "units != 4").len(), 6);
    assert!(matching_ids(&ds, "product == ''").is_empty());
}

#[test]
fn integer_columns_compare_against_float_literals() {
    let ds = orders();
    assert_eq!(matching_ids(&ds, "units > 6.5"), vec!["1004", "1008"]);
    assert_eq!(matching_ids(&ds, "`unit price` == 10"), vec!["1002", "1005"]);
}

#[test]
fn mismatched_types_match_nothing() {
    let ds = orders();
    assert!(matching_ids(&ds, "region > 3").is_empty());
    assert!(matching_ids(&ds, "units == 'four'").is_empty());
}

#[test]
fn strings_compare_lexically() {
    let ds = orders();
    assert_eq!(matching_ids(&ds, "region < 'north'"), vec!["1004", "1008"]);
}

#[test]
fn boolean_columns_can_stand_alone() {
    let ds = orders();
    assert_eq!(
        matching_ids(&ds, "shipped and units > 3"),
        vec!["1001", "1006", "1008"]
    );
}

#[test]
fn compile_errors_are_reported_before_evaluation() {
    let ds = orders();
    assert!(matches!(
        compile("region == 'north' and qty > 1", &ds.schema),
        Err(ExprError::UnknownColumn { .. })
    ));
    assert!(matches!(compile("region", &ds.schema), Err(ExprError::NotBoolean { .. })));
    assert!(matches!(compile("1 < units < 5", &ds.schema), Err(ExprError::Parse(_))));
    assert!(matches!(compile("", &ds.schema), Err(ExprError::Parse(_))));
    assert!(matches!(
        compile("units > (a == 1)", &ds.schema),
        Err(ExprError::InvalidOperand { .. })
    ));
}

#[test]
fn only_declared_syntax_is_accepted() {
    let ds = orders();
    for condition in ["__import__('os')", "units ** 2 > 4", "units + 1 > 2", "region.str.len() > 0"] {
        assert!(compile(condition, &ds.schema).is_err(), "{condition} should not compile");
    }
}

#[test]
fn filter_summary_samples_leading_matches() {
    let ds = orders();
    let predicate = compile("order_id > 0", &ds.schema).unwrap();
    let summary = filter_summary(&ds, &predicate, 5);
    assert_eq!(summary.matching_rows, 8);
    assert_eq!(summary.percentage, 100.0);
    assert_eq!(summary.sample.len(), 5);
    assert_eq!(summary.sample[0], ds.rows[0]);
}
