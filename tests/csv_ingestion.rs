use chrono::NaiveDate;
use tabular_analyze::ingestion::csv::{
    ingest_csv_from_path, ingest_csv_from_reader, ingest_csv_inferred_from_path,
    ingest_csv_inferred_from_reader,
};
use tabular_analyze::types::{DataType, Field, Schema, Value};

fn people_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

#[test]
fn ingest_csv_from_path_happy_path() {
    let schema = people_schema();
    let ds = ingest_csv_from_path("tests/fixtures/people.csv", &schema).unwrap();

    assert_eq!(ds.row_count(), 2);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(1),
            Value::Utf8("Ada".to_string()),
            Value::Float64(98.5),
            Value::Bool(true),
        ]
    );
}

#[test]
fn ingest_csv_allows_reordered_columns() {
    let schema = people_schema();
    let input = "name,id,active,score\nAda,1,true,98.5\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let ds = ingest_csv_from_reader(&mut rdr, &schema).unwrap();
    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.rows[0][0], Value::Int64(1));
    assert_eq!(ds.rows[0][1], Value::Utf8("Ada".to_string()));
}

#[test]
fn ingest_csv_errors_on_missing_required_column() {
    let schema = people_schema();
    let input = "id,name,score\n1,Ada,98.5\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &schema).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("missing required column 'active'"));
}

#[test]
fn ingest_csv_errors_on_type_parse() {
    let schema = people_schema();
    let input = "id,name,score,active\nnot_an_int,Ada,98.5,true\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &schema).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("failed to parse value"));
    assert!(msg.contains("column 'id'"));
}

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes())
}

#[test]
fn inferred_csv_picks_column_types() {
    let ds = ingest_csv_inferred_from_path("tests/fixtures/orders.csv").unwrap();
    let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Int64,
            DataType::Utf8,
            DataType::Utf8,
            DataType::Int64,
            DataType::Float64,
            DataType::Bool,
            DataType::DateTime,
        ]
    );
    assert_eq!(ds.schema.fields[4].name, "unit price");
    assert_eq!(ds.row_count(), 8);
    assert_eq!(ds.rows[2][3], Value::Null);
    assert_eq!(ds.rows[6][2], Value::Null);
    assert_eq!(
        ds.rows[0][6],
        Value::DateTime(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(0, 0, 0).unwrap())
    );
}

#[test]
fn inferred_csv_widens_mixed_numbers_and_falls_back_to_text() {
    let ds = ingest_csv_inferred_from_reader(&mut reader("a,b,c\n1,x,\n2.5,3,\n")).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
    assert_eq!(ds.rows[0][0], Value::Float64(1.0));
    assert_eq!(ds.schema.fields[1].data_type, DataType::Utf8);
    assert_eq!(ds.rows[1][1], Value::Utf8("3".to_string()));
    assert_eq!(ds.schema.fields[2].data_type, DataType::Null);
}

#[test]
fn inferred_csv_rejects_duplicate_headers() {
    let err = ingest_csv_inferred_from_reader(&mut reader("id,name,id\n1,a,2\n")).unwrap_err();
    assert!(err.to_string().contains("duplicate column 'id'"));
}

#[test]
fn inferred_csv_with_only_headers_is_empty() {
    let ds = ingest_csv_inferred_from_reader(&mut reader("id,name\n")).unwrap();
    assert_eq!(ds.row_count(), 0);
    assert_eq!(ds.schema.column_names(), vec!["id", "name"]);
    assert_eq!(ds.schema.fields[0].data_type, DataType::Null);
}

#[test]
fn missing_value_markers_read_as_null() {
    let ds = ingest_csv_inferred_from_reader(&mut reader("id,score\n1,NaN\n2,4.5\n3,N/A\n4,null\n"))
        .unwrap();
    assert_eq!(ds.schema.fields[1].data_type, DataType::Float64);
    let scores: Vec<Value> = ds.rows.iter().map(|r| r[1].clone()).collect();
    assert_eq!(
        scores,
        vec![Value::Null, Value::Float64(4.5), Value::Null, Value::Null]
    );

    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("score", DataType::Float64),
    ]);
    let ds = ingest_csv_from_reader(&mut reader("id,score\nNA,nan\n2,inf\n"), &schema).unwrap();
    assert_eq!(ds.rows[0], vec![Value::Null, Value::Null]);
    assert_eq!(ds.rows[1][1], Value::Float64(f64::INFINITY));
}
