//! File-writing sinks and export comparison.

use std::fs;

use aou_load::{CsvSink, LoadError, RecordSink, SqlScriptSink, TableName, compare, read_export};
use aou_model::OutputRecord;

const COLUMNS: &[&str] = &["PMI ID", "Last Name", "Active Retention Date"];

fn row(values: [&str; 3]) -> OutputRecord {
    COLUMNS.iter().copied().zip(values).collect()
}

#[test]
fn csv_sink_round_trips_through_compare() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports").join("healthpro.csv");
    let table = TableName::parse("dm_aou.dbo.healthpro").unwrap();
    let records = vec![
        row(["P1", "Smith, Jr.", "2024-01-02"]),
        row(["P2", "Quote \"Q\"", ""]),
    ];

    let summary = CsvSink::new(&path).load(&table, COLUMNS, &records).unwrap();
    assert_eq!(summary.sink, "csv");
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.table, "[dm_aou].[dbo].[healthpro]");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("PMI ID,Last Name,Active Retention Date\n"));

    let reread = read_export(&path).unwrap();
    assert_eq!(reread, records);
    assert!(compare(&records, &reread).is_identical());
}

#[test]
fn sql_sink_writes_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("healthpro.sql");
    let table = TableName::parse("dm_aou.dbo.healthpro").unwrap();
    let mut sink = SqlScriptSink::new(&path).ensure_columns(["Active Retention Date"]);

    let summary = sink
        .load(&table, COLUMNS, &[row(["P1", "Doe", ""])])
        .unwrap();
    assert_eq!(summary.sink, "sql");

    let script = fs::read_to_string(&path).unwrap();
    assert!(script.contains("IF COL_LENGTH(N'[dm_aou].[dbo].[healthpro]', N'Active Retention Date') IS NULL"));
    assert!(script.contains("(N'P1', N'Doe', N'')"));
    assert!(script.trim_end().ends_with("COMMIT TRANSACTION;"));
}

#[test]
fn sinks_work_through_trait_objects() {
    let dir = tempfile::tempdir().unwrap();
    let table = TableName::parse("hp").unwrap();
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![
        Box::new(CsvSink::new(dir.path().join("hp.csv"))),
        Box::new(SqlScriptSink::new(dir.path().join("hp.sql"))),
    ];
    let records = vec![row(["P1", "Doe", ""])];

    let names: Vec<_> = sinks
        .iter_mut()
        .map(|sink| sink.load(&table, COLUMNS, &records).unwrap().sink)
        .collect();
    assert_eq!(names, vec!["csv", "sql"]);
}

#[test]
fn compare_reports_changed_columns() {
    let left = vec![
        row(["P1", "Smith", "2024-01-02"]),
        row(["P2", "Jones", ""]),
        row(["P3", "Gone", ""]),
    ];
    let right = vec![
        row(["P2", "Jones", "2024-02-10"]),
        row(["P1", "Smith", "2024-01-02"]),
        row(["P4", "New", ""]),
    ];

    let comparison = compare(&left, &right);
    assert_eq!(comparison.matched, 2);
    assert_eq!(comparison.only_left, vec!["P3"]);
    assert_eq!(comparison.only_right, vec!["P4"]);
    assert_eq!(comparison.differing.len(), 1);

    let diff = &comparison.differing[0];
    assert_eq!(diff.pmi_id, "P2");
    assert_eq!(diff.changes.len(), 1);
    assert_eq!(diff.changes[0].column, "Active Retention Date");
    assert_eq!(diff.changes[0].left, "");
    assert_eq!(diff.changes[0].right, "2024-02-10");
}

#[test]
fn compare_ignores_columns_missing_on_one_side() {
    let left: Vec<OutputRecord> = vec![[("PMI ID", "P1"), ("Old Column", "a")].into_iter().collect()];
    let right: Vec<OutputRecord> = vec![[("PMI ID", "P1"), ("New Column", "b")].into_iter().collect()];
    assert!(compare(&left, &right).is_identical());
}

#[test]
fn read_export_requires_pmi_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Participant,Last Name\nP1,Doe\n").unwrap();

    let err = read_export(&path).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "PMI ID"));
}
