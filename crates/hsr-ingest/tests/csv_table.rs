use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use hsr_ingest::{IngestError, column_strings, read_csv_frame, read_csv_table};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("hsr_ingest_table_{name}_{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn reads_table_and_pads_short_rows() {
    let path = temp_file("test.csv", "\u{feff}Id, Student  Email ,Date\n1,a@x.edu\n\n2,b@x.edu,01/02/2024\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["Id", "Student Email", "Date"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], vec!["1", "a@x.edu", ""]);
    assert_eq!(table.rows[1], vec!["2", "b@x.edu", "01/02/2024"]);
    cleanup(&path);
}

#[test]
fn empty_cells_become_nulls() {
    let path = temp_file("nulls.csv", "Id,Major\n1,\n2,Biology\n");
    let df = read_csv_frame(&path, &BTreeMap::new()).expect("read frame");
    assert_eq!(df.height(), 2);
    let major = df.column("Major").expect("major column");
    assert_eq!(
        column_strings(major),
        vec![None, Some("Biology".to_string())]
    );
    cleanup(&path);
}

#[test]
fn aliases_rename_headers_on_load() {
    let path = temp_file("alias.csv", "Appointment Id,Email\n7,c@x.edu\n");
    let aliases = BTreeMap::from([("Appointment Id".to_string(), "Id".to_string())]);
    let df = read_csv_frame(&path, &aliases).expect("read frame");
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["Id", "Email"]);
    cleanup(&path);
}

#[test]
fn duplicate_headers_after_aliasing_are_rejected() {
    let path = temp_file("dupe.csv", "Id,Other\n1,2\n");
    let aliases = BTreeMap::from([("Other".to_string(), "Id".to_string())]);
    let err = read_csv_frame(&path, &aliases).unwrap_err();
    assert!(matches!(err, IngestError::DuplicateHeader { .. }));
    cleanup(&path);
}

#[test]
fn blank_file_is_empty_csv() {
    let path = temp_file("blank.csv", "\n\n");
    let err = read_csv_table(&path).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
    cleanup(&path);
}
