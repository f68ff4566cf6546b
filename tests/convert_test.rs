use std::{fs, path::Path};

use arrow::{
    array::{AsArray, Float64Array, Int64Array},
    datatypes::{DataType, Float64Type, Int64Type},
};
use songset::{
    Error,
    convert::{self, ConvertPolicy},
    dataset,
};
use tempfile::tempdir;

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

#[test]
fn test_convert_file_round_trip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("train.csv");
    let dest = dir.path().join("train.parquet");
    write(
        &source,
        "id,store_nbr,family,sales\n0,1,AUTOMOTIVE,0.0\n1,1,BABY CARE,2.5\n2,3,BEAUTY,7.25\n",
    );

    let rows = convert::convert_file(&source, &dest).unwrap();
    assert_eq!(rows, 3);

    let (schema, batches) = dataset::read_record_batches(&dest).unwrap();
    assert_eq!(schema.fields().len(), 4);
    assert_eq!(schema.field(0).name(), "id");

    // Inferred types: integers, text and floats
    assert_eq!(schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(schema.field(2).data_type(), &DataType::Utf8);
    assert_eq!(schema.field(3).data_type(), &DataType::Float64);

    let batch = &batches[0];
    let stores: &Int64Array = batch.column(1).as_primitive::<Int64Type>();
    let sales: &Float64Array = batch.column(3).as_primitive::<Float64Type>();
    assert_eq!(stores.values().to_vec(), vec![1, 1, 3]);
    assert_eq!(sales.values().to_vec(), vec![0.0, 2.5, 7.25]);
    assert_eq!(batch.column(2).as_string::<i32>().value(1), "BABY CARE");
}

#[test]
fn test_convert_all() {
    let source = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write(&source.path().join("b.csv"), "x,y\n1,2\n3,4\n");
    write(&source.path().join("a.csv"), "date,value\n2017-01-01,1.5\n");
    write(&source.path().join("notes.txt"), "not a csv");

    let report =
        convert::convert_all(source.path(), dest.path(), ConvertPolicy::FailFast).unwrap();

    // Only csv files, sorted by name, same stem with a parquet extension
    assert_eq!(report.converted.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.converted[0].destination, dest.path().join("a.parquet"));
    assert_eq!(report.converted[0].rows, 1);
    assert_eq!(report.converted[1].destination, dest.path().join("b.parquet"));
    assert_eq!(report.converted[1].rows, 2);
    assert!(!dest.path().join("notes.parquet").exists());

    let rows = report.table_rows();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].destination.ends_with("a.parquet"));
}

#[test]
fn test_convert_all_failure_policy() {
    let source = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write(&source.path().join("a_bad.csv"), "x,y\n1,2\n3,4,5\n");
    write(&source.path().join("b_good.csv"), "x,y\n1,2\n");

    // Fail fast stops at the malformed file
    let err = convert::convert_all(source.path(), dest.path(), ConvertPolicy::FailFast)
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(!dest.path().join("b_good.parquet").exists());

    // Skip invalid converts the rest and reports the failure
    let report =
        convert::convert_all(source.path(), dest.path(), ConvertPolicy::SkipInvalid).unwrap();
    assert_eq!(report.converted.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].source.ends_with("a_bad.csv"));
    assert!(dest.path().join("b_good.parquet").exists());
}

#[test]
fn test_convert_missing_directories() {
    let source = tempdir().unwrap();
    write(&source.path().join("a.csv"), "x\n1\n");

    // A missing destination directory is a write error
    let missing_dest = source.path().join("missing");
    let err = convert::convert_all(source.path(), &missing_dest, ConvertPolicy::FailFast)
        .unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert!(!missing_dest.exists());

    // A missing source directory cannot be listed
    let err = convert::convert_all(source.path().join("nope"), source.path(), Default::default())
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}

#[test]
fn test_convert_empty_file() {
    let source = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write(&source.path().join("empty.csv"), "");
    write(&source.path().join("ok.csv"), "x\n1\n");

    // A zero-byte file has no columns to parse
    let err = convert::convert_file(source.path().join("empty.csv"), dest.path().join("empty.parquet"))
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(!dest.path().join("empty.parquet").exists());

    // Fail fast aborts the run on it
    let err = convert::convert_all(source.path(), dest.path(), ConvertPolicy::FailFast)
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(!dest.path().join("ok.parquet").exists());
}

#[test]
fn test_convert_empty_directory() {
    let source = tempdir().unwrap();
    let dest = tempdir().unwrap();

    let report =
        convert::convert_all(source.path(), dest.path(), ConvertPolicy::FailFast).unwrap();
    assert!(report.converted.is_empty());
    assert!(report.failed.is_empty());
    assert!(convert::csv_files(source.path()).unwrap().is_empty());
}
