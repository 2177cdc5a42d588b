use celestial_minigaia::{
    convert, ConvertOptions, LayoutWarning, MiniGaiaDb, MiniGaiaError, MissingValues, Schema, Value,
    HEADER_SIZE,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const GAIA_HEADER: &str = "solution_id,designation,source_id,ra,dec,parallax,phot_g_mean_mag";

fn write_gz(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn gaia_file(rows: &[(i64, f64, f64)]) -> String {
    let mut out = format!("{GAIA_HEADER}\n");
    for (source_id, ra, dec) in rows {
        out.push_str(&format!(
            "1635721458409799680,Gaia DR2 {source_id},{source_id},{ra},{dec},1.25,{}\n",
            12.5
        ));
    }
    out
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("csv");
    fs::create_dir(&input).unwrap();
    let output = tmp.path().join("gaia.db");
    (tmp, input, output)
}

fn read_all(path: &Path) -> Vec<Vec<Value>> {
    let mut db = MiniGaiaDb::open(path).unwrap();
    db.records().map(|r| r.unwrap().into_values()).collect()
}

#[test]
fn test_source_id_ra_dec_round_trip() {
    let (_tmp, input, output) = setup();
    write_gz(
        &input,
        "GaiaSource_000.csv.gz",
        &gaia_file(&[(5853498713160606720, 45.25, -12.5), (7, 0.0, 89.999)]),
    );

    let columns = ["source_id", "ra", "dec"];
    let report = convert(
        &input,
        &output,
        &columns,
        &Schema::gaia_dr2(),
        &ConvertOptions::default(),
    )
    .unwrap();
    assert_eq!(report.format, "qdd");
    assert_eq!(report.columns, "source_id ra dec");
    assert_eq!(report.record_size, 24);
    assert_eq!(report.total_records, 2);
    assert!(report.warnings.is_empty());

    assert_eq!(fs::metadata(&output).unwrap().len(), (HEADER_SIZE + 2 * 24) as u64);

    let mut db = MiniGaiaDb::open(&output).unwrap();
    assert_eq!(db.version(), "Mini Gaia DB 1.0");
    assert_eq!(db.format(), "qdd");
    assert_eq!(db.column_names(), &["source_id", "ra", "dec"]);
    assert_eq!(db.record_number(), 2);

    let records: Vec<_> = db.records().map(|r| r.unwrap()).collect();
    assert_eq!(records[0].get("source_id"), Some(&Value::Long(5853498713160606720)));
    assert_eq!(records[0].get("ra"), Some(&Value::Double(45.25)));
    assert_eq!(records[0].get("dec"), Some(&Value::Double(-12.5)));
    assert_eq!(records[1].get("source_id"), Some(&Value::Long(7)));
    assert_eq!(records[1].get("dec"), Some(&Value::Double(89.999)));
}

#[test]
fn test_unknown_column_creates_nothing() {
    let (_tmp, input, output) = setup();
    write_gz(&input, "a.csv.gz", &gaia_file(&[(1, 1.0, 1.0)]));

    let err = convert(
        &input,
        &output,
        &["source_id", "bogus_col"],
        &Schema::gaia_dr2(),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MiniGaiaError::UnknownColumn(ref c) if c == "bogus_col"));
    assert!(!output.exists());
    assert!(!output.with_file_name("gaia.db.tmp").exists());
}

#[test]
fn test_unknown_column_checked_before_input_dir() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("gaia.db");
    let err = convert(
        &tmp.path().join("does-not-exist"),
        &output,
        &["bogus_col"],
        &Schema::gaia_dr2(),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MiniGaiaError::UnknownColumn(_)));
}

#[test]
fn test_missing_input_dir() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("gaia.db");
    let err = convert(
        &tmp.path().join("does-not-exist"),
        &output,
        &["ra"],
        &Schema::gaia_dr2(),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MiniGaiaError::Io(_)));
    assert!(!output.exists());
}

#[test]
fn test_truncated_database() {
    let (_tmp, input, output) = setup();
    write_gz(&input, "a.csv.gz", &gaia_file(&[(1, 1.0, 2.0), (2, 3.0, 4.0)]));
    convert(&input, &output, &["ra", "dec"], &Schema::gaia_dr2(), &ConvertOptions::default())
        .unwrap();

    // Keep the header plus one and a half records.
    let bytes = fs::read(&output).unwrap();
    fs::write(&output, &bytes[..HEADER_SIZE + 16 + 8]).unwrap();

    match MiniGaiaDb::open(&output) {
        Err(MiniGaiaError::TruncatedFile {
            size,
            header,
            record_size,
        }) => {
            assert_eq!(size, (HEADER_SIZE + 24) as u64);
            assert_eq!(header, HEADER_SIZE as u64);
            assert_eq!(record_size, 16);
        }
        Err(other) => panic!("expected TruncatedFile, got {other:?}"),
        Ok(_) => panic!("expected TruncatedFile, database opened"),
    }
}

#[test]
fn test_files_concatenated_in_sorted_order() {
    let (_tmp, input, output) = setup();
    let second: Vec<_> = (10..15).map(|i| (i, i as f64, 0.0)).collect();
    let first: Vec<_> = (1..4).map(|i| (i, i as f64, 0.0)).collect();
    write_gz(&input, "GaiaSource_2.csv.gz", &gaia_file(&second));
    write_gz(&input, "GaiaSource_1.csv.gz", &gaia_file(&first));
    File::create(input.join("README.txt")).unwrap();

    let report = convert(
        &input,
        &output,
        &["source_id"],
        &Schema::gaia_dr2(),
        &ConvertOptions::default(),
    )
    .unwrap();
    assert_eq!(report.total_records, 8);
    let per_file: Vec<u64> = report.files.iter().map(|f| f.records).collect();
    assert_eq!(per_file, vec![3, 5]);

    let ids: Vec<i64> = read_all(&output)
        .iter()
        .map(|r| r[0].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 10, 11, 12, 13, 14]);
}

#[test]
fn test_missing_column_in_second_file() {
    let (_tmp, input, output) = setup();
    write_gz(&input, "a.csv.gz", &gaia_file(&[(1, 1.0, 1.0)]));
    let bad = write_gz(&input, "b.csv.gz", "source_id,ra\n2,2.0\n");

    let err = convert(
        &input,
        &output,
        &["source_id", "dec"],
        &Schema::gaia_dr2(),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    match err {
        MiniGaiaError::MissingColumn { column, file } => {
            assert_eq!(column, "dec");
            assert_eq!(file, bad);
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
    assert!(!output.exists());
    assert!(!output.with_file_name("gaia.db.tmp").exists());
}

#[test]
fn test_malformed_value_aborts_and_keeps_previous_output() {
    let (_tmp, input, output) = setup();
    fs::write(&output, b"previous").unwrap();
    write_gz(
        &input,
        "a.csv.gz",
        &format!("{GAIA_HEADER}\n1,Gaia DR2 1,1,10.0,1.0,1.0,12.0\n1,Gaia DR2 2,2,oops,1.0,1.0,12.0\n"),
    );

    let err = convert(&input, &output, &["ra"], &Schema::gaia_dr2(), &ConvertOptions::default())
        .unwrap_err();
    match &err {
        MiniGaiaError::Row { row, .. } => assert_eq!(*row, 2),
        other => panic!("expected Row context, got {other:?}"),
    }
    assert!(matches!(
        err.root(),
        MiniGaiaError::MalformedValue { value, .. } if value == "oops"
    ));
    assert_eq!(fs::read(&output).unwrap(), b"previous");
    assert!(!output.with_file_name("gaia.db.tmp").exists());
}

#[test]
fn test_empty_values_with_fill_policy() {
    let (_tmp, input, output) = setup();
    write_gz(
        &input,
        "a.csv.gz",
        &format!("{GAIA_HEADER}\n1,Gaia DR2 1,1,10.0,,,null\n"),
    );
    let columns = ["source_id", "parallax", "phot_g_mean_mag", "designation"];

    let strict = convert(&input, &output, &columns, &Schema::gaia_dr2(), &ConvertOptions::default());
    assert!(matches!(
        strict.unwrap_err().root(),
        MiniGaiaError::MalformedValue { .. }
    ));

    let options = ConvertOptions {
        missing_values: MissingValues::Fill,
        ..ConvertOptions::default()
    };
    convert(&input, &output, &columns, &Schema::gaia_dr2(), &options).unwrap();
    let records = read_all(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0][0], Value::Long(1));
    assert!(records[0][1].as_f64().unwrap().is_nan());
    assert!(records[0][2].as_f64().unwrap().is_nan());
    assert_eq!(records[0][3], Value::Text("Gaia DR2 1".to_string()));
}

#[test]
fn test_conversion_is_deterministic() {
    let (tmp, input, output) = setup();
    write_gz(&input, "a.csv.gz", &gaia_file(&[(1, 1.5, -2.5), (2, 3.5, 4.5)]));
    let columns = ["source_id", "ra", "dec", "phot_g_mean_mag"];

    convert(&input, &output, &columns, &Schema::gaia_dr2(), &ConvertOptions::default()).unwrap();
    let again = tmp.path().join("again.db");
    convert(&input, &again, &columns, &Schema::gaia_dr2(), &ConvertOptions::default()).unwrap();
    assert_eq!(fs::read(&output).unwrap(), fs::read(&again).unwrap());

    // Overwriting an existing database gives the same bytes too.
    convert(&input, &output, &columns, &Schema::gaia_dr2(), &ConvertOptions::default()).unwrap();
    assert_eq!(fs::read(&output).unwrap(), fs::read(&again).unwrap());
}

#[test]
fn test_empty_input_directory() {
    let (_tmp, input, output) = setup();
    let report = convert(&input, &output, &["ra"], &Schema::gaia_dr2(), &ConvertOptions::default())
        .unwrap();
    assert_eq!(report.total_records, 0);

    let mut db = MiniGaiaDb::open(&output).unwrap();
    assert_eq!(db.record_number(), 0);
    assert_eq!(db.records().count(), 0);
}

#[test]
fn test_iteration_restarts() {
    let (_tmp, input, output) = setup();
    write_gz(&input, "a.csv.gz", &gaia_file(&[(1, 1.0, 1.0), (2, 2.0, 2.0), (3, 3.0, 3.0)]));
    convert(&input, &output, &["source_id"], &Schema::gaia_dr2(), &ConvertOptions::default())
        .unwrap();

    let mut db = MiniGaiaDb::open(&output).unwrap();
    let first: Vec<_> = db.records().take(2).map(|r| r.unwrap()).collect();
    assert_eq!(first.len(), 2);
    let mut count = 0;
    for record in &mut db {
        record.unwrap();
        count += 1;
    }
    assert_eq!(count, 3);
}

fn wide_columns() -> Vec<&'static str> {
    Schema::gaia_dr2().iter().take(40).map(|c| c.name).collect()
}

fn write_wide_file(input: &Path, columns: &[&str]) {
    let row = vec!["1"; columns.len()].join(",");
    write_gz(input, "a.csv.gz", &format!("{}\n{row}\n{row}\n", columns.join(",")));
}

#[test]
fn test_strict_header_fails_before_output_exists() {
    let (_tmp, input, output) = setup();
    let columns = wide_columns();
    write_wide_file(&input, &columns);

    let options = ConvertOptions {
        strict_header: true,
        ..ConvertOptions::default()
    };
    let err = convert(&input, &output, &columns, &Schema::gaia_dr2(), &options).unwrap_err();
    assert!(matches!(err, MiniGaiaError::HeaderTooLarge { field: "columns", .. }));
    assert!(!output.exists());
    assert!(!output.with_file_name("gaia.db.tmp").exists());
}

#[test]
fn test_permissive_header_reports_truncation() {
    let (_tmp, input, output) = setup();
    let columns = wide_columns();
    write_wide_file(&input, &columns);

    let report = convert(&input, &output, &columns, &Schema::gaia_dr2(), &ConvertOptions::default())
        .unwrap();
    assert_eq!(report.total_records, 2);
    assert_eq!(report.warnings.len(), 1);
    match report.warnings[0] {
        LayoutWarning::ColumnsTruncated { len, cap } => {
            assert_eq!(len, columns.join(" ").len());
            assert_eq!(cap, 255);
        }
    }

    // Only whole names are stored, so the database cannot be opened with a
    // wrong column name.
    assert!(matches!(
        MiniGaiaDb::open(&output),
        Err(MiniGaiaError::LayoutMismatch { formats: 40, .. })
    ));
}
