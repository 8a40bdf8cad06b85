/*!
 * Integration tests for batch processing of CCN columns
 *
 * These tests write small CSV extracts to a temporary directory, run them
 * through `BatchProcessor::process_csv`, and check the exported JSON, JSON
 * Lines and CSV output.
 */

use std::fs;
use std::path::PathBuf;

use ccns::config::CcnConfig;
use ccns::prelude::*;
use tempfile::TempDir;

const PROVIDERS_CSV: &str = "\
Provider Name,ccn,City
General Hospital,050001,Los Angeles
Organ Bank,12-p456,Honolulu
Medicaid NF,\" 12a456 \",Honolulu
Psych Unit,33SD12,New York
Emergency,45123E,Dallas
Lab,05D0987654,Fresno
Unknown,12I456,Honolulu
Missing,,Nowhere
Short,123,Somewhere
";

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn processor() -> BatchProcessor {
    BatchProcessor::with_config(&CcnConfig::default())
        .show_progress(false)
        .skip_invalid_records(true)
}

#[test]
fn test_process_csv_decodes_column() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "providers.csv", PROVIDERS_CSV);

    // header match is case-insensitive
    let results = processor().process_csv(&path, "CCN").unwrap();

    assert_eq!(results.len(), 8);
    assert_eq!(results.blank_records, 1);

    let codes: Vec<_> = results
        .valid()
        .map(|r| r.decoded.as_ref().unwrap().code.as_str())
        .collect();
    assert_eq!(codes, vec!["050001", "12P456", "12A456", "33SD12", "45123E", "05D0987654", "000123"]);

    let lab = results.records.iter().find(|r| r.input == "05D0987654").unwrap();
    let lab = lab.decoded.as_ref().unwrap();
    assert_eq!(lab.kind, CcnType::Supplier);
    assert_eq!(lab.region_name, "California");
    assert_eq!(lab.category_code, "D");
    assert_eq!(lab.sequence_number, 987654);

    let unknown: Vec<_> = results.invalid().collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].input, "12I456");
    // header is line 1
    assert_eq!(unknown[0].line, 8);
    assert_eq!(unknown[0].error_kind.as_deref(), Some("ambiguous_or_invalid"));
}

#[test]
fn test_missing_column_lists_available_headers() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "providers.csv", PROVIDERS_CSV);

    let err = processor().process_csv(&path, "prvdr_num").unwrap_err();
    match err {
        CcnError::MissingColumn { column, available } => {
            assert_eq!(column, "prvdr_num");
            assert!(available.iter().any(|c| c == "Provider Name"));
            assert!(available.iter().any(|c| c == "ccn"));
        }
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = processor()
        .process_csv(dir.path().join("nope.csv"), "ccn")
        .unwrap_err();
    assert!(matches!(err, CcnError::Io { .. }));
}

#[test]
fn test_fail_fast_stops_at_first_invalid_value() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "providers.csv", PROVIDERS_CSV);

    let err = processor()
        .skip_invalid_records(false)
        .process_csv(&path, "ccn")
        .unwrap_err();
    assert!(err.is_inference_error());
}

#[test]
fn test_expected_type_skips_inference() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "units.csv", "ccn\n12I456\n33-sd12\n");

    let results = processor()
        .expected_type(Some(CcnType::IppsExcludedProvider))
        .process_csv(&path, "ccn")
        .unwrap();

    assert_eq!(results.valid().count(), 2);
    let first = results.records[0].decoded.as_ref().unwrap();
    assert_eq!(first.category_description, INVALID_FACILITY_TYPE);
    let second = results.records[1].decoded.as_ref().unwrap();
    assert_eq!(second.parent_category_description.as_deref(), Some("Psychiatric Hospital"));
}

#[test]
fn test_export_formats() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "providers.csv", PROVIDERS_CSV);
    let results = processor().process_csv(&path, "ccn").unwrap();

    let json_path = dir.path().join("out.json");
    results.export(&json_path, OutputFormat::Json).unwrap();
    let records: Vec<BatchRecord> = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(records, results.records);

    let jsonl_path = dir.path().join("out.jsonl");
    results.export(&jsonl_path, OutputFormat::JsonLines).unwrap();
    let jsonl = fs::read_to_string(&jsonl_path).unwrap();
    assert_eq!(jsonl.lines().count(), results.len());
    let first: serde_json::Value = serde_json::from_str(jsonl.lines().next().unwrap()).unwrap();
    assert_eq!(first["decoded"]["type"], "MedicareProvider");
    assert_eq!(first["decoded"]["region_name"], "California");

    let csv_path = dir.path().join("out.csv");
    results.export(&csv_path, OutputFormat::Csv).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(2), Some("ccn"));
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), results.len());
    assert_eq!(rows[3].get(2), Some("33SD12"));
    assert_eq!(rows[3].get(8), Some("D"));
}

#[test]
fn test_statistics_from_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "providers.csv", PROVIDERS_CSV);
    let stats = processor()
        .parallel_threads(Some(2))
        .batch_size(3)
        .process_csv(&path, "ccn")
        .unwrap()
        .statistics();

    assert_eq!(stats.total_records, 9);
    assert_eq!(stats.valid_records, 7);
    assert_eq!(stats.invalid_records, 1);
    assert_eq!(stats.blank_records, 1);
    assert_eq!(stats.by_region.get("Hawaii"), Some(&2));
    assert_eq!(stats.by_type.get("Supplier"), Some(&1));
}

/// Properties that hold for every input that canonicalizes
#[test]
fn test_canonical_properties() {
    let inputs = [
        "050001", "12-p456", " 12a456 ", "33sd12", "45123e", "x1234567", "05-d0987654", "123", "", "0",
    ];
    for input in inputs {
        for length in [CcnLength::Provider, CcnLength::Supplier] {
            let Ok(code) = canonicalize(input, length) else { continue };
            assert_eq!(code.len(), length.len(), "{:?}", input);
            assert!(code.as_str().bytes().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert_eq!(canonicalize(code.as_str(), length).unwrap(), code);

            if let Ok(kind) = infer_ccn_type(&code) {
                assert_eq!(kind.length(), code.len());
                let fields = decode(&code, kind);
                assert_eq!(fields.region_code.len(), 2);
                assert!(fields.category_code.len() <= 1);
                assert_eq!(fields.code, code.as_str());
            }
        }
    }
}
