//! CSV/Excel/JSON出力の統合テスト

use calamine::{open_workbook_auto, Data, Reader};
use material_search::cli::ExportFormat;
use material_search::export::export_results;
use material_search_common::{search, Algorithm, CatalogSnapshot, QuerySpec, RankedResults, RuleSet, SourceRecord};
use tempfile::tempdir;

fn create_snapshot() -> CatalogSnapshot {
    let records = vec![
        SourceRecord::new("10001", Some("Hex Bolt M10")),
        SourceRecord::new("10002", Some("BOLT HEX M10")),
        SourceRecord::new("10003", Some("Bearing 6204-2RS")),
        SourceRecord::new("10004", Some("Motor 5HP")),
    ];
    CatalogSnapshot::build(&records, &RuleSet::default())
}

fn create_results(snapshot: &CatalogSnapshot) -> RankedResults {
    let spec = QuerySpec::new("bolt m10")
        .with_min_score(50.0)
        .with_algorithm(Algorithm::TokenSortRatio);
    search(&spec, snapshot).expect("検索に失敗")
}

#[test]
fn test_csv_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("hits.csv");
    let snapshot = create_snapshot();
    let results = create_results(&snapshot);

    export_results(&results, &snapshot, ExportFormat::Csv, &output_path).expect("CSV出力に失敗");

    let content = std::fs::read_to_string(&output_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("code,description,score"));
    for (line, hit) in lines.zip(&results.matches) {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields[0], hit.code);
        assert_eq!(fields[2], format!("{:.2}", hit.score));
        // 小数2桁
        assert_eq!(fields[2].split('.').nth(1).map(str::len), Some(2));
    }
}

#[test]
fn test_reexport_is_identical() {
    let dir = tempdir().expect("Failed to create temp dir");
    let snapshot = create_snapshot();
    let results = create_results(&snapshot);
    let before = results.clone();

    for format in [ExportFormat::Csv, ExportFormat::Json] {
        let first = dir.path().join(format!("first.{}", format.extension()));
        let second = dir.path().join(format!("second.{}", format.extension()));
        export_results(&results, &snapshot, format, &first).unwrap();
        export_results(&results, &snapshot, format, &second).unwrap();
        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    // 出力で結果は変わらない
    assert_eq!(results, before);
}

#[test]
fn test_excel_export_readable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("hits.xlsx");
    let snapshot = create_snapshot();
    let results = create_results(&snapshot);

    export_results(&results, &snapshot, ExportFormat::Excel, &output_path).expect("Excel出力に失敗");

    let mut workbook = open_workbook_auto(&output_path).expect("Excelを開けない");
    let range = workbook.worksheet_range("Results").expect("シートがない");
    let rows: Vec<&[Data]> = range.rows().collect();

    assert_eq!(rows[0][0], Data::String("code".into()));
    assert_eq!(rows[0][1], Data::String("description".into()));
    assert_eq!(rows[0][2], Data::String("score".into()));
    assert_eq!(rows.len(), results.len() + 1);
    assert_eq!(rows[1][0], Data::String(results.matches[0].code.clone()));
    assert_eq!(rows[1][2], Data::Float(results.matches[0].score));
}

#[test]
fn test_empty_results_export_header_only() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("empty.csv");
    let snapshot = create_snapshot();
    let results = RankedResults::empty(snapshot.version());

    export_results(&results, &snapshot, ExportFormat::Csv, &output_path).unwrap();
    assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "code,description,score\n");
}
