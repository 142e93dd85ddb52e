//! エラーケーステスト
//!
//! 読み込み失敗の3分類と、アプリ側エラーへの変換を検証

use material_search::error::SearchAppError;
use material_search::loader::{ColumnMapping, FileRecordSource};
use material_search_common::{CatalogIndex, IndexState, LoadError, QueryError, RecordSource, RuleSet};
use std::path::Path;
use tempfile::tempdir;

/// 存在しないカタログ
#[test]
fn test_missing_catalog_is_unreadable() {
    let source = FileRecordSource::new("/nonexistent/path/mara.xlsx", None, ColumnMapping::default());
    let err = source.fetch().unwrap_err();
    assert!(matches!(err, LoadError::SourceUnreadable(_)));
}

/// 壊れたExcelファイル
#[test]
fn test_corrupt_workbook_is_unreadable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let source = FileRecordSource::new(&path, None, ColumnMapping::default());
    assert!(matches!(source.fetch(), Err(LoadError::SourceUnreadable(_))));
}

/// 列名の指定違い
#[test]
fn test_wrong_column_is_schema_missing_field() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("mara.csv");
    std::fs::write(&path, "Material,Material Description\nM1,PIN\n").unwrap();

    let columns = ColumnMapping {
        code: "Material".into(),
        description: "Short Text".into(),
    };
    let source = FileRecordSource::new(&path, None, columns);
    match source.fetch() {
        Err(LoadError::SchemaMissingField(msg)) => assert!(msg.contains("Short Text")),
        other => panic!("SchemaMissingField ではありません: {:?}", other),
    }
}

/// 説明がすべて空のカタログはインデックスがエラー状態になる
#[test]
fn test_all_blank_descriptions_leave_index_in_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("mara.csv");
    std::fs::write(&path, "Material,Material Description\nM1,\nM2,---\n").unwrap();

    let index = CatalogIndex::new();
    let source = FileRecordSource::new(&path, None, ColumnMapping::default());
    let err = index.load(&source, &RuleSet::default()).unwrap_err();

    assert!(matches!(err, LoadError::EmptyDataset(_)));
    assert_eq!(index.state(), IndexState::Error);
    assert!(index.snapshot().is_none());
    assert_eq!(index.last_error(), Some(err));
}

/// SearchAppErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        SearchAppError::Config("テスト設定エラー".to_string()),
        SearchAppError::NoCatalogSelected,
        SearchAppError::InvalidRules("rules.json".to_string()),
        SearchAppError::Prompt("入力中断".to_string()),
        SearchAppError::Load(LoadError::EmptyDataset("mara.csv".to_string())),
        SearchAppError::Query(QueryError::Superseded),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// カタログ未指定のメッセージ確認
#[test]
fn test_no_catalog_message() {
    let display = format!("{}", SearchAppError::NoCatalogSelected);
    assert!(display.contains("--catalog"));
    assert!(display.contains("matsearch config"));
}

/// 読み込みエラーは透過的に表示される
#[test]
fn test_load_error_transparent() {
    let err: SearchAppError = LoadError::SchemaMissingField("Material".to_string()).into();
    assert!(matches!(err, SearchAppError::Load(_)));
    assert!(format!("{}", err).contains("必須列が見つかりません"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: SearchAppError = io_err.into();

    assert!(matches!(err, SearchAppError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: SearchAppError = json_err.into();

    assert!(matches!(err, SearchAppError::JsonParse(_)));
}

/// 設定ファイルが不正なJSON
#[test]
fn test_broken_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ top_n: ").unwrap();

    let err = material_search::config::Config::load_from(&path).unwrap_err();
    assert!(matches!(err, SearchAppError::JsonParse(_)));

    // ファイルが無いのはエラーではなく既定値
    let config = material_search::config::Config::load_from(Path::new("/nonexistent/config.json")).unwrap();
    assert_eq!(config.top_n, 20);
}
