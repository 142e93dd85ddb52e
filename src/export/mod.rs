//! 検索結果の出力
//!
//! 列順は常に `code, description, score`（スコアは小数2桁）。
//! 結果は参照で受け取り変更しないので、同じ結果を何度出力してもよい。

pub mod delimited;
pub mod excel;

use crate::cli::ExportFormat;
use material_search_common::{CatalogSnapshot, ExportError, RankedResults};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// 出力する列名（この順で並べる）
pub const HEADERS: [&str; 3] = ["code", "description", "score"];

/// 出力1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub code: String,
    pub description: String,
    pub score: f64,
}

impl ExportRow {
    /// 表示用スコア（小数2桁）
    pub fn score_text(&self) -> String {
        format!("{:.2}", self.score)
    }
}

/// 結果とスナップショットから出力行を作る
///
/// 説明は正規化前の原文を使う。
pub fn export_rows(results: &RankedResults, snapshot: &CatalogSnapshot) -> Vec<ExportRow> {
    results
        .matches
        .iter()
        .map(|m| ExportRow {
            code: m.code.clone(),
            description: snapshot
                .get(&m.code)
                .map(|r| r.display_description().to_string())
                .unwrap_or_default(),
            score: m.score,
        })
        .collect()
}

pub fn export_results(
    results: &RankedResults,
    snapshot: &CatalogSnapshot,
    format: ExportFormat,
    output_path: &Path,
) -> Result<(), ExportError> {
    let rows = export_rows(results, snapshot);

    match format {
        ExportFormat::Csv => delimited::write_csv(&rows, output_path)?,
        ExportFormat::Excel => excel::write_xlsx(&rows, output_path)?,
        ExportFormat::Json => write_json(&rows, output_path)?,
    }

    debug!(format = %format, rows = rows.len(), path = %output_path.display(), "結果を出力");
    Ok(())
}

/// JSON配列として出力
pub fn write_json(rows: &[ExportRow], output_path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| ExportError::SerializationFailure(format!("JSON生成エラー: {}", e)))?;
    std::fs::write(output_path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use material_search_common::{search, QuerySpec, RuleSet, SourceRecord};

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::build(
            &[
                SourceRecord::new("M1", Some("Hex Bolt M10")),
                SourceRecord::new("M2", Some("bolt m10")),
            ],
            &RuleSet::default(),
        )
    }

    #[test]
    fn test_rows_use_raw_description() {
        let snapshot = snapshot();
        let results = search(&QuerySpec::new("bolt m10").with_min_score(0.0), &snapshot).unwrap();
        let rows = export_rows(&results, &snapshot);

        assert_eq!(rows[0].code, "M2");
        assert_eq!(rows[1].description, "Hex Bolt M10");
        assert_eq!(rows[1].score_text(), "80.00");
    }

    #[test]
    fn test_json_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let rows = vec![ExportRow {
            code: "M1".into(),
            description: "PIN".into(),
            score: 83.87,
        }];
        write_json(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let code_pos = content.find("\"code\"").unwrap();
        let desc_pos = content.find("\"description\"").unwrap();
        let score_pos = content.find("\"score\"").unwrap();
        assert!(code_pos < desc_pos && desc_pos < score_pos);
        assert!(content.contains("83.87"));
    }

    #[test]
    fn test_unwritable_path_is_serialization_failure() {
        let rows: Vec<ExportRow> = Vec::new();
        let err = write_json(&rows, Path::new("/nonexistent/dir/out.json")).unwrap_err();
        assert!(matches!(err, ExportError::SerializationFailure(_)));
    }
}
