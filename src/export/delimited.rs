//! CSV出力（csv）

use super::{ExportRow, HEADERS};
use material_search_common::ExportError;
use std::path::Path;

pub fn write_csv(rows: &[ExportRow], output_path: &Path) -> Result<(), ExportError> {
    let failure = |e: csv::Error| ExportError::SerializationFailure(format!("CSV書き込みエラー: {}", e));

    let mut writer = csv::Writer::from_path(output_path).map_err(failure)?;
    writer.write_record(HEADERS).map_err(failure)?;
    for row in rows {
        writer
            .write_record([row.code.as_str(), row.description.as_str(), row.score_text().as_str()])
            .map_err(failure)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            ExportRow {
                code: "M1".into(),
                description: "BOLT, HEX".into(),
                score: 80.0,
            },
            ExportRow {
                code: "M2".into(),
                description: String::new(),
                score: 66.666,
            },
        ];
        write_csv(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "code,description,score\nM1,\"BOLT, HEX\",80.00\nM2,,66.67\n");
    }
}
