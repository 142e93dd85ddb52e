//! CSV / TSV 読み込み（csv）

use super::{build_records, ColumnMapping};
use material_search_common::{LoadError, SourceRecord};
use std::path::Path;

pub fn read_records(
    path: &Path,
    delimiter: u8,
    columns: &ColumnMapping,
) -> Result<Vec<SourceRecord>, LoadError> {
    let name = path.display().to_string();
    let unreadable = |e: csv::Error| LoadError::SourceUnreadable(format!("{}: {}", name, e));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(unreadable)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptyDataset(name.clone()));
    }

    let rows = reader.records().map(|record| {
        record.map_err(unreadable).map(|r| {
            r.iter()
                .map(|cell| {
                    let trimmed = cell.trim();
                    (!trimmed.is_empty()).then(|| cell.to_string())
                })
                .collect::<Vec<Option<String>>>()
        })
    });

    build_records(&name, &headers, rows, columns)
}
