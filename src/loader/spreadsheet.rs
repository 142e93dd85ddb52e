//! Excel / ODS 読み込み（calamine）

use super::{build_records, ColumnMapping};
use calamine::{open_workbook_auto, Data, Reader};
use material_search_common::{LoadError, SourceRecord};
use std::path::Path;

pub fn read_records(
    path: &Path,
    sheet: Option<&str>,
    columns: &ColumnMapping,
) -> Result<Vec<SourceRecord>, LoadError> {
    let name = path.display().to_string();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::SourceUnreadable(format!("{}: {}", name, e)))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|s| s.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| LoadError::SchemaMissingField(format!("シート '{}'（{}）", wanted, name)))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::EmptyDataset(format!("{}（シートがありません）", name)))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::SourceUnreadable(format!("{} [{}]: {}", name, sheet_name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return Err(LoadError::EmptyDataset(format!("{} [{}]", name, sheet_name))),
    };

    let data_rows = rows.map(|cells| Ok(cells.iter().map(cell_text).collect::<Vec<_>>()));
    build_records(&format!("{} [{}]", name, sheet_name), &headers, data_rows, columns)
}

/// セルを文字列に（空セル・空白のみは None）
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("  ".into())), None);
        assert_eq!(cell_text(&Data::String("PIN".into())), Some("PIN".into()));
        assert_eq!(cell_text(&Data::Int(10002345)), Some("10002345".into()));
        assert_eq!(cell_text(&Data::Float(10002345.0)), Some("10002345".into()));
    }
}
