//! Excel出力（rust_xlsxwriter）

use super::{ExportRow, HEADERS};
use material_search_common::ExportError;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

const SHEET_NAME: &str = "Results";

fn failure(e: XlsxError) -> ExportError {
    ExportError::SerializationFailure(format!("Excel生成エラー: {}", e))
}

/// xlsx をバッファに生成
pub fn generate_xlsx_buffer(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let header_format = Format::new().set_bold();
    let score_format = Format::new().set_num_format("0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(failure)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(failure)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &row.code).map_err(failure)?;
        worksheet.write_string(r, 1, &row.description).map_err(failure)?;
        worksheet
            .write_number_with_format(r, 2, row.score, &score_format)
            .map_err(failure)?;
    }

    worksheet.set_column_width(0, 14).map_err(failure)?;
    worksheet.set_column_width(1, 48).map_err(failure)?;
    worksheet.set_column_width(2, 8).map_err(failure)?;

    workbook.save_to_buffer().map_err(failure)
}

pub fn write_xlsx(rows: &[ExportRow], output_path: &Path) -> Result<(), ExportError> {
    let buffer = generate_xlsx_buffer(rows)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_is_zip() {
        let rows = vec![ExportRow {
            code: "M1".into(),
            description: "PIN".into(),
            score: 75.0,
        }];
        let buffer = generate_xlsx_buffer(&rows).unwrap();
        assert_eq!(&buffer[..2], b"PK");
    }
}
