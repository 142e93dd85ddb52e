//! カタログ読み込みモジュール
//!
//! 拡張子でExcel系（calamine）とCSV系（csv）を振り分け、
//! ヘッダー行から資材コード列と説明列を探してレコードを返す。

pub mod delimited;
pub mod rules;
pub mod spreadsheet;

use material_search_common::{LoadError, RecordSource, SourceRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv"];

/// 読み込み対象の列名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub code: String,
    pub description: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            code: "Material".into(),
            description: "Material Description".into(),
        }
    }
}

/// ファイルからカタログを読む RecordSource
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
    pub columns: ColumnMapping,
}

impl FileRecordSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            sheet,
            columns,
        }
    }
}

impl RecordSource for FileRecordSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<SourceRecord>, LoadError> {
        if !self.path.is_file() {
            return Err(LoadError::SourceUnreadable(format!(
                "{}（ファイルが存在しません）",
                self.path.display()
            )));
        }

        let ext = extension_of(&self.path);
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            spreadsheet::read_records(&self.path, self.sheet.as_deref(), &self.columns)
        } else if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
            let delimiter = if ext == "tsv" { b'\t' } else { b',' };
            delimited::read_records(&self.path, delimiter, &self.columns)
        } else {
            Err(LoadError::SourceUnreadable(format!(
                "{}（未対応の形式: .{}）",
                self.path.display(),
                ext
            )))
        }
    }
}

/// カタログとして扱える拡張子か
pub fn is_catalog_file(path: &Path) -> bool {
    let ext = extension_of(path);
    SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) || DELIMITED_EXTENSIONS.contains(&ext.as_str())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// ヘッダー名と一致する列番号（大文字小文字・前後空白・BOMを無視）
pub(crate) fn find_column(headers: &[String], name: &str) -> Option<usize> {
    let wanted = name.trim();
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(wanted))
}

/// ヘッダーとデータ行からレコードを組み立てる
///
/// コードが空の行は読み飛ばす。
pub(crate) fn build_records<I>(
    source_name: &str,
    headers: &[String],
    rows: I,
    columns: &ColumnMapping,
) -> Result<Vec<SourceRecord>, LoadError>
where
    I: IntoIterator<Item = Result<Vec<Option<String>>, LoadError>>,
{
    let code_idx = find_column(headers, &columns.code)
        .ok_or_else(|| LoadError::SchemaMissingField(format!("{}（{}）", columns.code, source_name)))?;
    let desc_idx = find_column(headers, &columns.description).ok_or_else(|| {
        LoadError::SchemaMissingField(format!("{}（{}）", columns.description, source_name))
    })?;

    let mut records = Vec::new();
    let mut blank_codes = 0;

    for row in rows {
        let mut row = row?;
        let code = row
            .get_mut(code_idx)
            .and_then(Option::take)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let Some(code) = code else {
            blank_codes += 1;
            continue;
        };
        let description = row.get_mut(desc_idx).and_then(Option::take);
        records.push(SourceRecord { code, description });
    }

    if blank_codes > 0 {
        warn!(source = source_name, rows = blank_codes, "資材コードが空の行を読み飛ばしました");
    }

    if records.is_empty() {
        return Err(LoadError::EmptyDataset(source_name.to_string()));
    }

    debug!(source = source_name, records = records.len(), "カタログ読み込み完了");
    Ok(records)
}
