//! 検索結果の端末表示

use crate::export::{export_rows, HEADERS};
use material_search_common::{CatalogSnapshot, RankedResults};
use std::io::{self, Write};

/// 説明列の表示幅（文字数）
const DESCRIPTION_WIDTH: usize = 60;

/// 表と集計を書き出す
pub fn render_results(
    out: &mut impl Write,
    results: &RankedResults,
    snapshot: &CatalogSnapshot,
) -> io::Result<()> {
    if results.is_empty() {
        writeln!(out, "⚠ 類似資材は見つかりませんでした")?;
        return Ok(());
    }

    let rows = export_rows(results, snapshot);
    let desc_width = DESCRIPTION_WIDTH;
    let code_width = rows
        .iter()
        .map(|r| r.code.chars().count())
        .max()
        .unwrap_or(0)
        .max(HEADERS[0].len());

    // 見出しは出力ファイルと同じ半角の列名（全角だと桁がずれる）
    writeln!(
        out,
        "{:<code_width$}  {:<desc_width$}  {:>6}",
        HEADERS[0], HEADERS[1], HEADERS[2]
    )?;
    writeln!(out, "{}", "-".repeat(code_width + desc_width + 10))?;
    for row in &rows {
        writeln!(
            out,
            "{:<code_width$}  {:<desc_width$}  {:>6}",
            row.code,
            truncate(&row.description, desc_width),
            row.score_text()
        )?;
    }

    let summary = results.summary();
    writeln!(out)?;
    writeln!(
        out,
        "件数: {}  最高: {:.2}  最低: {:.2}  平均: {:.2}",
        summary.count, summary.max, summary.min, summary.mean
    )?;
    if summary.truncated {
        writeln!(out, "上位{}件を表示（該当{}件）", summary.count, summary.total_matches)?;
    }
    Ok(())
}

/// 文字数で切り詰め（超えた分は … に置き換え）
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
