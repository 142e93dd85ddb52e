//! 置換ルールの読み込み
//!
//! - プリセット → ルールファイルの順に連結する
//! - ルールファイル未指定・存在しない場合は空のルール（エラーにしない）
//! - ファイルはあるが読めない場合はエラー

use crate::error::{Result, SearchAppError};
use material_search_common::RuleSet;
use std::path::Path;
use tracing::warn;

pub fn load_rules(path: Option<&Path>, preset: Option<&str>) -> Result<RuleSet> {
    let mut rules = RuleSet::default();

    if let Some(preset_name) = preset {
        match RuleSet::from_preset(preset_name) {
            Some(preset_rules) => rules.extend(&preset_rules),
            None => warn!(preset = preset_name, "不明なプリセット（mechanical/electrical）"),
        }
    }

    let Some(path) = path else {
        return Ok(rules);
    };
    if !path.exists() {
        warn!(path = %path.display(), "置換ルールファイルがありません。ルールなしで続行します");
        return Ok(rules);
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let file_rules = match ext.as_str() {
        "json" => {
            let content = std::fs::read_to_string(path)?;
            RuleSet::from_json(&content)
                .map_err(|e| SearchAppError::InvalidRules(format!("{}: {}", path.display(), e)))?
        }
        "csv" => read_csv_rules(path)?,
        other => {
            return Err(SearchAppError::InvalidRules(format!(
                "{}: 未対応の形式 .{}（json / csv）",
                path.display(),
                other
            )))
        }
    };

    rules.extend(&file_rules);
    Ok(rules)
}

/// `find,replace` ヘッダーつき2列CSV（行順が適用順）
fn read_csv_rules(path: &Path) -> Result<RuleSet> {
    let invalid = |e: csv::Error| SearchAppError::InvalidRules(format!("{}: {}", path.display(), e));
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_path(path)
        .map_err(invalid)?;

    let mut pairs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(invalid)?;
        let find = record.get(0).unwrap_or("");
        let replace = record.get(1).ok_or_else(|| {
            // ヘッダー行を1行目として数える
            SearchAppError::InvalidRules(format!("{}: {}行目に置換後の列がありません", path.display(), line + 2))
        })?;
        pairs.push((find.to_string(), replace.to_string()));
    }

    Ok(RuleSet::new(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_rules_are_empty() {
        assert!(load_rules(None, None).unwrap().is_empty());
        let missing = Path::new("/nonexistent/rules.json");
        assert!(load_rules(Some(missing), None).unwrap().is_empty());
    }

    #[test]
    fn test_json_rules_after_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"[{"find": "hexagon", "replace": "six sided"}]"#).unwrap();

        let rules = load_rules(Some(&path), Some("mechanical")).unwrap();
        // プリセットの HEX → HEXAGON の後にファイルのルールが効く
        assert_eq!(rules.apply("HEX NUT"), "SIX SIDED NUT");
    }

    #[test]
    fn test_csv_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.csv");
        std::fs::write(&path, "find,replace\nBRG, bearing\nASSY,assembly\n").unwrap();

        let rules = load_rules(Some(&path), None).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.apply("BRG ASSY"), "BEARING ASSEMBLY");
    }

    #[test]
    fn test_csv_rules_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.csv");
        std::fs::write(&path, "find,replace\nBRG\n").unwrap();
        assert!(matches!(load_rules(Some(&path), None), Err(SearchAppError::InvalidRules(_))));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_rules(Some(&path), None), Err(SearchAppError::InvalidRules(_))));
    }

    #[test]
    fn test_unknown_preset_is_ignored() {
        assert!(load_rules(None, Some("plumbing")).unwrap().is_empty());
    }
}
