//! 資材テキスト正規化モジュール
//!
//! ## 処理フロー
//! 1. 大文字化
//! 2. A-Z / 0-9 / 空白 以外を空白に置換
//! 3. 連続空白の圧縮・前後トリム
//! 4. 置換ルールを定義順に単語単位で適用

use crate::rules::RuleSet;
use regex::Regex;

lazy_static::lazy_static! {
    static ref NON_CANONICAL_RE: Regex = Regex::new(r"[^A-Z0-9 ]").unwrap();
    static ref SPACES_RE: Regex = Regex::new(r" {2,}").unwrap();
}

/// ルールなしの基本正規化
///
/// 結果は常に `^[A-Z0-9 ]*$` に一致する。
pub fn clean_text(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let replaced = NON_CANONICAL_RE.replace_all(&upper, " ");
    collapse_spaces(&replaced)
}

/// 正規化（置換ルール適用あり）
///
/// 未入力（None）は空文字列になる。
pub fn normalize(raw: Option<&str>, rules: &RuleSet) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let cleaned = clean_text(raw);
    if rules.is_empty() || cleaned.is_empty() {
        return cleaned;
    }

    // 置換後は空白が連続し得るので再度圧縮する
    collapse_spaces(&rules.apply(&cleaned))
}

pub(crate) fn collapse_spaces(text: &str) -> String {
    SPACES_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' ')
    }

    #[test]
    fn test_none_is_empty() {
        assert_eq!(normalize(None, &RuleSet::default()), "");
    }

    #[test]
    fn test_basic_cleaning() {
        assert_eq!(clean_text("  hex-bolt, m10 x 50mm "), "HEX BOLT M10 X 50MM");
        assert_eq!(clean_text("Bearing\t6205/ZZ"), "BEARING 6205 ZZ");
        assert_eq!(clean_text("***"), "");
    }

    #[test]
    fn test_non_ascii_is_replaced() {
        let out = clean_text("Motor 5HP – 3φ Ø20 café");
        assert!(is_canonical(&out), "{out}");
        assert!(out.starts_with("MOTOR 5HP"));
        assert!(!out.contains("  "));
    }

    #[test]
    fn test_idempotent_without_rules() {
        let samples = [
            "",
            "  ",
            "pin, split (ss) 4x40",
            "V-BELT B-52 // fenner",
            "Ölfilter ß größe 3",
            "tab\tand\nnewline",
        ];
        let rules = RuleSet::default();
        for s in samples {
            let once = normalize(Some(s), &rules);
            let twice = normalize(Some(&once), &rules);
            assert_eq!(once, twice, "input: {s:?}");
            assert!(is_canonical(&once), "input: {s:?} -> {once:?}");
        }
    }

    #[test]
    fn test_rule_whole_word_only() {
        let rules = RuleSet::new([("HEX", "HEXAGON")]);
        assert_eq!(normalize(Some("hex bolt"), &rules), "HEXAGON BOLT");
        assert_eq!(normalize(Some("Hexagonal plate"), &rules), "HEXAGONAL PLATE");
    }

    #[test]
    fn test_rule_to_empty_collapses_spaces() {
        let rules = RuleSet::new([("NEW", "")]);
        assert_eq!(normalize(Some("new bolt new"), &rules), "BOLT");
    }

    #[test]
    fn test_rules_stay_canonical() {
        let rules = RuleSet::new([("ss", "stainless-steel"), ("brg", "bearing")]);
        let out = normalize(Some("SS brg housing"), &rules);
        assert_eq!(out, "STAINLESS STEEL BEARING HOUSING");
        assert!(is_canonical(&out));
    }
}
