//! 置換ルールモジュール
//!
//! 略語・表記ゆれを単語単位で置換する。順序つきリストで保持し、
//! 定義順に1回ずつ適用する（前のルールの出力が次のルールの入力になる）。

use crate::error::Result;
use crate::normalizer::clean_text;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 置換ルール1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub find: String,
    pub replace: String,
}

/// 順序つき置換ルール集合
///
/// find/replace は構築時に基本正規化される。find が空になるルールは捨てる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new<I, F, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, R)>,
        F: AsRef<str>,
        R: AsRef<str>,
    {
        let mut set = Self::default();
        for (find, replace) in pairs {
            set.push(find.as_ref(), replace.as_ref());
        }
        set
    }

    /// 末尾にルールを追加
    pub fn push(&mut self, find: &str, replace: &str) {
        let find_clean = clean_text(find);
        if find_clean.is_empty() {
            warn!(find, "置換対象が空になるルールを無視します");
            return;
        }
        self.rules.push(Rule {
            find: find_clean,
            replace: clean_text(replace),
        });
    }

    /// 別のルール集合を後ろに連結
    pub fn extend(&mut self, other: &RuleSet) {
        self.rules.extend(other.rules.iter().cloned());
    }

    /// JSON文字列から読み込み
    ///
    /// `[{"find": "HEX", "replace": "HEXAGON"}, ...]` 形式（配列順がそのまま適用順）
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<Rule> = serde_json::from_str(json)?;
        Ok(Self::new(raw.into_iter().map(|r| (r.find, r.replace))))
    }

    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mechanical" | "mech" => Some(Self::mechanical_preset()),
            "electrical" | "elec" => Some(Self::electrical_preset()),
            _ => None,
        }
    }

    /// 機械部品向け略語
    fn mechanical_preset() -> Self {
        Self::new([
            ("HEX", "HEXAGON"),
            ("SS", "STAINLESS STEEL"),
            ("MS", "MILD STEEL"),
            ("BRG", "BEARING"),
            ("ASSY", "ASSEMBLY"),
            ("CSK", "COUNTERSUNK"),
            ("DIA", "DIAMETER"),
        ])
    }

    /// 電気部品向け略語
    fn electrical_preset() -> Self {
        Self::new([
            ("MTR", "MOTOR"),
            ("SW", "SWITCH"),
            ("CBL", "CABLE"),
            ("XFMR", "TRANSFORMER"),
            ("MCB", "MINIATURE CIRCUIT BREAKER"),
        ])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// 正規化済みテキストにルールを定義順で適用
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            current = replace_whole_word(&current, &rule.find, &rule.replace);
        }
        current
    }
}

/// 英数字以外（または文字列端）で区切られた出現のみ置換する
fn replace_whole_word(text: &str, find: &str, replace: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut search_from = 0;
    let mut copied_until = 0;

    while let Some(offset) = text[search_from..].find(find) {
        let start = search_from + offset;
        let end = start + find.len();

        let left_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let right_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();

        if left_ok && right_ok {
            out.push_str(&text[copied_until..start]);
            out.push_str(replace);
            copied_until = end;
            search_from = end;
        } else {
            let step = text[start..].chars().next().map_or(1, char::len_utf8);
            search_from = start + step;
        }
    }

    out.push_str(&text[copied_until..]);
    out
}
