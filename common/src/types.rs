//! 検索の型定義
//!
//! CLIとエクスポートで共有される型:
//! - SourceRecord: 読み込み元が返す生レコード
//! - CatalogRecord: 正規化済みのカタログレコード
//! - MatchResult / RankedResults: 検索結果

use serde::{Deserialize, Serialize};

/// 読み込み元（Excel/CSVなど）から渡される1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SourceRecord {
    pub fn new(code: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            code: code.into(),
            description: description.map(str::to_string),
        }
    }
}

/// カタログレコード（スナップショット内で不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRecord {
    pub code: String,
    pub raw_description: Option<String>,
    /// 有効なルールで正規化した説明（スナップショット構築時に計算）
    pub normalized_description: String,
}

impl CatalogRecord {
    /// 表示用の説明（未入力は空文字列）
    pub fn display_description(&self) -> &str {
        self.raw_description.as_deref().unwrap_or("")
    }
}

/// 検索ヒット1件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// 対応する CatalogRecord のコード
    pub code: String,
    /// 類似度（0〜100、小数2桁）
    pub score: f64,
    /// スナップショット内の位置（同点時の並び順キー）
    pub ordinal: usize,
}

/// ランキング済みの検索結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResults {
    pub matches: Vec<MatchResult>,
    /// 閾値を満たした件数（切り詰め前）
    pub total_matches: usize,
    /// 計算に使ったスナップショットのバージョン
    pub snapshot_version: String,
}

impl RankedResults {
    pub fn empty(snapshot_version: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            total_matches: 0,
            snapshot_version: snapshot_version.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// topN で切り詰められ、表示されていない結果があるか
    pub fn is_truncated(&self) -> bool {
        self.total_matches > self.matches.len()
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_results(self)
    }
}

/// 表示用の集計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub total_matches: usize,
    pub truncated: bool,
}

impl ResultSummary {
    pub fn from_results(results: &RankedResults) -> Self {
        let scores: Vec<f64> = results.matches.iter().map(|m| m.score).collect();
        if scores.is_empty() {
            return Self {
                total_matches: results.total_matches,
                truncated: results.is_truncated(),
                ..Default::default()
            };
        }

        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;

        Self {
            count: scores.len(),
            min,
            max,
            mean: crate::scorer::round2(mean),
            total_matches: results.total_matches,
            truncated: results.is_truncated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(code: &str, score: f64, ordinal: usize) -> MatchResult {
        MatchResult {
            code: code.to_string(),
            score,
            ordinal,
        }
    }

    #[test]
    fn test_summary_statistics() {
        let results = RankedResults {
            matches: vec![hit("M1", 100.0, 0), hit("M2", 80.0, 1), hit("M3", 65.0, 2)],
            total_matches: 5,
            snapshot_version: "v".into(),
        };
        let summary = results.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 65.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.mean, 81.67);
        assert!(summary.truncated);
        assert_eq!(summary.total_matches, 5);
    }

    #[test]
    fn test_summary_empty() {
        let summary = RankedResults::empty("v").summary();
        assert_eq!(summary.count, 0);
        assert!(!summary.truncated);
    }

    #[test]
    fn test_display_description_absent() {
        let record = CatalogRecord {
            code: "M1".into(),
            raw_description: None,
            normalized_description: String::new(),
        };
        assert_eq!(record.display_description(), "");
    }
}
