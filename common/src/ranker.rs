//! ランキングモジュール
//!
//! 閾値で絞り込み、スコア降順に並べ、上位 topN 件に切り詰める。
//! 同点はカタログ上の順序を保つ（コード順などでは並べない）。

use crate::types::MatchResult;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// スコア降順、同点はカタログ順
pub fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.ordinal.cmp(&b.ordinal))
}

/// 検索結果をランキングする
///
/// # Arguments
/// * `scored` - カタログ順に並んだスコア済み候補
/// * `min_score` - この値以上のみ残す（境界を含む）
/// * `top_n` - 最大件数
///
/// 何も残らなければ空のVecを返す（エラーにはしない）。
pub fn rank(scored: Vec<MatchResult>, min_score: f64, top_n: usize) -> Vec<MatchResult> {
    let mut kept: Vec<MatchResult> = scored
        .into_iter()
        .filter(|m| m.score >= min_score)
        .collect();

    // 安定ソート: 同点は入力順（=カタログ順）のまま
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept.truncate(top_n);
    kept
}

struct HeapEntry {
    score: f64,
    ordinal: usize,
    list: usize,
    pos: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // BinaryHeap は最大値から取り出すので「良い方が大きい」順序にする
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.ordinal.cmp(&self.ordinal))
    }
}

/// ワーカーごとのランキング済み部分結果を K-way マージする
///
/// 各部分結果は `rank_order` で整列済みであること。
pub fn merge_ranked(partials: Vec<Vec<MatchResult>>, top_n: usize) -> Vec<MatchResult> {
    let mut heap = BinaryHeap::with_capacity(partials.len());
    for (list, partial) in partials.iter().enumerate() {
        if let Some(first) = partial.first() {
            heap.push(HeapEntry {
                score: first.score,
                ordinal: first.ordinal,
                list,
                pos: 0,
            });
        }
    }

    let mut merged = Vec::with_capacity(top_n.min(partials.iter().map(Vec::len).sum()));
    while merged.len() < top_n {
        let Some(entry) = heap.pop() else {
            break;
        };
        merged.push(partials[entry.list][entry.pos].clone());

        let next = entry.pos + 1;
        if let Some(m) = partials[entry.list].get(next) {
            heap.push(HeapEntry {
                score: m.score,
                ordinal: m.ordinal,
                list: entry.list,
                pos: next,
            });
        }
    }

    merged
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

    fn sample() -> Vec<MatchResult> {
        vec![
            hit("A", 70.0, 0),
            hit("B", 90.0, 1),
            hit("C", 60.0, 2),
            hit("D", 90.0, 3),
            hit("E", 59.99, 4),
            hit("F", 100.0, 5),
            hit("G", 70.0, 6),
        ]
    }

    fn codes(results: &[MatchResult]) -> Vec<&str> {
        results.iter().map(|m| m.code.as_str()).collect()
    }

    #[test]
    fn test_rank_filters_sorts_truncates() {
        let ranked = rank(sample(), 60.0, 4);
        assert_eq!(codes(&ranked), vec!["F", "B", "D", "A"]);
    }

    #[test]
    fn test_rank_threshold_is_inclusive() {
        let ranked = rank(sample(), 60.0, 100);
        assert!(ranked.iter().any(|m| m.code == "C"));
        assert!(!ranked.iter().any(|m| m.code == "E"));
    }

    #[test]
    fn test_rank_invariants() {
        for min_score in [0.0, 50.0, 70.0, 90.0, 100.0] {
            for top_n in [1, 2, 3, 10] {
                let ranked = rank(sample(), min_score, top_n);
                assert!(ranked.len() <= top_n);
                assert!(ranked.iter().all(|m| m.score >= min_score));
                for pair in ranked.windows(2) {
                    assert!(pair[0].score >= pair[1].score);
                    if pair[0].score == pair[1].score {
                        assert!(pair[0].ordinal < pair[1].ordinal);
                    }
                }
            }
        }
    }

    #[test]
    fn test_rank_above_100_is_empty() {
        assert!(rank(sample(), 100.01, 10).is_empty());
        assert!(rank(sample(), 150.0, 10).is_empty());
    }

    #[test]
    fn test_rank_ties_keep_catalog_order_not_code_order() {
        let scored = vec![hit("Z9", 80.0, 0), hit("A1", 80.0, 1), hit("M5", 80.0, 2)];
        let ranked = rank(scored, 0.0, 10);
        assert_eq!(codes(&ranked), vec!["Z9", "A1", "M5"]);
    }

    #[test]
    fn test_merge_matches_single_rank() {
        let all = sample();
        let mut expected = all.clone();
        expected.sort_by(rank_order);
        expected.truncate(5);

        // 3チャンクに分けて部分ランキング
        let partials: Vec<Vec<MatchResult>> = all
            .chunks(3)
            .map(|chunk| {
                let mut v = chunk.to_vec();
                v.sort_by(rank_order);
                v
            })
            .collect();

        let merged = merge_ranked(partials, 5);
        assert_eq!(codes(&merged), codes(&expected));
    }

    #[test]
    fn test_merge_empty_partials() {
        assert!(merge_ranked(vec![vec![], vec![]], 5).is_empty());
        assert!(merge_ranked(Vec::new(), 5).is_empty());
    }
}
