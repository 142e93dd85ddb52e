//! 類似度スコア計算モジュール
//!
//! 2つの正規化済み文字列の類似度を 0〜100 で返す（小数2桁に丸め）。
//!
//! - Ratio: 最長一致ブロックを再帰的に取る整列類似度 `2*M/(|a|+|b|)`
//! - PartialRatio: 短い方（検索語）を窓として長い方の上を滑らせた最大値
//! - TokenSortRatio: トークンを整列してから Ratio
//! - TokenSetRatio: 共通トークン/差分トークンの組み合わせの最大値
//! - WeightedBlend: 上記の重みつき和

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 重みの合計に許す誤差
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// スコア算出方式
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Ratio,
    PartialRatio,
    TokenSortRatio,
    TokenSetRatio,
    WeightedBlend(BlendWeights),
}

/// WeightedBlend の重み（0 の項目は計算しない）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub ratio: f64,
    pub partial_ratio: f64,
    pub token_sort_ratio: f64,
    pub token_set_ratio: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            ratio: 0.0,
            partial_ratio: 0.3,
            token_sort_ratio: 0.3,
            token_set_ratio: 0.4,
        }
    }
}

impl BlendWeights {
    /// すべての重みを 0 にした状態（from_str の起点）
    fn zero() -> Self {
        Self {
            ratio: 0.0,
            partial_ratio: 0.0,
            token_sort_ratio: 0.0,
            token_set_ratio: 0.0,
        }
    }

    fn as_array(&self) -> [f64; 4] {
        [
            self.ratio,
            self.partial_ratio,
            self.token_sort_ratio,
            self.token_set_ratio,
        ]
    }

    /// 非負かつ合計が1であることを確認
    pub fn validate(&self) -> Result<()> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Config(format!("重みは0以上の数値で指定してください: {:?}", self)));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::Config(format!("重みの合計が1ではありません: {:.4}", sum)));
        }
        Ok(())
    }
}

impl std::str::FromStr for BlendWeights {
    type Err = String;

    /// `partial=0.3,token_set=0.7` 形式（未指定の項目は 0）
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut weights = Self::zero();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| format!("重みの形式が不正: {}（例: token_set=0.7）", part))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| format!("重みが数値ではありません: {}", part))?;
            let slot = match key.trim().to_lowercase().replace('-', "_").as_str() {
                "ratio" => &mut weights.ratio,
                "partial" | "partial_ratio" => &mut weights.partial_ratio,
                "token_sort" | "token_sort_ratio" => &mut weights.token_sort_ratio,
                "token_set" | "token_set_ratio" => &mut weights.token_set_ratio,
                other => return Err(format!("不明なアルゴリズム名: {}", other)),
            };
            *slot = value;
        }
        Ok(weights)
    }
}

impl Algorithm {
    /// 重みつきの場合は重みを検証
    pub fn validate(&self) -> Result<()> {
        match self {
            Algorithm::WeightedBlend(weights) => weights.validate(),
            _ => Ok(()),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "ratio" => Ok(Algorithm::Ratio),
            "partial" | "partial_ratio" => Ok(Algorithm::PartialRatio),
            "token_sort" | "token_sort_ratio" => Ok(Algorithm::TokenSortRatio),
            "token_set" | "token_set_ratio" => Ok(Algorithm::TokenSetRatio),
            "blend" | "weighted" | "weighted_blend" => {
                Ok(Algorithm::WeightedBlend(BlendWeights::default()))
            }
            _ => Err(format!(
                "Unknown algorithm: {}. Use ratio, partial, token-sort, token-set, or blend",
                s
            )),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Ratio => write!(f, "ratio"),
            Algorithm::PartialRatio => write!(f, "partial"),
            Algorithm::TokenSortRatio => write!(f, "token-sort"),
            Algorithm::TokenSetRatio => write!(f, "token-set"),
            Algorithm::WeightedBlend(w) => write!(
                f,
                "blend(ratio={}, partial={}, token_sort={}, token_set={})",
                w.ratio, w.partial_ratio, w.token_sort_ratio, w.token_set_ratio
            ),
        }
    }
}

/// 類似度スコア（0〜100、小数2桁）
///
/// どちらかが空文字列なら 0。
pub fn score(a: &str, b: &str, algorithm: &Algorithm) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    round2(raw_score(a, b, algorithm).clamp(0.0, 100.0))
}

fn raw_score(a: &str, b: &str, algorithm: &Algorithm) -> f64 {
    match algorithm {
        Algorithm::Ratio => ratio(a, b),
        Algorithm::PartialRatio => partial_ratio(a, b),
        Algorithm::TokenSortRatio => token_sort_ratio(a, b),
        Algorithm::TokenSetRatio => token_set_ratio(a, b),
        Algorithm::WeightedBlend(w) => {
            let parts: [(f64, fn(&str, &str) -> f64); 4] = [
                (w.ratio, ratio),
                (w.partial_ratio, partial_ratio),
                (w.token_sort_ratio, token_sort_ratio),
                (w.token_set_ratio, token_set_ratio),
            ];
            parts
                .iter()
                .filter(|(weight, _)| *weight > 0.0)
                .map(|(weight, f)| weight * f(a, b))
                .sum()
        }
    }
}

/// 小数2桁に丸め
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 整列類似度（丸めなし）
///
/// 引数は辞書順に並べ替えてから照合するので、最長一致の同順位解消による
/// 非対称は生じない。
pub fn ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 100.0;
    }
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let matched = if first.is_ascii() && second.is_ascii() {
        matched_len(first.as_bytes(), second.as_bytes())
    } else {
        let x: Vec<char> = first.chars().collect();
        let y: Vec<char> = second.chars().collect();
        matched_len(&x, &y)
    };
    200.0 * matched as f64 / total as f64
}

/// 部分一致類似度（丸めなし）
///
/// `needle` 側の長さの窓を `haystack` 上で1文字ずつずらし、最大の Ratio を返す。
/// `needle` の方が長い場合は通常の Ratio。引数の順序に意味がある（非対称）。
pub fn partial_ratio(needle: &str, haystack: &str) -> f64 {
    let n: Vec<char> = needle.chars().collect();
    let h: Vec<char> = haystack.chars().collect();
    if n.is_empty() || n.len() > h.len() {
        return ratio(needle, haystack);
    }

    let mut best = 0.0_f64;
    for start in 0..=(h.len() - n.len()) {
        let window: String = h[start..start + n.len()].iter().collect();
        let r = ratio(needle, &window);
        if r > best {
            best = r;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// トークン整列類似度（丸めなし）
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// トークン集合類似度（丸めなし）
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = join(set_a.intersection(&set_b).copied());
    let diff_ab = join(set_a.difference(&set_b).copied());
    let diff_ba = join(set_b.difference(&set_a).copied());

    let combined_a = join_nonempty(&intersection, &diff_ab);
    let combined_b = join_nonempty(&intersection, &diff_ba);

    [
        ratio_or_zero(&intersection, &combined_a),
        ratio_or_zero(&intersection, &combined_b),
        ratio_or_zero(&combined_a, &combined_b),
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

/// 空文字列同士の 100 を拾わないための Ratio
fn ratio_or_zero(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        0.0
    } else {
        ratio(a, b)
    }
}

/// 一致ブロックの総文字数
///
/// 最長一致ブロックを取り、その左右の残りに対して再帰的に同じ処理を行う。
fn matched_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// `a[alo..ahi]` と `b[blo..bhi]` の最長共通連続ブロック
///
/// 同じ長さが複数あれば a 側で最も早いもの、次に b 側で最も早いものを返す。
fn longest_match<T: PartialEq>(
    a: &[T],
    b: &[T],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                curr[col] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                curr[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
