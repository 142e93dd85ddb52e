//! 検索実行モジュール
//!
//! 検索語を正規化し、スナップショットの全レコードをチャンク単位で並列に採点する。
//! 各チャンクはローカルの上位K件を作り、最後に K-way マージする。

use crate::catalog::CatalogSnapshot;
use crate::error::QueryError;
use crate::normalizer::normalize;
use crate::ranker::{merge_ranked, rank_order};
use crate::scorer::{score, Algorithm};
use crate::types::{MatchResult, RankedResults};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 1チャンクあたりのレコード数（キャンセル確認の単位）
pub const CHUNK_SIZE: usize = 1024;

/// 検索条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub search_term: String,
    /// 0〜100（100超は常に0件）
    pub min_score: f64,
    pub top_n: usize,
    #[serde(default)]
    pub algorithm: Algorithm,
}

impl QuerySpec {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            min_score: 60.0,
            top_n: 20,
            algorithm: Algorithm::default(),
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 検索条件の検証
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.top_n == 0 {
            return Err(QueryError::InvalidSpec("top_n は1以上を指定してください".into()));
        }
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(QueryError::InvalidSpec(format!(
                "min_score は0以上の数値を指定してください: {}",
                self.min_score
            )));
        }
        self.algorithm
            .validate()
            .map_err(|e| QueryError::InvalidSpec(e.to_string()))
    }
}

/// 検索の世代カウンタ
///
/// `begin` で新しいチケットを発行すると、それ以前のチケットは中断扱いになる。
#[derive(Debug, Default)]
pub struct QueryGate {
    generation: AtomicU64,
}

impl QueryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい検索を開始（以前の検索はすべて中断扱い）
    pub fn begin(self: &Arc<Self>) -> QueryTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        QueryTicket {
            gate: Some(Arc::clone(self)),
            generation,
        }
    }

    /// 実行中の検索をすべて中断扱いにする（カタログ再読み込み時）
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// 検索1回分のチケット
#[derive(Debug, Clone)]
pub struct QueryTicket {
    gate: Option<Arc<QueryGate>>,
    generation: u64,
}

impl QueryTicket {
    /// 中断されないチケット（単発検索用）
    pub fn detached() -> Self {
        Self {
            gate: None,
            generation: 0,
        }
    }

    pub fn is_superseded(&self) -> bool {
        self.gate
            .as_ref()
            .is_some_and(|gate| gate.current() != self.generation)
    }
}

/// 検索（中断なし）
pub fn search(spec: &QuerySpec, snapshot: &CatalogSnapshot) -> Result<RankedResults, QueryError> {
    search_with_ticket(spec, snapshot, &QueryTicket::detached())
}

/// 検索（中断チケットつき）
///
/// 正規化後の検索語が空なら空の結果を返す（エラーではない）。
/// 中断された場合は部分結果を一切返さず `QueryError::Superseded`。
pub fn search_with_ticket(
    spec: &QuerySpec,
    snapshot: &CatalogSnapshot,
    ticket: &QueryTicket,
) -> Result<RankedResults, QueryError> {
    spec.validate()?;

    let term = normalize(Some(&spec.search_term), snapshot.rules());
    if term.is_empty() {
        debug!("正規化後の検索語が空のため0件");
        return Ok(RankedResults::empty(snapshot.version()));
    }

    let partials: Vec<Option<(Vec<MatchResult>, usize)>> = snapshot
        .records()
        .par_chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(chunk_idx, chunk)| {
            if ticket.is_superseded() {
                return None;
            }
            let base = chunk_idx * CHUNK_SIZE;
            let mut local: Vec<MatchResult> = chunk
                .iter()
                .enumerate()
                .filter_map(|(offset, record)| {
                    let s = score(&term, &record.normalized_description, &spec.algorithm);
                    (s >= spec.min_score).then(|| MatchResult {
                        code: record.code.clone(),
                        score: s,
                        ordinal: base + offset,
                    })
                })
                .collect();
            let passed = local.len();
            local.sort_by(rank_order);
            local.truncate(spec.top_n);
            Some((local, passed))
        })
        .collect();

    // 途中のチャンクで中断を検知した場合も、最後に確認して部分結果を捨てる
    if ticket.is_superseded() || partials.iter().any(Option::is_none) {
        debug!("検索が中断されました");
        return Err(QueryError::Superseded);
    }

    let mut total_matches = 0;
    let mut lists = Vec::with_capacity(partials.len());
    for (local, passed) in partials.into_iter().flatten() {
        total_matches += passed;
        lists.push(local);
    }

    let matches = merge_ranked(lists, spec.top_n);
    debug!(
        term = %term,
        algorithm = %spec.algorithm,
        total_matches,
        returned = matches.len(),
        "検索完了"
    );

    Ok(RankedResults {
        matches,
        total_matches,
        snapshot_version: snapshot.version().to_string(),
    })
}
