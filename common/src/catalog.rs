//! カタログインデックスモジュール
//!
//! 正規化・重複除去済みのカタログを不変スナップショットとして保持する。
//! レコードまたはルールの内容ハッシュが変わったときだけ再構築する。
//!
//! 状態遷移:
//! - Unloaded → Loading（読み込み要求）
//! - Loading → Ready（成功） / Error（LoadError）
//! - Ready | Error → Loading（再読み込み）

use crate::error::LoadError;
use crate::normalizer::normalize;
use crate::query::QueryGate;
use crate::rules::RuleSet;
use crate::types::{CatalogRecord, SourceRecord};
use parking_lot::RwLock;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// レコード供給元（Excel/CSVローダーなど）
pub trait RecordSource {
    /// ログ・エラー表示用の名前
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Vec<SourceRecord>, LoadError>;
}

/// メモリ上のレコードをそのまま返す供給元
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub name: String,
    pub records: Vec<SourceRecord>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, records: Vec<SourceRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

impl RecordSource for InMemorySource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> Result<Vec<SourceRecord>, LoadError> {
        if self.records.is_empty() {
            return Err(LoadError::EmptyDataset(self.name.clone()));
        }
        Ok(self.records.clone())
    }
}

/// 構築時の統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// 読み込んだレコード数
    pub source_records: usize,
    /// 正規化後に空になり除外した数
    pub dropped_empty: usize,
    /// コード重複で除外した数
    pub duplicates: usize,
}

/// 不変のカタログスナップショット
#[derive(Debug)]
pub struct CatalogSnapshot {
    version: String,
    records: Vec<CatalogRecord>,
    by_code: HashMap<String, usize>,
    rules: RuleSet,
    stats: BuildStats,
}

impl CatalogSnapshot {
    /// スナップショットを構築
    ///
    /// 正規化は並列に行うが、入力順は保持する（重複は先勝ち）。
    pub fn build(records: &[SourceRecord], rules: &RuleSet) -> Self {
        let version = content_version(records, rules);

        let normalized: Vec<String> = records
            .par_iter()
            .map(|r| normalize(r.description.as_deref(), rules))
            .collect();

        let mut stats = BuildStats {
            source_records: records.len(),
            ..Default::default()
        };
        let mut kept = Vec::with_capacity(records.len());
        let mut by_code = HashMap::with_capacity(records.len());

        for (record, normalized_description) in records.iter().zip(normalized) {
            if normalized_description.is_empty() {
                stats.dropped_empty += 1;
                continue;
            }
            if by_code.contains_key(&record.code) {
                stats.duplicates += 1;
                continue;
            }
            by_code.insert(record.code.clone(), kept.len());
            kept.push(CatalogRecord {
                code: record.code.clone(),
                raw_description: record.description.clone(),
                normalized_description,
            });
        }

        debug!(
            records = kept.len(),
            dropped_empty = stats.dropped_empty,
            duplicates = stats.duplicates,
            "カタログスナップショットを構築"
        );

        Self {
            version,
            records: kept,
            by_code,
            rules: rules.clone(),
            stats,
        }
    }

    /// 内容ハッシュ（SHA-256 hex）
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// コードで O(1) 参照
    pub fn get(&self, code: &str) -> Option<&CatalogRecord> {
        self.by_code.get(code).map(|&i| &self.records[i])
    }

    /// 構築時に使ったルール（検索語の正規化にも使う）
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

/// レコードとルールの内容ハッシュ
///
/// 各フィールドは長さを前置して連結する（区切り文字を含む値でも衝突しない）。
pub fn content_version(records: &[SourceRecord], rules: &RuleSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update((records.len() as u64).to_le_bytes());
    for record in records {
        hash_field(&mut hasher, &record.code);
        match &record.description {
            Some(desc) => {
                hasher.update([1u8]);
                hash_field(&mut hasher, desc);
            }
            None => hasher.update([0u8]),
        }
    }
    hasher.update((rules.len() as u64).to_le_bytes());
    for rule in rules.iter() {
        hash_field(&mut hasher, &rule.find);
        hash_field(&mut hasher, &rule.replace);
    }
    hex::encode(hasher.finalize())
}

fn hash_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// インデックスの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Unloaded,
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexState::Unloaded => write!(f, "未読み込み"),
            IndexState::Loading => write!(f, "読み込み中"),
            IndexState::Ready => write!(f, "準備完了"),
            IndexState::Error => write!(f, "エラー"),
        }
    }
}

struct IndexInner {
    state: IndexState,
    snapshot: Option<Arc<CatalogSnapshot>>,
    last_error: Option<LoadError>,
}

/// カタログインデックス（スナップショットの公開と状態管理）
///
/// スナップショットは `Arc` の差し替えで公開するので、実行中の検索は
/// 古いスナップショットを最後まで使える。
pub struct CatalogIndex {
    inner: RwLock<IndexInner>,
    gate: Arc<QueryGate>,
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(IndexInner {
                state: IndexState::Unloaded,
                snapshot: None,
                last_error: None,
            }),
            gate: Arc::new(QueryGate::new()),
        }
    }

    pub fn state(&self) -> IndexState {
        self.inner.read().state
    }

    /// 公開中のスナップショット
    ///
    /// Loading 中は直前のもの、Unloaded / Error では None。
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.inner.read().snapshot.clone()
    }

    pub fn last_error(&self) -> Option<LoadError> {
        self.inner.read().last_error.clone()
    }

    /// 検索の世代管理（新しい検索・再読み込みで古い検索を中断させる）
    pub fn gate(&self) -> Arc<QueryGate> {
        Arc::clone(&self.gate)
    }

    /// カタログを読み込み、スナップショットを公開する
    ///
    /// 内容ハッシュが現在のスナップショットと同じなら再構築しない。
    pub fn load(
        &self,
        source: &dyn RecordSource,
        rules: &RuleSet,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        let previous = {
            let mut inner = self.inner.write();
            inner.state = IndexState::Loading;
            inner.snapshot.clone()
        };
        info!(source = %source.describe(), "カタログ読み込み開始");

        let result = source.fetch().and_then(|records| {
            let version = content_version(&records, rules);
            if let Some(prev) = previous.filter(|p| p.version() == version) {
                debug!(version = %version, "内容に変更なし、スナップショットを再利用");
                return Ok(prev);
            }
            let snapshot = CatalogSnapshot::build(&records, rules);
            if snapshot.is_empty() {
                return Err(LoadError::EmptyDataset(format!(
                    "{}（説明が空でないレコードがありません）",
                    source.describe()
                )));
            }
            Ok(Arc::new(snapshot))
        });

        let mut inner = self.inner.write();
        match result {
            Ok(snapshot) => {
                let replaced = inner
                    .snapshot
                    .as_ref()
                    .map_or(true, |current| !Arc::ptr_eq(current, &snapshot));
                if replaced {
                    // 旧スナップショットに対する実行中の検索は中断させる
                    self.gate.supersede();
                    info!(
                        records = snapshot.len(),
                        version = %snapshot.version(),
                        "スナップショットを公開"
                    );
                }
                inner.state = IndexState::Ready;
                inner.snapshot = Some(Arc::clone(&snapshot));
                inner.last_error = None;
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "カタログ読み込み失敗");
                inner.state = IndexState::Error;
                inner.snapshot = None;
                inner.last_error = Some(e.clone());
                self.gate.supersede();
                Err(e)
            }
        }
    }
}
