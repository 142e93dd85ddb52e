//! Material Search Common Library
//!
//! 資材マスタ類似検索のエンジン本体（正規化・類似度・ランキング・カタログ）。
//! ファイル入出力や画面表示は持たない。

pub mod types;
pub mod error;
pub mod normalizer;
pub mod rules;
pub mod scorer;
pub mod ranker;
pub mod catalog;
pub mod query;

pub use types::{CatalogRecord, MatchResult, RankedResults, ResultSummary, SourceRecord};
pub use error::{Error, ExportError, LoadError, QueryError, Result};
pub use normalizer::{clean_text, normalize};
pub use rules::{Rule, RuleSet};
pub use scorer::{score, Algorithm, BlendWeights};
pub use ranker::{merge_ranked, rank};
pub use catalog::{BuildStats, CatalogIndex, CatalogSnapshot, InMemorySource, IndexState, RecordSource};
pub use query::{search, search_with_ticket, QueryGate, QuerySpec, QueryTicket};
