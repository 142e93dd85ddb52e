//! エラー型定義
//!
//! - LoadError: カタログ読み込みの失敗（3分類）
//! - QueryError: 検索の失敗（空クエリはエラーではない）
//! - ExportError: 出力の失敗（結果は変更されない）

use thiserror::Error;

/// カタログ読み込みエラー
///
/// どれが起きてもカタログは Error 状態になり、スナップショットは公開されない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// ファイルが開けない・形式が読めない
    #[error("カタログを読み込めません: {0}")]
    SourceUnreadable(String),

    /// 必須列が見つからない
    #[error("必須列が見つかりません: {0}")]
    SchemaMissingField(String),

    /// 読み込み後のデータが空
    #[error("カタログにデータがありません: {0}")]
    EmptyDataset(String),
}

/// 検索エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("検索条件が不正: {0}")]
    InvalidSpec(String),

    /// 新しい検索またはカタログ再読み込みにより中断された
    #[error("検索が中断されました（新しい検索が開始されています）")]
    Superseded,
}

/// 出力エラー
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("出力データの書き込みに失敗: {0}")]
    SerializationFailure(String),
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::SerializationFailure(e.to_string())
    }
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
