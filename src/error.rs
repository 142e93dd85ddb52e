use material_search_common::{ExportError, LoadError, QueryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchAppError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カタログが指定されていません。`--catalog` または `matsearch config --set catalog_path=...` で指定してください")]
    NoCatalogSelected,

    #[error("置換ルールファイルが不正: {0}")]
    InvalidRules(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for SearchAppError {
    fn from(e: dialoguer::Error) -> Self {
        SearchAppError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchAppError>;
