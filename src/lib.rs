//! 資材マスタ類似検索ツール
//!
//! 検索エンジン本体は `material-search-common`。このクレートはファイル読み込み・
//! 端末表示・出力・対話操作を受け持つ。

pub mod catalog_selector;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod logging;
pub mod presenter;
pub mod session;
