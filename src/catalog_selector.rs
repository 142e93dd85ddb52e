//! カタログファイル対話式選択モジュール

use crate::error::{Result, SearchAppError};
use crate::loader::is_catalog_file;
use dialoguer::Select;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// フォルダ直下のカタログ候補を名前順で取得
pub fn list_available_catalogs(dir: &Path) -> Vec<(String, PathBuf)> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut catalogs: Vec<(String, PathBuf)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_catalog_file(p))
        // Excel の一時ファイル（~$xxx.xlsx）は除外
        .filter(|p| {
            !p.file_name()
                .map(|n| n.to_string_lossy().starts_with("~$"))
                .unwrap_or(false)
        })
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            (name, p)
        })
        .collect();

    catalogs.sort_by(|a, b| a.0.cmp(&b.0));
    catalogs
}

/// 対話式でカタログを選択
///
/// 候補が1件ならそれを使い、0件なら NoCatalogSelected。
pub fn select_catalog_interactive(dir: &Path) -> Result<PathBuf> {
    let catalogs = list_available_catalogs(dir);

    match catalogs.len() {
        0 => {
            eprintln!("⚠ {} にカタログファイルがありません", dir.display());
            Err(SearchAppError::NoCatalogSelected)
        }
        1 => {
            let (name, path) = catalogs.into_iter().next().ok_or(SearchAppError::NoCatalogSelected)?;
            eprintln!("→ {} を使用", name);
            Ok(path)
        }
        _ => {
            let names: Vec<&str> = catalogs.iter().map(|(name, _)| name.as_str()).collect();
            let selection = Select::new()
                .with_prompt("📋 資材マスタを選択してください")
                .items(&names)
                .default(0)
                .interact_opt()?;

            match selection {
                Some(i) => Ok(catalogs[i].1.clone()),
                None => Err(SearchAppError::NoCatalogSelected),
            }
        }
    }
}
