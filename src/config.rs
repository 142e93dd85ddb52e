use crate::error::{Result, SearchAppError};
use material_search_common::Algorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// カタログパスを上書きする環境変数
pub const CATALOG_ENV: &str = "MATSEARCH_CATALOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 既定のカタログファイル
    pub catalog_path: Option<PathBuf>,
    /// カタログ未指定時に候補を探すフォルダ
    pub catalog_dir: PathBuf,
    /// シート名（省略時は先頭シート）
    pub sheet: Option<String>,
    pub code_column: String,
    pub description_column: String,
    /// 置換ルールファイル（JSON / CSV）
    pub rules_path: Option<PathBuf>,
    /// 組み込みルールプリセット
    pub preset: Option<String>,
    pub top_n: usize,
    pub min_score: f64,
    pub algorithm: Algorithm,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            catalog_dir: PathBuf::from("master"),
            sheet: None,
            code_column: "Material".into(),
            description_column: "Material Description".into(),
            rules_path: None,
            preset: None,
            top_n: 20,
            min_score: 60.0,
            algorithm: Algorithm::Ratio,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SearchAppError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("material-search").join("config.json"))
    }

    /// カタログパスの決定: CLI引数 > 環境変数 > 設定ファイル
    pub fn resolve_catalog(&self, cli_value: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_value {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CATALOG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        self.catalog_path.clone()
    }

    /// `KEY=VALUE` 形式で1項目を変更
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| SearchAppError::Config(format!("KEY=VALUE 形式で指定してください: {}", assignment)))?;
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match key.trim() {
            "catalog_path" => self.catalog_path = optional(value).map(PathBuf::from),
            "catalog_dir" => self.catalog_dir = PathBuf::from(value),
            "sheet" => self.sheet = optional(value),
            "code_column" => self.code_column = value.to_string(),
            "description_column" => self.description_column = value.to_string(),
            "rules_path" => self.rules_path = optional(value).map(PathBuf::from),
            "preset" => self.preset = optional(value),
            "top_n" => {
                self.top_n = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| SearchAppError::Config(format!("top_n は1以上の整数: {}", value)))?;
            }
            "min_score" => {
                self.min_score = value
                    .parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite() && *s >= 0.0)
                    .ok_or_else(|| SearchAppError::Config(format!("min_score は0以上の数値: {}", value)))?;
            }
            "algorithm" => {
                self.algorithm = value.parse().map_err(SearchAppError::Config)?;
            }
            other => {
                return Err(SearchAppError::Config(format!("不明な設定キー: {}", other)));
            }
        }
        Ok(())
    }
}
