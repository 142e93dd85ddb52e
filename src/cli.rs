use clap::{Args, Parser, Subcommand};
use material_search_common::{Algorithm, BlendWeights};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "matsearch")]
#[command(about = "資材マスタ類似検索・重複登録防止ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ログをJSONで出力（stderr）
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 説明文に似た資材を検索
    Search {
        /// 検索する資材説明
        #[arg(required = true)]
        term: String,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// 結果の出力先ファイル
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// 出力形式 (csv/excel/json、省略時は拡張子から判定)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },

    /// カタログを読み込んだまま対話式で繰り返し検索
    Interactive {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// カタログの読み込み結果（件数・重複・バージョン）を表示
    Inspect {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// 設定管理
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 設定を変更 (KEY=VALUE)
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

/// カタログ読み込みの指定（未指定項目は設定ファイルの値）
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// カタログファイル (xlsx/xls/ods/csv/tsv)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// シート名
    #[arg(long)]
    pub sheet: Option<String>,

    /// 資材コードの列名
    #[arg(long)]
    pub code_column: Option<String>,

    /// 資材説明の列名
    #[arg(long)]
    pub description_column: Option<String>,

    /// 置換ルールファイル (JSON/CSV)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// 組み込みルールプリセット (mechanical/electrical)
    #[arg(long)]
    pub preset: Option<String>,
}

/// 検索条件の指定（未指定項目は設定ファイルの値）
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// 最低スコア (0-100)
    #[arg(short, long)]
    pub min_score: Option<f64>,

    /// 表示件数
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// 類似度アルゴリズム (ratio/partial/token-sort/token-set/blend)
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,

    /// blend の重み（例: partial=0.3,token-sort=0.3,token-set=0.4）
    #[arg(short, long)]
    pub weights: Option<BlendWeights>,
}

impl QueryArgs {
    /// 重み指定があれば blend として扱う
    pub fn resolve_algorithm(&self, fallback: &Algorithm) -> Algorithm {
        match (&self.algorithm, self.weights) {
            (_, Some(weights)) => Algorithm::WeightedBlend(weights),
            (Some(algorithm), None) => algorithm.clone(),
            (None, None) => fallback.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    /// 拡張子から判定（不明なら CSV）
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or json", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}
