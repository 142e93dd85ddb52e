use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use material_search::{catalog_selector, cli, config, error, export, loader, logging, presenter, session};
use material_search_common::{search, CatalogIndex, QuerySpec, RuleSet};
use cli::{CatalogArgs, Cli, Commands, ExportFormat, QueryArgs};
use config::Config;
use loader::{rules::load_rules, ColumnMapping, FileRecordSource};
use std::path::PathBuf;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_json);
    let config = Config::load().context("設定ファイルの読み込みに失敗しました")?;

    match cli.command {
        Commands::Search { term, catalog, query, export, format } => {
            let opened = open_catalog(&catalog, &config)?;
            let snapshot = opened
                .index
                .snapshot()
                .context("カタログが読み込まれていません")?;

            let spec = build_spec(&term, &query, &config);
            let results = search(&spec, &snapshot)?;
            presenter::render_results(&mut std::io::stdout().lock(), &results, &snapshot)?;

            if let Some(path) = export {
                let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
                export::export_results(&results, &snapshot, format, &path)
                    .with_context(|| format!("出力に失敗しました: {}", path.display()))?;
                println!("✔ {}出力: {}", format, path.display());
            }
        }

        Commands::Interactive { catalog, query } => {
            println!("🔍 matsearch - 対話式検索\n");

            let opened = open_catalog(&catalog, &config)?;
            let spec = build_spec("", &query, &config);
            let mut session = session::Session::new(
                &opened.index,
                &opened.source,
                opened.rules_path.as_deref(),
                opened.preset.as_deref(),
                &spec,
            );
            session::run_interactive(&mut session)?;
        }

        Commands::Inspect { catalog } => {
            let opened = open_catalog(&catalog, &config)?;
            let snapshot = opened
                .index
                .snapshot()
                .context("カタログが読み込まれていません")?;
            let stats = snapshot.stats();

            println!("カタログ情報:");
            println!("  パス: {}", opened.source.path.display());
            println!("  状態: {}", opened.index.state());
            println!("  バージョン: {}", snapshot.version());
            println!("  読み込み件数: {}", stats.source_records);
            println!("  検索対象: {}", snapshot.len());
            println!("  説明なしで除外: {}", stats.dropped_empty);
            println!("  コード重複で除外: {}", stats.duplicates);
            println!("  置換ルール: {}件", snapshot.rules().len());
        }

        Commands::Config { show, set } => {
            let mut config = config;

            for assignment in &set {
                config.set(assignment)?;
                println!("✔ 設定しました: {}", assignment);
            }
            if !set.is_empty() {
                config.save()?;
            }

            if show || set.is_empty() {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// 読み込み済みカタログと、再読み込みに必要な情報
struct OpenedCatalog {
    index: CatalogIndex,
    source: FileRecordSource,
    rules_path: Option<PathBuf>,
    preset: Option<String>,
}

/// カタログを決定して読み込む（CLI引数 > 環境変数 > 設定 > フォルダから選択）
fn open_catalog(args: &CatalogArgs, config: &Config) -> error::Result<OpenedCatalog> {
    let path = match config.resolve_catalog(args.catalog.as_deref()) {
        Some(path) => path,
        None => catalog_selector::select_catalog_interactive(&config.catalog_dir)?,
    };

    let columns = ColumnMapping {
        code: args.code_column.clone().unwrap_or_else(|| config.code_column.clone()),
        description: args
            .description_column
            .clone()
            .unwrap_or_else(|| config.description_column.clone()),
    };
    let sheet = args.sheet.clone().or_else(|| config.sheet.clone());
    let rules_path = args.rules.clone().or_else(|| config.rules_path.clone());
    let preset = args.preset.clone().or_else(|| config.preset.clone());

    let rules: RuleSet = load_rules(rules_path.as_deref(), preset.as_deref())?;
    let source = FileRecordSource::new(path, sheet, columns);
    let index = CatalogIndex::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("カタログを読み込み中... {}", source.path.display()));

    let loaded = index.load(&source, &rules);
    spinner.finish_and_clear();
    let snapshot = loaded?;
    eprintln!("✔ {}件を読み込みました（ルール{}件）", snapshot.len(), rules.len());

    Ok(OpenedCatalog {
        index,
        source,
        rules_path,
        preset,
    })
}

/// CLI引数と設定から検索条件を作る
fn build_spec(term: &str, args: &QueryArgs, config: &Config) -> QuerySpec {
    QuerySpec::new(term)
        .with_min_score(args.min_score.unwrap_or(config.min_score))
        .with_top_n(args.top.unwrap_or(config.top_n))
        .with_algorithm(args.resolve_algorithm(&config.algorithm))
}
