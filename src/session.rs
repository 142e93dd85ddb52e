//! 対話式検索モジュール
//!
//! カタログを一度読み込み、検索語を繰り返し受け付ける。
//! `:` で始まる入力は設定変更などのコマンドとして扱う。

use crate::cli::ExportFormat;
use crate::error::{Result, SearchAppError};
use crate::export::export_results;
use crate::loader::rules::load_rules;
use crate::presenter::render_results;
use material_search_common::{
    search_with_ticket, Algorithm, CatalogIndex, CatalogSnapshot, QueryError, QuerySpec,
    RankedResults, RecordSource,
};
use dialoguer::Input;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const HELP: &str = "操作: [検索語]検索 [:min N]最低スコア [:top N]表示件数 [:algo 名前]方式 \
                    [:export パス]直前の結果を出力 [:reload]再読み込み [:q / 空Enter]終了";

/// 対話コマンド
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// 検索語で検索
    Search(String),
    /// 最低スコアを変更
    MinScore(f64),
    /// 表示件数を変更
    Top(usize),
    /// アルゴリズムを変更
    Algorithm(Algorithm),
    /// 直前の結果を出力
    Export(PathBuf),
    /// カタログとルールを読み直す
    Reload,
    Help,
    Quit,
}

/// 入力行をコマンドに変換
pub fn parse_command(line: &str) -> std::result::Result<SessionCommand, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(SessionCommand::Quit);
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Ok(SessionCommand::Search(trimmed.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "q" | "quit" => Ok(SessionCommand::Quit),
        "h" | "help" | "?" => Ok(SessionCommand::Help),
        "reload" => Ok(SessionCommand::Reload),
        "min" => arg
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(SessionCommand::MinScore)
            .ok_or_else(|| format!("最低スコアは0以上の数値: {}", arg)),
        "top" => arg
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(SessionCommand::Top)
            .ok_or_else(|| format!("表示件数は1以上の整数: {}", arg)),
        "algo" => arg.parse().map(SessionCommand::Algorithm),
        "export" if !arg.is_empty() => Ok(SessionCommand::Export(PathBuf::from(arg))),
        "export" => Err("出力先のパスを指定してください".to_string()),
        other => Err(format!("不明なコマンド: :{}（:help で一覧）", other)),
    }
}

/// ループを続けるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 対話セッションの状態
pub struct Session<'a> {
    index: &'a CatalogIndex,
    source: &'a dyn RecordSource,
    rules_path: Option<&'a Path>,
    preset: Option<&'a str>,
    pub min_score: f64,
    pub top_n: usize,
    pub algorithm: Algorithm,
    /// 直前の結果と、その検索に使ったスナップショット
    last_results: Option<(RankedResults, Arc<CatalogSnapshot>)>,
}

impl<'a> Session<'a> {
    pub fn new(
        index: &'a CatalogIndex,
        source: &'a dyn RecordSource,
        rules_path: Option<&'a Path>,
        preset: Option<&'a str>,
        spec: &QuerySpec,
    ) -> Self {
        Self {
            index,
            source,
            rules_path,
            preset,
            min_score: spec.min_score,
            top_n: spec.top_n,
            algorithm: spec.algorithm.clone(),
            last_results: None,
        }
    }

    /// 1コマンドを実行
    pub fn execute(&mut self, command: SessionCommand, out: &mut impl Write) -> Result<Flow> {
        match command {
            SessionCommand::Search(term) => self.search(&term, out)?,
            SessionCommand::MinScore(v) => {
                self.min_score = v;
                writeln!(out, "  → 最低スコア: {}", v)?;
            }
            SessionCommand::Top(n) => {
                self.top_n = n;
                writeln!(out, "  → 表示件数: {}", n)?;
            }
            SessionCommand::Algorithm(algorithm) => {
                writeln!(out, "  → アルゴリズム: {}", algorithm)?;
                self.algorithm = algorithm;
            }
            SessionCommand::Export(path) => self.export(&path, out)?,
            SessionCommand::Reload => self.reload(out)?,
            SessionCommand::Help => writeln!(out, "{}", HELP)?,
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn spec(&self, term: &str) -> QuerySpec {
        QuerySpec::new(term)
            .with_min_score(self.min_score)
            .with_top_n(self.top_n)
            .with_algorithm(self.algorithm.clone())
    }

    fn search(&mut self, term: &str, out: &mut impl Write) -> Result<()> {
        // 新しいチケットを取った時点で、以前の検索は中断扱いになる
        let ticket = self.index.gate().begin();
        let snapshot = self.index.snapshot().ok_or_else(|| match self.index.last_error() {
            Some(e) => SearchAppError::Load(e),
            None => SearchAppError::NoCatalogSelected,
        })?;

        match search_with_ticket(&self.spec(term), &snapshot, &ticket) {
            Ok(results) => {
                render_results(out, &results, &snapshot)?;
                self.last_results = Some((results, snapshot));
            }
            Err(QueryError::Superseded) => {
                writeln!(out, "  → 検索が中断されました。もう一度入力してください")?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn export(&self, path: &Path, out: &mut impl Write) -> Result<()> {
        let Some((results, snapshot)) = &self.last_results else {
            writeln!(out, "  → 出力する検索結果がありません")?;
            return Ok(());
        };
        // 再読み込み後でも、説明は検索時のスナップショットから引く
        if self.index.snapshot().map_or(true, |s| s.version() != snapshot.version()) {
            info!(version = %results.snapshot_version, "再読み込み前の検索結果を出力");
        }

        let format = ExportFormat::from_path(path);
        export_results(results, snapshot, format, path)?;
        writeln!(out, "✔ {}出力: {}", format, path.display())?;
        Ok(())
    }

    fn reload(&mut self, out: &mut impl Write) -> Result<()> {
        let rules = load_rules(self.rules_path, self.preset)?;
        let snapshot = self.index.load(self.source, &rules)?;
        debug!(version = %snapshot.version(), "再読み込み完了");
        writeln!(out, "✔ {}件を読み込みました", snapshot.len())?;
        Ok(())
    }
}

/// 対話式で検索を繰り返す
pub fn run_interactive(session: &mut Session<'_>) -> Result<()> {
    println!("{}", HELP);
    println!("---\n");

    let stdout = std::io::stdout();
    loop {
        let line: String = Input::new()
            .with_prompt("検索語")
            .allow_empty(true)
            .interact_text()?;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("  ⚠ {}", msg);
                continue;
            }
        };

        let mut out = stdout.lock();
        match session.execute(command, &mut out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            // 読み込み・出力の失敗ではセッションを終えない
            Err(e) => writeln!(out, "  ⚠ {}", e)?,
        }
        writeln!(out)?;
    }

    Ok(())
}
