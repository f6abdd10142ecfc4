//! 処理パイプライン
//!
//! ヘッダー変換 → コード整形 → コストマージ → 行クレンジング → 手数料補完
//! → 集計 → 利益計算 → 並び替え → 書式設定 の順に1回の実行で処理する。
//! 実行ごとの状態（見なし値・ベストカラー）はすべてこの関数内で完結する。

use crate::aggregate::{aggregate, BestColorMap};
use crate::columns::SORT_COLUMNS;
use crate::error::{Error, Result};
use crate::headers::map_headers;
use crate::layout::{recommend_chunk_size, ChunkBounds, DESKTOP_CHUNK_BOUNDS, SERVICE_CHUNK_BOUNDS};
use crate::merge::{add_extra_costs, coerce_cost_columns, merge_costs, MergeStats};
use crate::metrics::{add_metric_columns, fill_fee_assumptions};
use crate::normalizer::clean_text_columns;
use crate::sanitizer::{filter_rows, SanitizeOptions};
use crate::types::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 進捗通知先
///
/// (0.0〜1.0の進捗率, 表示ラベル) を受け取る。呼び出し側をブロックしないこと。
pub trait ProgressSink {
    fn on_progress(&self, fraction: f64, label: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(f64, &str),
{
    fn on_progress(&self, fraction: f64, label: &str) {
        self(fraction, label)
    }
}

/// 進捗を通知しない
pub fn no_progress(_fraction: f64, _label: &str) {}

/// 実行環境ごとのバッチ行数の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkProfile {
    #[default]
    Desktop,
    Service,
}

impl ChunkProfile {
    pub fn bounds(&self) -> ChunkBounds {
        match self {
            ChunkProfile::Desktop => DESKTOP_CHUNK_BOUNDS,
            ChunkProfile::Service => SERVICE_CHUNK_BOUNDS,
        }
    }
}

impl FromStr for ChunkProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desktop" => Ok(ChunkProfile::Desktop),
            "service" => Ok(ChunkProfile::Service),
            _ => Err(format!("Invalid profile: {}. Use desktop or service", s)),
        }
    }
}

impl fmt::Display for ChunkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkProfile::Desktop => write!(f, "desktop"),
            ChunkProfile::Service => write!(f, "service"),
        }
    }
}

/// 実行オプション
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessOptions {
    /// 全行のCOSTに加算する送料
    pub shipping_cost: f64,
    /// 全行のCOSTに加算する諸経費
    pub misc_cost: f64,
    /// 書式設定のバッチ行数（未指定なら行数から推奨値）
    pub chunk_size: Option<usize>,
    pub profile: ChunkProfile,
    pub sanitize: SanitizeOptions,
}

impl ProcessOptions {
    /// プロファイルの範囲に収めたバッチ行数
    pub fn effective_chunk_size(&self, rows: usize) -> usize {
        let hint = self.chunk_size.unwrap_or_else(|| recommend_chunk_size(rows));
        self.profile.bounds().clamp(hint)
    }
}

/// 実行結果の集計
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProcessSummary {
    pub input_rows: usize,
    pub removed_rows: usize,
    pub merge_column: Option<String>,
    pub merged_rows: usize,
    pub matched_codes: usize,
    pub output_rows: usize,
    pub chunk_size: usize,
}

impl ProcessSummary {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    fn record_merge(&mut self, stats: &MergeStats) {
        self.merge_column = stats.primary_column.clone();
        self.merged_rows = stats.matched_rows;
        self.matched_codes = stats.matched_codes;
    }
}

/// 書式設定前の処理済みデータ
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub table: Table,
    pub best_colors: BestColorMap,
    pub summary: ProcessSummary,
}

/// 出力成果物
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub table: Table,
    /// 書式付きxlsxのバイト列
    pub xlsx: Vec<u8>,
    pub summary: ProcessSummary,
}

/// Parent → Color → Size（文字列比較）で安定ソート
pub fn sort_rows(table: &mut Table) {
    let keys: Vec<usize> = SORT_COLUMNS
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    if keys.is_empty() {
        return;
    }

    table.sort_rows_by(|a, b| {
        keys.iter()
            .map(|&i| a[i].as_text().cmp(&b[i].as_text()))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// 書式設定の直前まで処理する
pub fn prepare(
    primary: Table,
    secondary: Option<&Table>,
    options: &ProcessOptions,
    progress: &dyn ProgressSink,
) -> PreparedTable {
    let mut summary = ProcessSummary { input_rows: primary.len(), ..Default::default() };

    progress.on_progress(0.0, "ヘッダー変換");
    let mut table = map_headers(primary);
    clean_text_columns(&mut table);

    progress.on_progress(0.1, "コストマージ");
    let (mut table, stats) = merge_costs(table, secondary);
    coerce_cost_columns(&mut table);
    summary.record_merge(&stats);

    progress.on_progress(0.2, "行クレンジング");
    let before = table.len();
    let mut table = filter_rows(table, &options.sanitize);
    summary.removed_rows = before - table.len();
    // 補完値を有効セルとして数えないよう、行クレンジングの後で補完する
    fill_fee_assumptions(&mut table);
    add_extra_costs(&mut table, options.shipping_cost, options.misc_cost);

    progress.on_progress(0.3, "集計");
    let best_colors = aggregate(&mut table);

    progress.on_progress(0.4, "利益計算");
    add_metric_columns(&mut table);

    progress.on_progress(0.5, "並び替え");
    sort_rows(&mut table);

    summary.output_rows = table.len();
    summary.chunk_size = options.effective_chunk_size(table.len());

    tracing::info!(
        "処理完了: 入力{}行, 除去{}行, 出力{}行",
        summary.input_rows,
        summary.removed_rows,
        summary.output_rows
    );

    PreparedTable { table, best_colors, summary }
}

/// 全工程を実行し、書式付きxlsxを生成する
#[cfg(feature = "excel")]
pub fn process(
    primary: Table,
    secondary: Option<&Table>,
    options: &ProcessOptions,
    progress: &dyn ProgressSink,
) -> Result<OutputArtifact> {
    use crate::export::excel_core::generate_excel_buffer;
    use crate::styling::Styler;

    let PreparedTable { table, best_colors, summary } =
        prepare(primary, secondary, options, progress);

    progress.on_progress(0.55, "書式設定");
    let styler = Styler::new(&table, best_colors);
    let xlsx = generate_excel_buffer(&table, &styler, summary.chunk_size, |done, total| {
        let fraction = 0.55 + 0.4 * done as f64 / total.max(1) as f64;
        progress.on_progress(fraction, &format!("書式設定 {}/{}行", done, total));
    })?;

    progress.on_progress(1.0, "完了");
    Ok(OutputArtifact { table, xlsx, summary })
}
