//! 利益計算モジュール
//!
//! 行ごとに Profit / ROI / Profit Margin (Buybox, MSRP) / MSRP Difference を求める。
//! すべて純粋関数で、入力が欠けていても失敗しない。

use crate::columns::{self, DEFAULT_PACK_FEE, DEFAULT_REFERRAL_FEE};
use crate::types::{CellValue, Table};
use rayon::prelude::*;

/// Buy Boxがないことを示す表示値
pub const NO_BUYBOX: &str = "No Buybox";

/// 計算結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    /// Buy Box価格がどの列にもない
    NoBuybox,
    /// 計算不能（空欄で出力）
    Blank,
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_cell(self) -> CellValue {
        match self {
            Metric::Value(v) => CellValue::Number(v),
            Metric::NoBuybox => CellValue::Text(NO_BUYBOX.to_string()),
            Metric::Blank => CellValue::Empty,
        }
    }

    fn finite(value: f64) -> Self {
        if value.is_finite() {
            Metric::Value(value)
        } else {
            Metric::Blank
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 価格セルを数値化する（"$1,234.50" → 1234.5）
///
/// 空・0・負数・不正値は `None`。
pub fn clean_price(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) | CellValue::Assumed(n) => *n,
        CellValue::Text(s) => {
            let cleaned = s.replace(['$', ','], "");
            cleaned.trim().parse::<f64>().ok()?
        }
        CellValue::Empty | CellValue::Bool(_) => return None,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// 実効Pick & Pack手数料（見なし値・空・不正値は7.00）
pub fn effective_pack_fee(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Assumed(_) => DEFAULT_PACK_FEE,
        other => other.as_f64().unwrap_or(DEFAULT_PACK_FEE),
    }
}

/// 実効紹介料率（"17.00%" や 17 は 0.17 として扱う。見なし値・不正値は0.15）
pub fn effective_referral_fee(cell: &CellValue) -> f64 {
    let value = match cell {
        CellValue::Assumed(_) => return DEFAULT_REFERRAL_FEE,
        CellValue::Text(s) => {
            let t = s.trim();
            t.strip_suffix('%').unwrap_or(t).trim().parse::<f64>().ok()
        }
        other => other.as_f64(),
    };

    match value {
        Some(v) if v.is_finite() && v > 1.0 => v / 100.0,
        Some(v) if v.is_finite() => v,
        _ => DEFAULT_REFERRAL_FEE,
    }
}

/// 利益計算に使う列の位置
#[derive(Debug, Clone, Default)]
pub struct PricingColumns {
    buy_box: [Option<usize>; 4],
    msrp: Option<usize>,
    cost: Option<usize>,
    pack_fee: Option<usize>,
    referral_fee: Option<usize>,
}

impl PricingColumns {
    pub fn resolve(table: &Table) -> Self {
        Self {
            buy_box: columns::BUY_BOX_COLUMNS.map(|name| table.column_index(name)),
            msrp: table.column_index(columns::MSRP),
            cost: table.column_index(columns::COST),
            pack_fee: table.column_index(columns::PICK_AND_PACK),
            referral_fee: table.column_index(columns::REFERRAL_FEE),
        }
    }
}

static EMPTY: CellValue = CellValue::Empty;

fn cell_at(row: &[CellValue], idx: Option<usize>) -> &CellValue {
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY)
}

/// 1行分の計算入力
#[derive(Debug, Clone, PartialEq)]
pub struct PricingInputs {
    /// Buy Box, 30日, 90日, 180日（clean_price済み）
    pub buy_box: [Option<f64>; 4],
    pub msrp: Option<f64>,
    pub cost: f64,
    pub pack_fee: f64,
    pub referral_fee: f64,
}

impl Default for PricingInputs {
    fn default() -> Self {
        Self {
            buy_box: [None; 4],
            msrp: None,
            cost: 0.0,
            pack_fee: DEFAULT_PACK_FEE,
            referral_fee: DEFAULT_REFERRAL_FEE,
        }
    }
}

impl PricingInputs {
    pub fn from_row(columns: &PricingColumns, row: &[CellValue]) -> Self {
        let cell = |idx: Option<usize>| cell_at(row, idx);

        Self {
            buy_box: columns.buy_box.map(|idx| clean_price(cell(idx))),
            msrp: clean_price(cell(columns.msrp)),
            cost: cell(columns.cost).as_f64().unwrap_or(0.0),
            pack_fee: effective_pack_fee(cell(columns.pack_fee)),
            referral_fee: effective_referral_fee(cell(columns.referral_fee)),
        }
    }

    /// COST + Pick & Pack
    pub fn total_cost(&self) -> f64 {
        self.cost + self.pack_fee
    }

    /// 最初に見つかった正のBuy Box価格
    pub fn first_buy_box(&self) -> Option<f64> {
        self.buy_box.iter().flatten().copied().next()
    }

    /// 売価（Buy Box 4列 → MSRP の順）
    pub fn sale_price(&self) -> Option<f64> {
        self.first_buy_box().or(self.msrp)
    }

    fn margin_for(&self, price: f64) -> Metric {
        let revenue = price * (1.0 - self.referral_fee);
        let margin = (revenue - self.total_cost()) / price * 100.0;
        if margin.is_finite() {
            Metric::Value(round2(margin))
        } else {
            Metric::Blank
        }
    }
}

/// Profit = 売価 × (1 − 紹介料率) − (COST + Pick & Pack)
///
/// 売価がない場合は −(COST + Pick & Pack)。総コストも0なら空欄。
pub fn profit(inputs: &PricingInputs) -> Metric {
    let total_cost = inputs.total_cost();
    match inputs.sale_price() {
        Some(price) => {
            let revenue = price * (1.0 - inputs.referral_fee);
            Metric::finite(round2(revenue - total_cost))
        }
        None if total_cost != 0.0 => Metric::finite(-total_cost),
        None => Metric::Blank,
    }
}

/// ROI = Profit / COST × 100
///
/// Profitが数値でない場合、COSTが0以下の場合は空欄。
pub fn roi(inputs: &PricingInputs, profit: &Metric) -> Metric {
    let Some(profit) = profit.value() else {
        return Metric::Blank;
    };
    if inputs.cost <= 0.0 {
        return Metric::Blank;
    }
    Metric::finite(profit / inputs.cost * 100.0)
}

/// Buy Box価格基準の利益率（Buy Boxがなければ "No Buybox"）
pub fn profit_margin_buybox(inputs: &PricingInputs) -> Metric {
    match inputs.first_buy_box() {
        Some(price) => inputs.margin_for(price),
        None => Metric::NoBuybox,
    }
}

/// MSRP基準の利益率（MSRPがなければ空欄）
pub fn profit_margin_msrp(inputs: &PricingInputs) -> Metric {
    match inputs.msrp {
        Some(msrp) => inputs.margin_for(msrp),
        None => Metric::Blank,
    }
}

/// Buy Box − MSRP
///
/// MSRPがあってBuy Boxがない場合は "No Buybox"、MSRPがなければ空欄。
pub fn msrp_difference(inputs: &PricingInputs) -> Metric {
    match (inputs.msrp, inputs.first_buy_box()) {
        (Some(msrp), Some(buy_box)) => Metric::finite(buy_box - msrp),
        (Some(_), None) => Metric::NoBuybox,
        (None, _) => Metric::Blank,
    }
}

/// 1行分の計算結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub profit: Metric,
    pub roi: Metric,
    pub margin_buybox: Metric,
    pub margin_msrp: Metric,
    pub msrp_difference: Metric,
}

pub fn compute_row(inputs: &PricingInputs) -> RowMetrics {
    let profit = profit(inputs);
    RowMetrics {
        profit,
        roi: roi(inputs, &profit),
        margin_buybox: profit_margin_buybox(inputs),
        margin_msrp: profit_margin_msrp(inputs),
        msrp_difference: msrp_difference(inputs),
    }
}

fn is_percent_text(cell: &CellValue) -> bool {
    match cell {
        CellValue::Text(s) => s
            .trim()
            .strip_suffix('%')
            .is_some_and(|n| n.trim().parse::<f64>().is_ok()),
        _ => false,
    }
}

/// 空欄・ゼロの手数料セルを見なし値にする
fn fill_fee(cell: &CellValue, default: f64) -> CellValue {
    if cell.is_assumed() {
        return cell.clone();
    }
    if cell.is_missing() {
        return CellValue::Assumed(default);
    }
    match cell.as_f64() {
        Some(v) if v == 0.0 => CellValue::Assumed(default),
        Some(v) => CellValue::Number(round2(v)),
        // "15%" は計算時に解釈する
        None if is_percent_text(cell) => cell.clone(),
        None => CellValue::Number(default),
    }
}

/// Pick & Pack・紹介料の空欄を見なし値（7.00 / 0.15）で補完する
pub fn fill_fee_assumptions(table: &mut Table) {
    table.map_column(columns::PICK_AND_PACK, |cell| fill_fee(cell, DEFAULT_PACK_FEE));
    table.map_column(columns::REFERRAL_FEE, |cell| fill_fee(cell, DEFAULT_REFERRAL_FEE));
}

fn metric_column(results: &[RowMetrics], pick: impl Fn(&RowMetrics) -> Metric) -> Vec<CellValue> {
    results.iter().map(|m| pick(m).into_cell()).collect()
}

/// 計算列（Profit, ROI, Profit Margin ×2, MSRP Difference）を追加する
pub fn add_metric_columns(table: &mut Table) {
    let pricing = PricingColumns::resolve(table);
    let results: Vec<RowMetrics> = table
        .rows()
        .par_iter()
        .map(|row| compute_row(&PricingInputs::from_row(&pricing, row)))
        .collect();

    let profit = metric_column(&results, |m| m.profit);
    let roi = metric_column(&results, |m| m.roi);
    let margin_buybox = metric_column(&results, |m| m.margin_buybox);
    let margin_msrp = metric_column(&results, |m| m.margin_msrp);
    let msrp_difference = metric_column(&results, |m| m.msrp_difference);

    table.set_column(columns::PROFIT, profit);
    table.set_column(columns::ROI, roi);
    table.set_column(columns::PROFIT_MARGIN_BUYBOX, margin_buybox);
    table.set_column(columns::PROFIT_MARGIN_MSRP, margin_msrp);
    table.set_column(columns::MSRP_DIFFERENCE, msrp_difference);
}
