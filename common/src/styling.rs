//! 書式ルールモジュール
//!
//! 完成した表の各セルに表示形式・塗り色・注記を割り当てる。
//! Excelには依存せず、書き込みは export::excel_core が行う。

use crate::aggregate::BestColorMap;
use crate::columns;
use crate::layout::{
    GOOD_FILL, MID_FILL, NOTE_BEST_COLOR, NOTE_NO_MATCH, NOTE_PACK_ASSUMED,
    NOTE_REFERRAL_ASSUMED, PARENT_BAND_FILLS, POOR_FILL,
};
use crate::metrics::NO_BUYBOX;
use crate::types::{CellValue, Table};
use std::collections::HashMap;

/// 評価ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Good,
    Mid,
    Poor,
}

/// 塗り色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fill {
    Tier(Tier),
    /// Parent帯（0 または 1）
    Band(usize),
}

impl Fill {
    pub fn rgb(&self) -> u32 {
        match self {
            Fill::Tier(Tier::Good) => GOOD_FILL,
            Fill::Tier(Tier::Mid) => MID_FILL,
            Fill::Tier(Tier::Poor) => POOR_FILL,
            Fill::Band(band) => PARENT_BAND_FILLS[band % PARENT_BAND_FILLS.len()],
        }
    }
}

/// 表示形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    /// 桁区切り整数
    Integer,
    /// 文字列
    Text,
    /// 通貨（小数2桁）
    Currency,
    /// 桁区切り小数2桁
    Decimal,
    /// 小数2桁
    Difference,
}

impl NumberFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            NumberFormat::Integer => "#,##0",
            NumberFormat::Text => "@",
            NumberFormat::Currency => "$#,##0.00",
            NumberFormat::Decimal => "#,##0.00",
            NumberFormat::Difference => "0.00",
        }
    }

    /// 列名に対応する表示形式
    pub fn for_column(name: &str) -> Option<Self> {
        match name {
            columns::SALES_RANK
            | columns::SALES_RANK_30
            | columns::SALES_RANK_90
            | columns::SALES_RANK_180
            | columns::TOTAL_PARENT_RATINGS
            | columns::TOTAL_COLOR_RATINGS => Some(NumberFormat::Integer),
            columns::UPC | columns::AMZ_IN_STOCK | columns::BUY_BOX_AMAZON_90 => {
                Some(NumberFormat::Text)
            }
            columns::BUY_BOX
            | columns::BUY_BOX_30
            | columns::BUY_BOX_90
            | columns::BUY_BOX_180
            | columns::PICK_AND_PACK
            | columns::PROFIT
            | columns::COST
            | columns::MSRP => Some(NumberFormat::Currency),
            columns::ROI | columns::PROFIT_MARGIN_BUYBOX | columns::PROFIT_MARGIN_MSRP => {
                Some(NumberFormat::Decimal)
            }
            columns::MSRP_DIFFERENCE => Some(NumberFormat::Difference),
            _ => None,
        }
    }
}

/// セル書式（書式キャッシュのキー）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub number_format: Option<NumberFormat>,
    pub fill: Option<Fill>,
}

/// 書式付きセル
#[derive(Debug, Clone, PartialEq)]
pub struct StyledCell {
    /// 出力値（見なし値は数値に展開済み）
    pub value: CellValue,
    pub style: CellStyle,
    pub note: Option<&'static str>,
}

/// 列ごとの条件付き書式ルール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRule {
    SalesRank,
    PickAndPack,
    ReferralFee,
    AmazonAvailability,
    SalesBadge,
    MsrpDifference,
    Margin,
    CostOrMsrp,
    Parent,
    Color,
    Plain,
}

impl ColumnRule {
    fn for_column(name: &str) -> Self {
        match name {
            n if columns::SALES_RANK_COLUMNS.contains(&n) => ColumnRule::SalesRank,
            columns::PICK_AND_PACK => ColumnRule::PickAndPack,
            columns::REFERRAL_FEE => ColumnRule::ReferralFee,
            columns::AMAZON_AVAILABILITY => ColumnRule::AmazonAvailability,
            columns::SALES_BADGE => ColumnRule::SalesBadge,
            columns::MSRP_DIFFERENCE => ColumnRule::MsrpDifference,
            columns::PROFIT_MARGIN_BUYBOX | columns::PROFIT_MARGIN_MSRP => ColumnRule::Margin,
            columns::COST | columns::MSRP => ColumnRule::CostOrMsrp,
            columns::PARENT => ColumnRule::Parent,
            columns::COLOR => ColumnRule::Color,
            _ => ColumnRule::Plain,
        }
    }
}

/// 販売ランクのティア（空・0は対象外）
pub fn sales_rank_tier(cell: &CellValue) -> Option<Tier> {
    let rank = cell.as_f64()?.trunc();
    if rank < 1.0 {
        None
    } else if rank <= 150_000.0 {
        Some(Tier::Good)
    } else if rank <= 500_000.0 {
        Some(Tier::Mid)
    } else {
        Some(Tier::Poor)
    }
}

/// Amazon在庫状況のティア
pub fn availability_tier(cell: &CellValue) -> Option<Tier> {
    if cell.is_missing() {
        return None;
    }
    let text = cell.as_text().to_lowercase();
    if text.contains("no amazon offer exists") {
        Some(Tier::Good)
    } else if text.contains("amazon offer is in stock and shippable") {
        Some(Tier::Poor)
    } else {
        Some(Tier::Mid)
    }
}

/// 利益率のティア（12未満 / 12〜20 / 20超）
pub fn margin_tier(cell: &CellValue) -> Option<Tier> {
    if is_no_buybox(cell) {
        return Some(Tier::Poor);
    }
    let margin = cell.as_f64()?;
    if margin < 12.0 {
        Some(Tier::Poor)
    } else if margin <= 20.0 {
        Some(Tier::Mid)
    } else {
        Some(Tier::Good)
    }
}

/// MSRP差額のティア（−0.05未満は割安でない）
pub fn msrp_difference_tier(cell: &CellValue) -> Option<Tier> {
    if is_no_buybox(cell) {
        return Some(Tier::Poor);
    }
    let diff = cell.as_f64()?;
    if diff < -0.05 {
        Some(Tier::Poor)
    } else {
        Some(Tier::Good)
    }
}

fn is_no_buybox(cell: &CellValue) -> bool {
    matches!(cell, CellValue::Text(s) if s.trim() == NO_BUYBOX)
}

fn is_zero_or_missing(cell: &CellValue) -> bool {
    cell.is_missing() || cell.as_f64() == Some(0.0)
}

/// Parent帯の割り当て（出現順に交互）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentBands {
    bands: HashMap<String, usize>,
}

impl ParentBands {
    pub fn from_table(table: &Table) -> Self {
        let mut bands = HashMap::new();
        if let Some(idx) = table.column_index(columns::PARENT) {
            for row in table.rows() {
                let next = bands.len() % PARENT_BAND_FILLS.len();
                bands.entry(row[idx].as_text()).or_insert(next);
            }
        }
        Self { bands }
    }

    pub fn band(&self, parent: &str) -> Option<usize> {
        self.bands.get(parent).copied()
    }
}

/// 表に対して列ルールを一度だけ解決した書式設定器
#[derive(Debug, Clone)]
pub struct Styler {
    rules: Vec<(ColumnRule, Option<NumberFormat>)>,
    parent: Option<usize>,
    color: Option<usize>,
    bands: ParentBands,
    best_colors: BestColorMap,
}

impl Styler {
    /// 並び替え後の表とベストカラーから生成する
    pub fn new(table: &Table, best_colors: BestColorMap) -> Self {
        let rules = table
            .columns()
            .iter()
            .map(|name| (ColumnRule::for_column(name), NumberFormat::for_column(name)))
            .collect();

        Self {
            rules,
            parent: table.column_index(columns::PARENT),
            color: table.column_index(columns::COLOR),
            bands: ParentBands::from_table(table),
            best_colors,
        }
    }

    /// 1行分の書式を求める
    pub fn style_row(&self, row: &[CellValue]) -> Vec<StyledCell> {
        let parent = self.parent.map(|i| row[i].as_text());
        let color = self.color.map(|i| row[i].as_text());

        row.iter()
            .zip(&self.rules)
            .map(|(cell, (rule, number_format))| {
                let mut styled = StyledCell {
                    value: cell.clone(),
                    style: CellStyle { number_format: *number_format, fill: None },
                    note: None,
                };
                self.apply_rule(*rule, cell, parent.as_deref(), color.as_deref(), &mut styled);
                styled
            })
            .collect()
    }

    /// 複数行分の書式を求める（バッチ単位で呼び出す）
    pub fn style_rows(&self, rows: &[Vec<CellValue>]) -> Vec<Vec<StyledCell>> {
        rows.iter().map(|row| self.style_row(row)).collect()
    }

    fn apply_rule(
        &self,
        rule: ColumnRule,
        cell: &CellValue,
        parent: Option<&str>,
        color: Option<&str>,
        styled: &mut StyledCell,
    ) {
        let tier = match rule {
            ColumnRule::SalesRank => sales_rank_tier(cell),
            ColumnRule::PickAndPack => match cell {
                CellValue::Assumed(v) => {
                    styled.value = CellValue::Number(*v);
                    styled.note = Some(NOTE_PACK_ASSUMED);
                    Some(Tier::Poor)
                }
                other if other.as_f64() == Some(7.0) => Some(Tier::Mid),
                _ => None,
            },
            ColumnRule::ReferralFee => match cell {
                CellValue::Assumed(v) => {
                    styled.value = CellValue::Number(*v);
                    styled.note = Some(NOTE_REFERRAL_ASSUMED);
                    Some(Tier::Poor)
                }
                _ => None,
            },
            ColumnRule::AmazonAvailability => availability_tier(cell),
            ColumnRule::SalesBadge => (!is_zero_or_missing(cell)).then_some(Tier::Good),
            ColumnRule::MsrpDifference => msrp_difference_tier(cell),
            ColumnRule::Margin => margin_tier(cell),
            ColumnRule::CostOrMsrp => {
                if is_zero_or_missing(cell) || cell.as_f64().is_none() {
                    styled.note = Some(NOTE_NO_MATCH);
                    Some(Tier::Poor)
                } else {
                    None
                }
            }
            ColumnRule::Parent => {
                styled.style.fill = parent.and_then(|p| self.bands.band(p)).map(Fill::Band);
                None
            }
            ColumnRule::Color => match (parent, color) {
                (Some(p), Some(c)) if self.best_colors.is_best(p, c) => {
                    styled.note = Some(NOTE_BEST_COLOR);
                    Some(Tier::Good)
                }
                _ => None,
            },
            ColumnRule::Plain => None,
        };

        if let Some(tier) = tier {
            styled.style.fill = Some(Fill::Tier(tier));
        }
    }
}
