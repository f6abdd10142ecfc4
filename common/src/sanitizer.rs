//! 行クレンジングモジュール
//!
//! 空行や情報量の少ない行（識別コードもキー項目もないゴミ行）を除去する。

use crate::columns;
use crate::types::{CellValue, Table};
use serde::{Deserialize, Serialize};

/// 「意味のある値」とみなさない表記
const PLACEHOLDER_VALUES: [&str; 6] = ["", "nan", "none", "0", "0.0", "0.0%"];

/// キー項目チェックで空とみなす表記
const BLANK_VALUES: [&str; 3] = ["", "nan", "none"];

/// キー項目（いずれかが空なら情報量を確認する）
const KEY_COLUMNS: [&str; 4] = [columns::BRAND, columns::PARENT, columns::ASIN, columns::TITLE];

/// 行除去の閾値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeOptions {
    /// 識別コードが空の行で、他に意味のある値がこの数以下なら除去
    pub identifier_missing_max: usize,
    /// キー項目が空の行で、空でない値がこの数以下なら除去
    pub key_missing_max: usize,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            identifier_missing_max: 3,
            key_missing_max: 2,
        }
    }
}

fn normalized(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(n) if n.is_nan() => "nan".to_string(),
        CellValue::Number(n) if *n == 0.0 => "0".to_string(),
        other => other.as_text().trim().to_lowercase(),
    }
}

/// 意味のある値か（空・欠損・ゼロ以外）
pub fn is_meaningful(cell: &CellValue) -> bool {
    !PLACEHOLDER_VALUES.contains(&normalized(cell).as_str())
}

fn is_blank_value(cell: &CellValue) -> bool {
    BLANK_VALUES.contains(&normalized(cell).as_str())
}

fn is_empty_cell(cell: &CellValue) -> bool {
    match cell {
        CellValue::Number(n) => n.is_nan(),
        other => other.is_empty(),
    }
}

/// 列位置を一度だけ解決した判定器
struct RowFilter {
    identifier: Option<usize>,
    keys: Vec<usize>,
    options: SanitizeOptions,
}

impl RowFilter {
    fn new(table: &Table, options: &SanitizeOptions) -> Self {
        let identifier = table
            .column_index(columns::IMPORTED_BY_CODE)
            .or_else(|| table.column_index(columns::UPC));
        let keys = KEY_COLUMNS
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();

        Self { identifier, keys, options: *options }
    }

    fn is_problematic(&self, row: &[CellValue]) -> bool {
        if row.iter().all(is_empty_cell) {
            return true;
        }

        if let Some(id_idx) = self.identifier {
            let id = normalized(&row[id_idx]);
            if id.is_empty() || id == "nan" {
                let meaningful = row
                    .iter()
                    .enumerate()
                    .filter(|(i, cell)| *i != id_idx && is_meaningful(cell))
                    .count();
                if meaningful <= self.options.identifier_missing_max {
                    return true;
                }
            }
        }

        if self.keys.iter().any(|&i| is_blank_value(&row[i])) {
            let filled = row.iter().filter(|cell| !is_blank_value(cell)).count();
            if filled <= self.options.key_missing_max {
                return true;
            }
        }

        false
    }
}

/// 問題のある行を除去する
pub fn filter_rows(mut table: Table, options: &SanitizeOptions) -> Table {
    let filter = RowFilter::new(&table, options);
    let before = table.len();
    table.retain_rows(|row| !filter.is_problematic(row));

    tracing::debug!("行クレンジング: {}行 → {}行", before, table.len());
    table
}
