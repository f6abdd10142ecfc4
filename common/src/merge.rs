//! コスト・MSRPマージモジュール
//!
//! コストファイル（任意）から識別コード列・COST列・MSRP列を見つけ、
//! 正規化したコードでメインの表に左結合する。

use crate::columns;
use crate::normalizer::normalize_cell;
use crate::types::{CellValue, Table};
use std::collections::{HashMap, HashSet};

/// コストファイル側の列の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Identifier,
    Cost,
    Msrp,
}

/// 列名判定ルール（上から順に評価し、役割ごとに最初に見つかった列を採用）
const DISCOVERY_RULES: [(ColumnRole, fn(&str) -> bool); 4] = [
    (ColumnRole::Identifier, is_imported_code_header),
    (ColumnRole::Identifier, is_upc_header),
    (ColumnRole::Cost, is_cost_header),
    (ColumnRole::Msrp, is_msrp_header),
];

fn is_imported_code_header(header: &str) -> bool {
    let upper = header.to_uppercase();
    upper == "IMPORTED BY CODE" || (upper.contains("IMPORTED") && upper.contains("CODE"))
}

fn is_upc_header(header: &str) -> bool {
    header.to_uppercase().contains("UPC")
}

fn is_cost_header(header: &str) -> bool {
    header.to_uppercase().contains("COST")
}

fn is_msrp_header(header: &str) -> bool {
    header.to_uppercase().contains("MSRP")
}

/// コストファイルの列割り当て
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostColumns {
    pub identifier: usize,
    pub cost: Option<usize>,
    pub msrp: Option<usize>,
}

impl CostColumns {
    /// ヘッダーから列の役割を決める
    ///
    /// 識別コード列がない、またはCOST・MSRPのどちらもない場合は `None`。
    pub fn discover(headers: &[String]) -> Option<Self> {
        let mut roles: HashMap<ColumnRole, usize> = HashMap::new();

        for (role, matches) in DISCOVERY_RULES {
            if roles.contains_key(&role) {
                continue;
            }
            if let Some(idx) = headers.iter().position(|h| matches(h.trim())) {
                roles.insert(role, idx);
            }
        }

        let identifier = *roles.get(&ColumnRole::Identifier)?;
        let cost = roles.get(&ColumnRole::Cost).copied();
        let msrp = roles.get(&ColumnRole::Msrp).copied();

        if cost.is_none() && msrp.is_none() {
            return None;
        }

        Some(Self { identifier, cost, msrp })
    }
}

/// マージ結果の統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// マージを実行したか
    pub applied: bool,
    /// 照合に使ったメイン側の列
    pub primary_column: Option<String>,
    /// コストファイル側の有効コード数（重複除く）
    pub secondary_codes: usize,
    /// 一致した行数
    pub matched_rows: usize,
    /// 一致したコード数（重複除く）
    pub matched_codes: usize,
}

/// メイン側の照合列（Imported by Code → UPC → EAN → GTIN）
pub fn primary_identifier(table: &Table) -> Option<(usize, &'static str)> {
    columns::IDENTIFIER_COLUMNS
        .iter()
        .find_map(|name| table.column_index(name).map(|idx| (idx, *name)))
}

/// コストファイルをメインの表に左結合する
///
/// コストファイル側に同じコードが複数ある場合は最初の行を採用する。
/// 結合できない場合は何もせずに元の表を返す。
pub fn merge_costs(mut primary: Table, secondary: Option<&Table>) -> (Table, MergeStats) {
    let mut stats = MergeStats::default();

    let Some(secondary) = secondary else {
        return (primary, stats);
    };

    let Some(cost_columns) = CostColumns::discover(secondary.columns()) else {
        tracing::info!(
            "コストファイルに識別コード列またはCOST/MSRP列がないためマージをスキップ: {:?}",
            secondary.columns()
        );
        return (primary, stats);
    };
    tracing::debug!(
        "コストファイル列: identifier={}, cost={:?}, msrp={:?}",
        secondary.columns()[cost_columns.identifier],
        cost_columns.cost.map(|i| &secondary.columns()[i]),
        cost_columns.msrp.map(|i| &secondary.columns()[i]),
    );

    let Some((primary_idx, primary_name)) = primary_identifier(&primary) else {
        tracing::warn!("メインファイルに照合用の列（Imported by Code/UPC/EAN/GTIN）がありません");
        return (primary, stats);
    };

    // コード → 最初に出現した行
    let mut index: HashMap<String, usize> = HashMap::new();
    for (row_idx, row) in secondary.rows().iter().enumerate() {
        if let Some(code) = normalize_cell(&row[cost_columns.identifier]) {
            index.entry(code).or_insert(row_idx);
        }
    }

    let mut costs = Vec::with_capacity(primary.len());
    let mut msrps = Vec::with_capacity(primary.len());
    let mut matched_codes = HashSet::new();

    for row in primary.rows() {
        let matched = normalize_cell(&row[primary_idx])
            .and_then(|code| index.get(&code).map(|&i| (code, &secondary.rows()[i])));

        match matched {
            Some((code, source)) => {
                stats.matched_rows += 1;
                matched_codes.insert(code);
                costs.push(cost_columns.cost.map(|i| source[i].clone()).unwrap_or_default());
                msrps.push(cost_columns.msrp.map(|i| source[i].clone()).unwrap_or_default());
            }
            None => {
                costs.push(CellValue::Empty);
                msrps.push(CellValue::Empty);
            }
        }
    }

    if cost_columns.cost.is_some() {
        primary.set_column(columns::COST, costs);
    }
    if cost_columns.msrp.is_some() {
        primary.set_column(columns::MSRP, msrps);
    }

    stats.applied = true;
    stats.primary_column = Some(primary_name.to_string());
    stats.secondary_codes = index.len();
    stats.matched_codes = matched_codes.len();

    tracing::info!(
        "コストマージ: {}行一致（コード{}件 / コストファイル{}件）",
        stats.matched_rows,
        stats.matched_codes,
        stats.secondary_codes
    );

    (primary, stats)
}

/// COST・MSRP列を数値に揃える
///
/// COSTは正の数以外を0に、MSRPは正の数以外を空にする（「原価0」と「MSRP不明」を区別する）。
pub fn coerce_cost_columns(table: &mut Table) {
    table.map_column(columns::COST, |cell| {
        CellValue::Number(cell.as_f64().filter(|v| *v > 0.0).unwrap_or(0.0))
    });
    table.map_column(columns::MSRP, |cell| {
        cell.as_f64()
            .filter(|v| *v > 0.0)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Empty)
    });
}

/// 送料・諸経費を全行のCOSTに加算する（COST列がなければ何もしない）
pub fn add_extra_costs(table: &mut Table, shipping: f64, misc: f64) {
    let extra = shipping + misc;
    if extra == 0.0 {
        return;
    }
    if table.map_column(columns::COST, |cell| {
        CellValue::Number(cell.as_f64().unwrap_or(0.0) + extra)
    }) {
        tracing::debug!("COSTに送料・諸経費 {:.2} を加算", extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn primary() -> Table {
        Table::from_rows(
            headers(&["ASIN", "UPC"]),
            vec![
                vec!["A1".into(), "12345678".into()],
                vec!["A2".into(), CellValue::Number(12345678905.0)],
                vec!["A3".into(), "nan".into()],
            ],
        )
    }

    fn cost_file() -> Table {
        Table::from_rows(
            headers(&["UPC Code", "Unit Cost", "MSRP $"]),
            vec![
                vec!["000012345678".into(), CellValue::Number(4.5), CellValue::Number(19.99)],
                vec!["012345678905".into(), CellValue::Number(-1.0), "n/a".into()],
                vec!["012345678905".into(), CellValue::Number(99.0), CellValue::Number(99.0)],
                vec!["nan".into(), CellValue::Number(1.0), CellValue::Number(1.0)],
            ],
        )
    }

    #[test]
    fn test_discover_prefers_imported_code() {
        let cols = CostColumns::discover(&headers(&["UPC", "Imported By Code", "COST", "MSRP"]));
        assert_eq!(
            cols,
            Some(CostColumns { identifier: 1, cost: Some(2), msrp: Some(3) })
        );
    }

    #[test]
    fn test_discover_falls_back_to_upc() {
        let cols = CostColumns::discover(&headers(&[" upc ", "cost each"])).unwrap();
        assert_eq!(cols.identifier, 0);
        assert_eq!(cols.cost, Some(1));
        assert_eq!(cols.msrp, None);
    }

    #[test]
    fn test_discover_requires_cost_or_msrp() {
        assert_eq!(CostColumns::discover(&headers(&["UPC", "Price"])), None);
        assert_eq!(CostColumns::discover(&headers(&["SKU", "COST"])), None);
    }

    #[test]
    fn test_merge_without_secondary_is_noop() {
        let table = primary();
        let (merged, stats) = merge_costs(table.clone(), None);
        assert_eq!(merged, table);
        assert!(!stats.applied);
    }

    #[test]
    fn test_merge_first_match_semantics() {
        let secondary = cost_file();
        let (mut merged, stats) = merge_costs(primary(), Some(&secondary));

        assert!(stats.applied);
        assert_eq!(stats.primary_column.as_deref(), Some("UPC"));
        assert_eq!(stats.matched_rows, 2);
        assert_eq!(stats.secondary_codes, 2);
        assert_eq!(merged.len(), 3);

        coerce_cost_columns(&mut merged);
        assert_eq!(merged.cell(0, "COST"), Some(&CellValue::Number(4.5)));
        assert_eq!(merged.cell(0, "MSRP"), Some(&CellValue::Number(19.99)));
        // 重複コードは最初の行（原価-1 → 0, MSRP "n/a" → 空）
        assert_eq!(merged.cell(1, "COST"), Some(&CellValue::Number(0.0)));
        assert_eq!(merged.cell(1, "MSRP"), Some(&CellValue::Empty));
        // 照合不能
        assert_eq!(merged.cell(2, "COST"), Some(&CellValue::Number(0.0)));
        assert_eq!(merged.cell(2, "MSRP"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_merge_skipped_without_primary_identifier() {
        let table = Table::from_rows(headers(&["ASIN"]), vec![vec!["A1".into()]]);
        let secondary = cost_file();
        let (merged, stats) = merge_costs(table.clone(), Some(&secondary));
        assert_eq!(merged, table);
        assert!(!stats.applied);
    }

    #[test]
    fn test_add_extra_costs() {
        let mut table = Table::from_rows(
            headers(&["COST"]),
            vec![vec![CellValue::Number(4.0)], vec![CellValue::Number(0.0)]],
        );
        add_extra_costs(&mut table, 1.25, 0.75);
        assert_eq!(table.cell(0, "COST"), Some(&CellValue::Number(6.0)));
        assert_eq!(table.cell(1, "COST"), Some(&CellValue::Number(2.0)));

        let mut no_cost = Table::from_rows(headers(&["ASIN"]), vec![vec!["A1".into()]]);
        add_extra_costs(&mut no_cost, 1.0, 1.0);
        assert_eq!(no_cost.column_count(), 1);
    }

    #[test]
    fn test_primary_identifier_precedence() {
        let table = Table::new(headers(&["GTIN", "EAN", "UPC"]));
        assert_eq!(primary_identifier(&table), Some((2, "UPC")));
        let table = Table::new(headers(&["GTIN", "Imported by Code"]));
        assert_eq!(primary_identifier(&table), Some((1, "Imported by Code")));
    }
}
