//! 集計モジュール
//!
//! Parent単位・Parent×Color単位の評価数合計と、
//! Parentごとに最も評価の多いColor（ベストカラー）を求める。

use crate::columns;
use crate::types::{CellValue, Table};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Parentごとのベストカラー
///
/// 書式設定（注記・ハイライト）でのみ使用し、出力列にはしない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestColorMap {
    best: HashMap<String, HashSet<String>>,
}

impl BestColorMap {
    pub fn is_best(&self, parent: &str, color: &str) -> bool {
        self.best
            .get(parent)
            .map(|colors| colors.contains(color))
            .unwrap_or(false)
    }

    /// 対象Parent数
    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    fn insert(&mut self, parent: String, color: String) {
        self.best.entry(parent).or_default().insert(color);
    }
}

/// キーごとの合計を各行に配る
fn broadcast_sums<K>(keys: &[K], values: &[f64]) -> (Vec<f64>, HashMap<K, f64>)
where
    K: Eq + Hash + Clone,
{
    let mut sums: HashMap<K, f64> = HashMap::new();
    for (key, value) in keys.iter().zip(values) {
        *sums.entry(key.clone()).or_insert(0.0) += value;
    }
    let per_row = keys
        .iter()
        .map(|k| sums.get(k).copied().unwrap_or(0.0))
        .collect();
    (per_row, sums)
}

fn text_column(table: &Table, idx: usize) -> Vec<String> {
    table.rows().iter().map(|row| row[idx].as_text()).collect()
}

/// 評価数列を整数に揃える（欠損・不正値は0）
fn coerce_integer_column(table: &mut Table, name: &str) -> Option<Vec<f64>> {
    let mut values = Vec::with_capacity(table.len());
    let found = table.map_column(name, |cell| {
        let n = cell.as_f64().map(f64::trunc).unwrap_or(0.0);
        values.push(n);
        CellValue::Number(n)
    });
    found.then_some(values)
}

/// 数値列に揃える（欠損・不正値は0）
fn coerce_numeric_column(table: &mut Table, name: &str) -> Option<Vec<f64>> {
    let mut values = Vec::with_capacity(table.len());
    let found = table.map_column(name, |cell| {
        let n = cell.as_f64().unwrap_or(0.0);
        values.push(n);
        CellValue::Number(n)
    });
    found.then_some(values)
}

fn number_cells(values: Vec<f64>) -> Vec<CellValue> {
    values.into_iter().map(CellValue::Number).collect()
}

/// 集計列を追加し、ベストカラーを返す
///
/// 必要な列がない集計はスキップする。
pub fn aggregate(table: &mut Table) -> BestColorMap {
    let mut best_colors = BestColorMap::default();

    let Some(parent_idx) = table.column_index(columns::PARENT) else {
        return best_colors;
    };
    let parents = text_column(table, parent_idx);
    let colors = table
        .column_index(columns::COLOR)
        .map(|idx| text_column(table, idx));
    let pairs: Option<Vec<(String, String)>> = colors.as_ref().map(|colors| {
        parents.iter().cloned().zip(colors.iter().cloned()).collect()
    });

    if let Some(ratings) = coerce_integer_column(table, columns::RATING_COUNT) {
        let (per_parent, _) = broadcast_sums(&parents, &ratings);
        table.set_column(columns::TOTAL_PARENT_RATINGS, number_cells(per_parent));

        if let Some(pairs) = &pairs {
            let (per_color, _) = broadcast_sums(pairs, &ratings);
            table.set_column(columns::TOTAL_COLOR_RATINGS, number_cells(per_color));
        }
    }

    if let Some(pairs) = &pairs {
        if let Some(child_ratings) = coerce_numeric_column(table, columns::RATING_CHILD) {
            let (per_row, sums) = broadcast_sums(pairs, &child_ratings);
            table.set_column(columns::TOTAL_RATINGS_COLOR, number_cells(per_row));

            let mut max_by_parent: HashMap<&str, f64> = HashMap::new();
            for ((parent, _), sum) in &sums {
                let entry = max_by_parent.entry(parent.as_str()).or_insert(f64::MIN);
                if *sum > *entry {
                    *entry = *sum;
                }
            }
            for ((parent, color), sum) in &sums {
                if max_by_parent.get(parent.as_str()) == Some(sum) {
                    best_colors.insert(parent.clone(), color.clone());
                }
            }

            tracing::debug!(
                "Total Ratings Color: {}組, ベストカラー対象Parent: {}件",
                sums.len(),
                best_colors.len()
            );
        }
    }

    best_colors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<CellValue>>) -> Table {
        Table::from_rows(
            vec![
                "Parent".into(),
                "Color".into(),
                "Rating Count".into(),
                "Rating - Child".into(),
            ],
            rows,
        )
    }

    fn row(parent: &str, color: &str, count: CellValue, child: CellValue) -> Vec<CellValue> {
        vec![parent.into(), color.into(), count, child]
    }

    #[test]
    fn test_total_parent_ratings() {
        let mut t = table(vec![
            row("P1", "Red", 3.0.into(), 1.0.into()),
            row("P1", "Blue", 5.0.into(), 1.0.into()),
            row("P2", "Red", 2.0.into(), 1.0.into()),
        ]);
        aggregate(&mut t);
        assert_eq!(t.cell(0, "Total Parent Ratings"), Some(&CellValue::Number(8.0)));
        assert_eq!(t.cell(1, "Total Parent Ratings"), Some(&CellValue::Number(8.0)));
        assert_eq!(t.cell(2, "Total Parent Ratings"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_total_color_ratings_and_missing_counts() {
        let mut t = table(vec![
            row("P1", "Red", 3.0.into(), CellValue::Empty),
            row("P1", "Red", "oops".into(), "4".into()),
            row("P1", "Blue", 5.7.into(), 2.0.into()),
        ]);
        aggregate(&mut t);
        assert_eq!(t.cell(0, "Total Color Ratings"), Some(&CellValue::Number(3.0)));
        assert_eq!(t.cell(1, "Rating Count"), Some(&CellValue::Number(0.0)));
        assert_eq!(t.cell(2, "Total Color Ratings"), Some(&CellValue::Number(5.0)));
        assert_eq!(t.cell(0, "Total Ratings Color"), Some(&CellValue::Number(4.0)));
        assert_eq!(t.cell(2, "Total Ratings Color"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_best_color_ties_all_marked() {
        let mut t = table(vec![
            row("P1", "Red", 1.0.into(), 2.0.into()),
            row("P1", "Red", 1.0.into(), 3.0.into()),
            row("P1", "Blue", 1.0.into(), 5.0.into()),
            row("P1", "Green", 1.0.into(), 1.0.into()),
            row("P2", "Black", 1.0.into(), 0.0.into()),
        ]);
        let best = aggregate(&mut t);
        assert!(best.is_best("P1", "Red"));
        assert!(best.is_best("P1", "Blue"));
        assert!(!best.is_best("P1", "Green"));
        assert!(best.is_best("P2", "Black"));
        assert_eq!(best.len(), 2);
    }

    #[test]
    fn test_degenerate_keys_grouped_literally() {
        let mut t = table(vec![
            row("nan", "nan", 1.0.into(), 1.0.into()),
            vec![CellValue::Empty, CellValue::Empty, 2.0.into(), 1.0.into()],
            row("nan", "nan", 4.0.into(), 1.0.into()),
        ]);
        let best = aggregate(&mut t);
        assert_eq!(t.cell(0, "Total Parent Ratings"), Some(&CellValue::Number(5.0)));
        assert_eq!(t.cell(1, "Total Parent Ratings"), Some(&CellValue::Number(2.0)));
        assert!(best.is_best("nan", "nan"));
    }

    #[test]
    fn test_missing_columns_skip() {
        let mut t = Table::from_rows(vec!["Title".into()], vec![vec!["x".into()]]);
        let best = aggregate(&mut t);
        assert!(best.is_empty());
        assert_eq!(t.column_count(), 1);
    }
}
