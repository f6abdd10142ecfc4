//! シートデータの型定義
//!
//! - CellValue: セル値（見なし値を含む）
//! - Table: ヘッダー付きの行データ

use std::fmt;

/// セル値
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// 元データが空だったため既定値で補完した値（出力時に注記付きの数値へ展開）
    Assumed(f64),
}

impl CellValue {
    /// 文字列から生成（空白のみは空セル扱い）
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    /// 空セルまたは空白文字列
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 空、または "nan" / "none"（スプレッドシート出力の欠損表記）
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Number(n) => n.is_nan(),
            CellValue::Text(s) => is_missing_text(s),
            other => other.is_empty(),
        }
    }

    /// 数値として解釈（文字列は前後空白を除いてパース）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::Assumed(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_assumed(&self) -> bool {
        matches!(self, CellValue::Assumed(_))
    }

    /// 表示用テキスト（グループ化・並び替え・照合キーに使用）
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) | CellValue::Assumed(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// 空文字・"nan"・"none"（大文字小文字無視）
pub fn is_missing_text(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("none")
}

/// ヘッダー付きの表
///
/// 列順は挿入順を保持する（出力時の列順になる）。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// 行データ付きで生成（列数に満たない行は空セルで埋め、超える分は切り捨てる）
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// 指定行・列のセル（列がなければ None）
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// 列名を変更（元の列がなければ false）
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// 条件に一致する列を削除
    pub fn drop_columns<F>(&mut self, predicate: F)
    where
        F: Fn(&str) -> bool,
    {
        let keep: Vec<bool> = self.columns.iter().map(|c| !predicate(c)).collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        let mut i = 0;
        self.columns.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });

        for row in &mut self.rows {
            let mut i = 0;
            row.retain(|_| {
                let k = keep[i];
                i += 1;
                k
            });
        }
    }

    /// 列を設定（既存なら値を置換、なければ末尾に追加）
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(CellValue::Empty);
                }
                self.columns.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    /// 列の各セルを変換
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// 条件を満たす行だけ残す
    pub fn retain_rows<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        self.rows.retain(|row| predicate(row));
    }

    /// 行を安定ソート
    pub fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Vec<CellValue>, &Vec<CellValue>) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec!["x".into(), 1.0.into(), CellValue::Empty],
                vec!["y".into(), 2.0.into()],
            ],
        )
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = sample();
        assert_eq!(table.rows()[1].len(), 3);
        assert_eq!(table.rows()[1][2], CellValue::Empty);
    }

    #[test]
    fn test_drop_columns() {
        let mut table = sample();
        table.drop_columns(|c| c == "B");
        assert_eq!(table.columns(), &["A".to_string(), "C".to_string()]);
        assert_eq!(table.rows()[0], vec![CellValue::Text("x".into()), CellValue::Empty]);
    }

    #[test]
    fn test_set_column_appends_and_replaces() {
        let mut table = sample();
        table.set_column("D", vec![CellValue::Number(9.0), CellValue::Empty]);
        assert_eq!(table.column_index("D"), Some(3));

        table.set_column("A", vec!["p".into(), "q".into()]);
        assert_eq!(table.cell(1, "A"), Some(&CellValue::Text("q".into())));
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn test_cell_value_text_and_number() {
        assert_eq!(CellValue::Number(12.0).as_text(), "12");
        assert_eq!(CellValue::Number(0.5).as_text(), "0.5");
        assert_eq!(CellValue::text("   "), CellValue::Empty);
        assert_eq!(CellValue::Text(" 3.5 ".into()).as_f64(), Some(3.5));
        assert_eq!(CellValue::Assumed(7.0).as_f64(), Some(7.0));
        assert_eq!(CellValue::Text("abc".into()).as_f64(), None);
    }

    #[test]
    fn test_is_missing() {
        assert!(CellValue::Empty.is_missing());
        assert!(CellValue::Text("NaN".into()).is_missing());
        assert!(CellValue::Text(" None ".into()).is_missing());
        assert!(CellValue::Number(f64::NAN).is_missing());
        assert!(!CellValue::Number(0.0).is_missing());
        assert!(!CellValue::Text("0".into()).is_missing());
    }
}
