//! シート読み込み
//!
//! 先頭シートのヘッダー行と値を `Table` に変換する。

use crate::error::{Result, ScoutError};
use calamine::{open_workbook_auto, Data, Reader};
use scout_formatter_common::{CellValue, Table};
use std::collections::HashMap;
use std::path::Path;

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::text(v.as_str()),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(v) => CellValue::text(v.to_string()),
        Data::DateTimeIso(v) => CellValue::text(v.as_str()),
        Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

/// ヘッダー名を決める
///
/// 空のヘッダーは `Unnamed: 列番号`、重複は `.1`, `.2` を付けて区別する。
pub fn header_names(cells: &[CellValue], first_column: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = if cell.is_empty() {
                format!("Unnamed: {}", first_column + idx)
            } else {
                cell.as_text()
            };

            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 { name } else { format!("{}.{}", name, count) };
            *count += 1;
            unique
        })
        .collect()
}

/// 先頭シートを読み込む
pub fn load_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(ScoutError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ScoutError::SheetRead(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScoutError::EmptySheet(path.display().to_string()))?
        .map_err(|e| ScoutError::SheetRead(format!("{}: {}", path.display(), e)))?;

    let first_column = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut rows = range.rows();

    let header: Vec<CellValue> = rows
        .next()
        .ok_or_else(|| ScoutError::EmptySheet(path.display().to_string()))?
        .iter()
        .map(cell_value)
        .collect();
    let columns = header_names(&header, first_column);

    let rows = rows.map(|row| row.iter().map(cell_value).collect()).collect();
    let table = Table::from_rows(columns, rows);

    tracing::debug!(
        "{}: {}行 x {}列",
        path.display(),
        table.len(),
        table.column_count()
    );
    Ok(table)
}
