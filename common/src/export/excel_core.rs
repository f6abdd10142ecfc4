//! Excel生成（共通ライブラリ）
//!
//! styling.rs の書式ルールを行バッチ単位で適用しながらシートを書き込む。
//! 書式付きセルはバッチごとに生成・破棄し、表全体分を同時に保持しない。
//! ワークシートは定メモリモードで、書き終えた行は一時ファイルへ逐次書き出される。

use crate::error::{Error, Result};
use crate::layout::{
    BORDER_COLOR, COLUMN_WIDTH, DATA_ROW_HEIGHT, HEADER_ROW_HEIGHT, NOTE_AUTHOR,
};
use crate::styling::{CellStyle, NumberFormat, StyledCell, Styler};
use crate::types::{CellValue, Table};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Note, Workbook, Worksheet, XlsxError};
use std::collections::HashMap;

/// 出力シート名
pub const SHEET_NAME: &str = "Sheet1";

fn excel_error(context: &'static str) -> impl Fn(XlsxError) -> Error {
    move |e| Error::Excel(format!("{}: {}", context, e))
}

/// 全セル共通の書式（中央揃え・折り返し・細罫線）
fn base_format() -> Format {
    Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(BORDER_COLOR))
}

/// 書式キャッシュ
///
/// キーは表示形式×塗り色の組み合わせなので件数は有限。
#[derive(Default)]
struct FormatCache {
    formats: HashMap<CellStyle, Format>,
}

impl FormatCache {
    fn get(&mut self, style: CellStyle) -> &Format {
        self.formats.entry(style).or_insert_with(|| {
            let mut format = base_format();
            if let Some(number_format) = style.number_format {
                format = format.set_num_format(number_format.pattern());
            }
            if let Some(fill) = style.fill {
                format = format.set_background_color(Color::RGB(fill.rgb()));
            }
            format
        })
    }
}

fn excel_row(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| Error::Excel(format!("行数が上限を超えています: {}", index)))
}

fn excel_col(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| Error::Excel(format!("列数が上限を超えています: {}", index)))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &StyledCell,
    format: &Format,
) -> Result<()> {
    let as_text = cell.style.number_format == Some(NumberFormat::Text);

    match &cell.value {
        CellValue::Empty => worksheet.write_blank(row, col, format),
        CellValue::Text(s) => worksheet.write_string_with_format(row, col, s.as_str(), format),
        CellValue::Number(n) | CellValue::Assumed(n) if !n.is_finite() => {
            worksheet.write_blank(row, col, format)
        }
        // 文字列列の数値は指数表記にならないよう文字列で書く
        value @ (CellValue::Number(_) | CellValue::Assumed(_)) if as_text => {
            worksheet.write_string_with_format(row, col, value.as_text(), format)
        }
        CellValue::Number(n) | CellValue::Assumed(n) => {
            worksheet.write_number_with_format(row, col, *n, format)
        }
        CellValue::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, format),
    }
    .map_err(excel_error("セル書き込みエラー"))?;

    if let Some(text) = cell.note {
        let note = Note::new(text).set_author(NOTE_AUTHOR);
        worksheet
            .insert_note(row, col, &note)
            .map_err(excel_error("注記書き込みエラー"))?;
    }

    Ok(())
}

fn write_header(worksheet: &mut Worksheet, columns: &[String]) -> Result<()> {
    let header_format = base_format().set_bold();

    worksheet
        .set_row_height(0, HEADER_ROW_HEIGHT)
        .map_err(excel_error("行高さ設定エラー"))?;

    for (idx, name) in columns.iter().enumerate() {
        let col = excel_col(idx)?;
        worksheet
            .set_column_width(col, COLUMN_WIDTH)
            .map_err(excel_error("列幅設定エラー"))?;
        worksheet
            .write_string_with_format(0, col, name.as_str(), &header_format)
            .map_err(excel_error("ヘッダー書き込みエラー"))?;
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(excel_error("ウィンドウ枠固定エラー"))?;
    Ok(())
}

/// 書式付きExcelをバッファに生成
///
/// # Arguments
/// * `table` - 並び替え済みの表
/// * `styler` - 同じ表から生成した書式設定器
/// * `chunk_size` - 1バッチあたりの行数
/// * `on_chunk` - バッチ完了ごとに (書き込み済み行数, 全行数) で呼ばれる
pub fn generate_excel_buffer<F>(
    table: &Table,
    styler: &Styler,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<Vec<u8>>
where
    F: FnMut(usize, usize),
{
    let mut workbook = Workbook::new();
    // 行は昇順にしか書けない
    let worksheet = workbook.add_worksheet_with_constant_memory();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(excel_error("シート名設定エラー"))?;

    write_header(worksheet, table.columns())?;

    let chunk_size = chunk_size.max(1);
    let total = table.len();
    let mut cache = FormatCache::default();

    for (chunk_idx, rows) in table.rows().chunks(chunk_size).enumerate() {
        let start = chunk_idx * chunk_size;
        let styled = styler.style_rows(rows);

        for (offset, cells) in styled.iter().enumerate() {
            let row = excel_row(start + offset + 1)?;
            worksheet
                .set_row_height(row, DATA_ROW_HEIGHT)
                .map_err(excel_error("行高さ設定エラー"))?;

            for (idx, cell) in cells.iter().enumerate() {
                let format = cache.get(cell.style);
                write_cell(worksheet, row, excel_col(idx)?, cell, format)?;
            }
        }
        drop(styled);

        let done = start + rows.len();
        tracing::debug!("書式設定: {}/{}行", done, total);
        on_chunk(done, total);
    }

    workbook
        .save_to_buffer()
        .map_err(excel_error("Excel保存エラー"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::BestColorMap;

    fn sample() -> Table {
        Table::from_rows(
            vec!["Parent".into(), "UPC".into(), "Pick & Pack".into(), "Profit".into()],
            (0..5)
                .map(|i| {
                    vec![
                        format!("P{}", i / 2).into(),
                        "012345678905".into(),
                        CellValue::Assumed(7.0),
                        CellValue::Number(i as f64),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_generate_excel_buffer_reports_chunks() {
        let table = sample();
        let styler = Styler::new(&table, BestColorMap::default());
        let mut progress = Vec::new();

        let buffer = generate_excel_buffer(&table, &styler, 2, |done, total| {
            progress.push((done, total));
        })
        .expect("Excel生成に失敗");

        assert!(buffer.starts_with(b"PK"), "xlsxはZIP形式であること");
        assert_eq!(progress, vec![(2, 5), (4, 5), (5, 5)]);
    }

    #[test]
    fn test_generate_excel_buffer_empty_table() {
        let table = Table::new(vec!["Title".into()]);
        let styler = Styler::new(&table, BestColorMap::default());
        let mut calls = 0;
        let buffer = generate_excel_buffer(&table, &styler, 500, |_, _| calls += 1)
            .expect("Excel生成に失敗");
        assert!(!buffer.is_empty());
        assert_eq!(calls, 0);
    }

    fn zip_part(buffer: &[u8], name: &str) -> String {
        use std::io::Read;

        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(buffer)).expect("ZIPとして読めること");
        let mut part = archive.by_name(name).expect("パーツが存在すること");
        let mut xml = String::new();
        part.read_to_string(&mut xml).expect("XMLの読み込みに失敗");
        xml
    }

    #[test]
    fn test_multi_batch_output_reads_back() {
        use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

        let table = Table::from_rows(
            vec![
                "Parent".into(),
                "UPC".into(),
                "Pick & Pack".into(),
                "COST".into(),
                "Profit".into(),
            ],
            (0..7)
                .map(|i| {
                    vec![
                        format!("P{}", i / 2).into(),
                        "012345678905".into(),
                        if i % 2 == 0 { CellValue::Assumed(7.0) } else { CellValue::Number(7.0) },
                        CellValue::Number(if i == 3 { 0.0 } else { 5.0 }),
                        CellValue::Number(i as f64),
                    ]
                })
                .collect(),
        );
        let styler = Styler::new(&table, BestColorMap::default());
        let mut batches = 0;
        let buffer = generate_excel_buffer(&table, &styler, 2, |_, _| batches += 1)
            .expect("Excel生成に失敗");
        assert_eq!(batches, 4);

        let mut workbook: Xlsx<_> =
            open_workbook_from_rs(std::io::Cursor::new(buffer.clone())).expect("xlsxとして読めること");
        let range = workbook.worksheet_range(SHEET_NAME).expect("シート読み込み失敗");
        assert_eq!(range.height(), 8);
        assert_eq!(range.get_value((0, 2)), Some(&Data::String("Pick & Pack".into())));
        for i in 0..7u32 {
            let row = i + 1;
            assert_eq!(
                range.get_value((row, 0)),
                Some(&Data::String(format!("P{}", i / 2)))
            );
            assert_eq!(range.get_value((row, 1)), Some(&Data::String("012345678905".into())));
            assert_eq!(range.get_value((row, 2)), Some(&Data::Float(7.0)));
            assert_eq!(range.get_value((row, 4)), Some(&Data::Float(i as f64)));
        }

        // 見なし値4件 + COST 0 の1件
        let comments = zip_part(&buffer, "xl/comments1.xml");
        assert_eq!(comments.matches("<comment ").count(), 5);
        assert_eq!(comments.matches(crate::layout::NOTE_PACK_ASSUMED).count(), 4);
        assert_eq!(comments.matches(crate::layout::NOTE_NO_MATCH).count(), 1);

        let styles = zip_part(&buffer, "xl/styles.xml").to_uppercase();
        for rgb in ["FFB6B6", "FFD580", "FFF7CE", "DCE6F1"] {
            assert!(styles.contains(rgb), "塗り色 {} が出力されていること", rgb);
        }
    }

    #[test]
    fn test_format_cache_reuses_formats() {
        let table = sample();
        let styler = Styler::new(&table, BestColorMap::default());
        let mut cache = FormatCache::default();
        for cells in styler.style_rows(table.rows()) {
            for cell in cells {
                cache.get(cell.style);
            }
        }
        // Parent帯2色 + UPC + Pick & Pack(見なし) + Profit
        assert_eq!(cache.formats.len(), 5);
    }
}
