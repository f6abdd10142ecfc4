//! 識別コードの正規化
//!
//! UPC/EAN/GTIN/Imported by Code の表記ゆれ（区切り文字、先頭ゼロ欠落、
//! 表計算ソフトが付ける ".0"）を吸収して照合キーを作る。

use crate::columns;
use crate::types::{is_missing_text, CellValue, Table};
use regex::Regex;

/// UPCの標準桁数
const UPC_LENGTH: usize = 12;

/// ゼロ埋め対象の最短桁数
const MIN_PAD_LENGTH: usize = 8;

lazy_static::lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(r"[-\s_]").unwrap();
}

/// 照合用コードに正規化する
///
/// 空・"nan"・"none" は照合不能として `None`。
/// 数字のみのコードは区切りを除去し、8〜11桁なら12桁にゼロ埋めする。
/// それ以外の文字列は前後空白を除いてそのまま返す。
pub fn normalize_code(raw: &str) -> Option<String> {
    let mut code = raw.trim();
    if let Some(stripped) = code.strip_suffix(".0") {
        code = stripped;
    }

    if is_missing_text(code) {
        return None;
    }

    let digits = SEPARATOR_RE.replace_all(code, "");
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        let len = digits.len();
        if (MIN_PAD_LENGTH..UPC_LENGTH).contains(&len) {
            return Some(format!("{:0>width$}", digits, width = UPC_LENGTH));
        }
        return Some(digits.into_owned());
    }

    Some(code.to_string())
}

/// セル値から照合用コードを作る
pub fn normalize_cell(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && *n >= 0.0 => {
            normalize_code(&format!("{:.0}", n))
        }
        other => normalize_code(&other.as_text()),
    }
}

/// 表示用の識別コードセル（数値はテキスト化、".0" と欠損表記を除去）
pub fn clean_code_cell(cell: &CellValue) -> CellValue {
    let text = match cell {
        CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{:.0}", n),
        other => other.as_text(),
    };

    let text = text.trim();
    let text = text.strip_suffix(".0").unwrap_or(text);
    if is_missing_text(text) {
        CellValue::Empty
    } else {
        CellValue::Text(text.to_string())
    }
}

/// 識別コード列とパーセント列をテキストに揃える
pub fn clean_text_columns(table: &mut Table) {
    for name in columns::IDENTIFIER_COLUMNS {
        table.map_column(name, clean_code_cell);
    }

    for name in columns::PERCENT_TEXT_COLUMNS {
        table.map_column(name, |cell| {
            if cell.is_missing() {
                CellValue::Empty
            } else {
                CellValue::Text(cell.as_text())
            }
        });
    }
}
