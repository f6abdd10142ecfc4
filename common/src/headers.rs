//! ヘッダー変換モジュール
//!
//! エクスポート元の長い列名を短い正規名に変換し、
//! 不要な列（Locale, Image, Unnamed...）を削除する。

use crate::types::Table;

/// 削除する列
const DROPPED_COLUMNS: [&str; 2] = ["Locale", "Image"];

/// ヘッダーなし列の接頭辞
const UNNAMED_PREFIX: &str = "Unnamed";

/// 元の列名 → 正規列名
pub const HEADER_MAP: [(&str, &str); 28] = [
    ("Brand", "Brand"),
    ("Parent ASIN", "Parent"),
    ("ASIN", "ASIN"),
    ("Product Codes: UPC", "UPC"),
    ("Product Codes: EAN", "EAN"),
    ("Product Codes: GTIN", "GTIN"),
    ("Imported by Code", "Imported by Code"),
    ("Title", "Title"),
    ("Color", "Color"),
    ("Size", "Size"),
    ("Bought in past month", "Sales Badge"),
    ("Reviews: Rating Count", "Rating Count"),
    ("Reviews: Review Count - Format Specific", "Rating - Child"),
    ("Sales Rank: Current", "Sales Rank"),
    ("Sales Rank: 30 days avg.", "Sales Rank 30"),
    ("Sales Rank: 90 days avg.", "Sales Rank 90"),
    ("Sales Rank: 180 days avg.", "Sales Rank 180"),
    ("Buy Box 🚚: Current", "Buy Box"),
    ("Buy Box 🚚: 30 days avg.", "Buy Box 30"),
    ("Buy Box 🚚: 90 days avg.", "Buy Box 90"),
    ("Buy Box 🚚: 180 days avg.", "Buy Box 180"),
    ("Amazon: 90 days OOS", "AMZ In Stock %"),
    ("Buy Box: % Amazon 90 days", "Buy Box: % Amazon 90 days"),
    ("Amazon: Availability of the Amazon offer", "Amazon Availability"),
    ("Count of retrieved live offers: New, FBA", "FBA"),
    ("Count of retrieved live offers: New, FBM", "FBM"),
    ("FBA Pick&Pack Fee", "Pick & Pack"),
    ("Referral Fee %", "Referral Fee &"),
];

/// 元の列名に対応する正規名
pub fn canonical_name(source: &str) -> Option<&'static str> {
    HEADER_MAP
        .iter()
        .find(|(from, _)| *from == source)
        .map(|(_, to)| *to)
}

/// ヘッダーを正規名に変換する
///
/// 2回適用しても結果は変わらない（変換後の名前は変換元に含まれないか、自身に写る）。
pub fn map_headers(mut table: Table) -> Table {
    table.drop_columns(|name| DROPPED_COLUMNS.contains(&name));

    let renames: Vec<(String, &'static str)> = table
        .columns()
        .iter()
        .filter_map(|name| {
            canonical_name(name)
                .filter(|to| *to != name)
                .map(|to| (name.clone(), to))
        })
        .collect();

    for (from, to) in renames {
        table.rename_column(&from, to);
    }

    table.drop_columns(|name| name.starts_with(UNNAMED_PREFIX));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn export_table() -> Table {
        Table::from_rows(
            vec![
                "Locale".into(),
                "Image".into(),
                "Parent ASIN".into(),
                "Bought in past month".into(),
                "Unnamed: 19".into(),
                "Custom Column".into(),
                "FBA Pick&Pack Fee".into(),
            ],
            vec![vec![
                "com".into(),
                "http://img".into(),
                "B000PARENT".into(),
                "100+ bought".into(),
                CellValue::Empty,
                "keep".into(),
                CellValue::Number(3.5),
            ]],
        )
    }

    #[test]
    fn test_map_headers() {
        let mapped = map_headers(export_table());
        assert_eq!(
            mapped.columns(),
            &[
                "Parent".to_string(),
                "Sales Badge".to_string(),
                "Custom Column".to_string(),
                "Pick & Pack".to_string(),
            ]
        );
        assert_eq!(mapped.cell(0, "Parent"), Some(&CellValue::Text("B000PARENT".into())));
        assert_eq!(mapped.cell(0, "Pick & Pack"), Some(&CellValue::Number(3.5)));
    }

    #[test]
    fn test_map_headers_idempotent() {
        let once = map_headers(export_table());
        let twice = map_headers(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_map_headers_without_optional_columns() {
        let table = Table::new(vec!["Title".into(), "ASIN".into()]);
        let mapped = map_headers(table.clone());
        assert_eq!(mapped, table);
    }

    #[test]
    fn test_header_map_entries_unique() {
        let mut sources: Vec<&str> = HEADER_MAP.iter().map(|(from, _)| *from).collect();
        sources.sort();
        sources.dedup();
        assert_eq!(sources.len(), HEADER_MAP.len());
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("Referral Fee %"), Some("Referral Fee &"));
        assert_eq!(canonical_name("Referral Fee &"), None);
    }
}
