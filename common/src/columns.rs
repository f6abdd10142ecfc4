//! 正規化後の列名定義
//!
//! ヘッダー変換後のシートで使用する列名。
//! 集計・計算で追加される列もここで定義する。

pub const BRAND: &str = "Brand";
pub const PARENT: &str = "Parent";
pub const ASIN: &str = "ASIN";
pub const UPC: &str = "UPC";
pub const EAN: &str = "EAN";
pub const GTIN: &str = "GTIN";
pub const IMPORTED_BY_CODE: &str = "Imported by Code";
pub const TITLE: &str = "Title";
pub const COLOR: &str = "Color";
pub const SIZE: &str = "Size";
pub const SALES_BADGE: &str = "Sales Badge";
pub const RATING_COUNT: &str = "Rating Count";
pub const RATING_CHILD: &str = "Rating - Child";
pub const SALES_RANK: &str = "Sales Rank";
pub const SALES_RANK_30: &str = "Sales Rank 30";
pub const SALES_RANK_90: &str = "Sales Rank 90";
pub const SALES_RANK_180: &str = "Sales Rank 180";
pub const BUY_BOX: &str = "Buy Box";
pub const BUY_BOX_30: &str = "Buy Box 30";
pub const BUY_BOX_90: &str = "Buy Box 90";
pub const BUY_BOX_180: &str = "Buy Box 180";
pub const AMZ_IN_STOCK: &str = "AMZ In Stock %";
pub const BUY_BOX_AMAZON_90: &str = "Buy Box: % Amazon 90 days";
pub const AMAZON_AVAILABILITY: &str = "Amazon Availability";
pub const FBA: &str = "FBA";
pub const FBM: &str = "FBM";
pub const PICK_AND_PACK: &str = "Pick & Pack";
pub const REFERRAL_FEE: &str = "Referral Fee &";

// マージで追加
pub const COST: &str = "COST";
pub const MSRP: &str = "MSRP";

// 集計で追加
pub const TOTAL_PARENT_RATINGS: &str = "Total Parent Ratings";
pub const TOTAL_COLOR_RATINGS: &str = "Total Color Ratings";
pub const TOTAL_RATINGS_COLOR: &str = "Total Ratings Color";

// 利益計算で追加
pub const PROFIT: &str = "Profit";
pub const ROI: &str = "ROI";
pub const PROFIT_MARGIN_BUYBOX: &str = "Profit Margin (Buybox)";
pub const PROFIT_MARGIN_MSRP: &str = "Profit Margin (MSRP)";
pub const MSRP_DIFFERENCE: &str = "MSRP Difference";

/// 販売ランク列（現在値・30/90/180日平均）
pub const SALES_RANK_COLUMNS: [&str; 4] = [SALES_RANK, SALES_RANK_30, SALES_RANK_90, SALES_RANK_180];

/// Buy Box列（優先順）
pub const BUY_BOX_COLUMNS: [&str; 4] = [BUY_BOX, BUY_BOX_30, BUY_BOX_90, BUY_BOX_180];

/// 識別コード列（メインファイル側の照合優先順）
pub const IDENTIFIER_COLUMNS: [&str; 4] = [IMPORTED_BY_CODE, UPC, EAN, GTIN];

/// 文字列のまま保持するパーセント列
pub const PERCENT_TEXT_COLUMNS: [&str; 2] = [AMZ_IN_STOCK, BUY_BOX_AMAZON_90];

/// 並び替えキー
pub const SORT_COLUMNS: [&str; 3] = [PARENT, COLOR, SIZE];

/// 利益計算で使う見なし値: Pick & Pack手数料
pub const DEFAULT_PACK_FEE: f64 = 7.0;

/// 利益計算で使う見なし値: 紹介料率
pub const DEFAULT_REFERRAL_FEE: f64 = 0.15;
