//! シートレイアウト設定モジュール
//!
//! 出力シートの行高さ・列幅・配色・注記文言の定義。

/// ヘッダー行の高さ（pt）
pub const HEADER_ROW_HEIGHT: f64 = 55.0;

/// データ行の高さ（pt）
pub const DATA_ROW_HEIGHT: f64 = 50.0;

/// 全列共通の列幅（文字数）
pub const COLUMN_WIDTH: f64 = 15.0;

/// 罫線色
pub const BORDER_COLOR: u32 = 0x000000;

/// 評価ティアの塗り色
pub const GOOD_FILL: u32 = 0x90EE90;
pub const MID_FILL: u32 = 0xFFD580;
pub const POOR_FILL: u32 = 0xFFB6B6;

/// Parent帯の塗り色（出現順に交互）
pub const PARENT_BAND_FILLS: [u32; 2] = [0xFFF7CE, 0xDCE6F1];

/// 注記の作成者名
pub const NOTE_AUTHOR: &str = "System";

pub const NOTE_NO_MATCH: &str = "No matching identifier found in cost file";
pub const NOTE_PACK_ASSUMED: &str = "Assumption: Default value of 7.00 used";
pub const NOTE_REFERRAL_ASSUMED: &str = "Assumption: Default value of 0.15 (15%) used";
pub const NOTE_BEST_COLOR: &str = "This color has the most ratings for this Parent";

/// 書式設定のバッチ行数の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    pub min: usize,
    pub max: usize,
}

impl ChunkBounds {
    pub fn clamp(&self, rows: usize) -> usize {
        rows.clamp(self.min, self.max)
    }
}

/// デスクトップ実行時
pub const DESKTOP_CHUNK_BOUNDS: ChunkBounds = ChunkBounds { min: 200, max: 5000 };

/// サービス実行時
pub const SERVICE_CHUNK_BOUNDS: ChunkBounds = ChunkBounds { min: 500, max: 5000 };

/// 推奨バッチ行数の範囲
pub const RECOMMENDED_CHUNK_BOUNDS: ChunkBounds = ChunkBounds { min: 500, max: 4000 };

/// 行数から推奨バッチ行数を求める（行数の1/4を500〜4000に収める）
pub fn recommend_chunk_size(rows: usize) -> usize {
    RECOMMENDED_CHUNK_BOUNDS.clamp(rows / 4)
}
