//! Excel保存（CLI版）
//!
//! 出力先と同じフォルダの一時ファイルに書き込み、成功時のみリネームで公開する。

use crate::error::{Result, ScoutError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn save_workbook(xlsx: &[u8], output_path: &Path) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| ScoutError::ExcelGeneration(format!("一時ファイル作成エラー: {}", e)))?;
    temp.write_all(xlsx)
        .map_err(|e| ScoutError::ExcelGeneration(format!("Excel書き込みエラー: {}", e)))?;
    temp.as_file().sync_all()?;

    temp.persist(output_path)
        .map_err(|e| ScoutError::ExcelGeneration(format!("Excel保存エラー: {}", e.error)))?;

    tracing::debug!("{}バイトを保存: {}", xlsx.len(), output_path.display());
    Ok(())
}
