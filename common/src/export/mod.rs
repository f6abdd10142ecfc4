//! 書式付きスプレッドシートの書き出し

#[cfg(feature = "excel")]
pub mod excel_core;
