use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("シート読み込みエラー: {0}")]
    SheetRead(String),

    #[error("シートにヘッダー行がありません: {0}")]
    EmptySheet(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] scout_formatter_common::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
