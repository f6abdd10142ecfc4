//! Scout Formatter Common Library
//!
//! 商品リサーチ用スプレッドシートの整形処理（CLIとサービスで共有）

pub mod types;
pub mod columns;
pub mod layout;
pub mod error;
pub mod normalizer;
pub mod headers;
pub mod merge;
pub mod sanitizer;
pub mod aggregate;
pub mod metrics;
pub mod styling;
pub mod pipeline;
pub mod export;

pub use types::{CellValue, Table};
pub use error::{Error, Result};
pub use aggregate::BestColorMap;
pub use layout::recommend_chunk_size;
pub use merge::MergeStats;
pub use metrics::Metric;
pub use sanitizer::SanitizeOptions;
pub use pipeline::{
    no_progress, prepare, ChunkProfile, OutputArtifact, PreparedTable, ProcessOptions,
    ProcessSummary, ProgressSink,
};

#[cfg(feature = "excel")]
pub use pipeline::process;
