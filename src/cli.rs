use clap::{Parser, Subcommand};
use scout_formatter_common::ChunkProfile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "商品リサーチシート整形・利益計算ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 商品リストを整形して書式付きExcelを出力
    Format {
        /// 商品リスト（xlsx/xls/ods）
        #[arg(required = true)]
        input: PathBuf,

        /// コストファイル（識別コード列とCOST/MSRP列を含むシート）
        #[arg(short, long)]
        cost: Option<PathBuf>,

        /// 出力ファイル（デフォルト: 入力ファイル名_formatted.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 送料（全行のCOSTに加算）
        #[arg(long)]
        shipping: Option<f64>,

        /// 諸経費（全行のCOSTに加算）
        #[arg(long)]
        misc: Option<f64>,

        /// 書式設定のバッチ行数
        #[arg(long)]
        chunk_size: Option<usize>,

        /// 実行プロファイル (desktop/service)
        #[arg(long)]
        profile: Option<ChunkProfile>,

        /// 出力後にファイルを開く
        #[arg(long)]
        open: bool,

        /// 処理結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 入力ファイルの行数・列数と推奨バッチ行数を表示
    Inspect {
        /// 商品リスト
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 送料を設定
        #[arg(long)]
        set_shipping: Option<f64>,

        /// 諸経費を設定
        #[arg(long)]
        set_misc: Option<f64>,

        /// バッチ行数を設定
        #[arg(long)]
        set_chunk_size: Option<usize>,

        /// 実行プロファイルを設定 (desktop/service)
        #[arg(long)]
        set_profile: Option<ChunkProfile>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
