use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scout_formatter::{cli, config, error, export, loader};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, ScoutError};
use scout_formatter_common::headers::canonical_name;
use scout_formatter_common::{process, recommend_chunk_size, OutputArtifact, ProcessOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{msg:20} [{bar:40.cyan/blue}] {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("=> "));
    bar
}

/// 読み込みから書式設定までをブロッキングワーカーで実行し、進捗をバーに反映する
async fn run_pipeline(
    input: PathBuf,
    cost: Option<PathBuf>,
    options: ProcessOptions,
) -> Result<OutputArtifact> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<(f64, String)>();

    let worker = tokio::task::spawn_blocking(move || -> Result<OutputArtifact> {
        let primary = loader::load_table(&input)?;
        let secondary = cost.as_deref().map(loader::load_table).transpose()?;

        let sink = move |fraction: f64, label: &str| {
            // 受信側が閉じていても処理は続ける
            let _ = tx.send((fraction, label.to_string()));
        };
        Ok(process(primary, secondary.as_ref(), &options, &sink)?)
    });

    let bar = progress_bar();
    while let Some((fraction, label)) = rx.recv().await {
        bar.set_position((fraction * 100.0).round() as u64);
        bar.set_message(label);
    }

    let result = worker
        .await
        .map_err(|e| ScoutError::ExcelGeneration(format!("ワーカー実行エラー: {}", e)))?;
    match &result {
        Ok(_) => bar.finish(),
        Err(_) => bar.abandon(),
    }
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Format { input, cost, output, shipping, misc, chunk_size, profile, open, json } => {
            println!("📊 scout-formatter - シート整形\n");

            let mut options = config.process_options();
            if let Some(shipping) = shipping {
                options.shipping_cost = shipping;
            }
            if let Some(misc) = misc {
                options.misc_cost = misc;
            }
            if chunk_size.is_some() {
                options.chunk_size = chunk_size;
            }
            if let Some(profile) = profile {
                options.profile = profile;
            }

            let output_path = export::resolve_output_path(&input, output.as_deref());

            // 1. 読み込み〜書式設定
            println!("[1/2] 整形中...");
            let artifact = run_pipeline(input, cost, options).await?;
            let summary = &artifact.summary;
            println!(
                "✔ {}行 → {}行（除去 {}行）",
                summary.input_rows, summary.output_rows, summary.removed_rows
            );
            match &summary.merge_column {
                Some(column) => println!(
                    "✔ コストマージ: {}で{}行一致（コード{}件）",
                    column, summary.merged_rows, summary.matched_codes
                ),
                None => println!("- コストマージなし"),
            }
            println!();

            // 2. 保存
            println!("[2/2] 保存中...");
            export::excel::save_workbook(&artifact.xlsx, &output_path)?;
            println!("✔ Excel出力: {}", output_path.display());

            if json {
                println!("{}", summary.to_json()?);
            }

            if open {
                if let Err(e) = export::open_file(&output_path) {
                    tracing::warn!("ファイルを開けませんでした: {}", e);
                }
            }

            println!("\n✅ 完了");
        }

        Commands::Inspect { input } => {
            let table = loader::load_table(&input)?;
            let recognized = table
                .columns()
                .iter()
                .filter(|name| canonical_name(name).is_some())
                .count();

            println!("ファイル: {}", input.display());
            println!("  行数: {}", table.len());
            println!("  列数: {}（認識済み {}列）", table.column_count(), recognized);
            println!("  推奨バッチ行数: {}", recommend_chunk_size(table.len()));
        }

        Commands::Config { set_shipping, set_misc, set_chunk_size, set_profile, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(cost) = set_shipping {
                config.set_shipping_cost(cost)?;
                println!("✔ 送料を設定しました: {:.2}", cost);
                changed = true;
            }
            if let Some(cost) = set_misc {
                config.set_misc_cost(cost)?;
                println!("✔ 諸経費を設定しました: {:.2}", cost);
                changed = true;
            }
            if let Some(size) = set_chunk_size {
                config.set_chunk_size(size)?;
                println!("✔ バッチ行数を設定しました: {}", size);
                changed = true;
            }
            if let Some(profile) = set_profile {
                config.profile = profile;
                println!("✔ プロファイルを設定しました: {}", profile);
                changed = true;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  送料: {:.2}", config.shipping_cost);
                println!("  諸経費: {:.2}", config.misc_cost);
                println!(
                    "  バッチ行数: {}",
                    config.chunk_size.map(|s| s.to_string()).unwrap_or_else(|| "自動".into())
                );
                println!("  プロファイル: {}", config.profile);
                println!(
                    "  行除去閾値: 識別コード空 ≤{}, キー項目空 ≤{}",
                    config.sanitize_id_threshold, config.sanitize_key_threshold
                );
            }
        }
    }

    Ok(())
}
