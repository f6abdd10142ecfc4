pub mod excel;

use crate::error::{Result, ScoutError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// 出力ファイル名の接尾辞
const OUTPUT_SUFFIX: &str = "_formatted";

/// 入力ファイルと同じフォルダの `<入力名>_formatted.xlsx`
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}{}.xlsx", stem, OUTPUT_SUFFIX))
}

/// 出力先を決める（ディレクトリ指定ならその中に既定名で出力）
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => {
            let file_name = default_output_path(input)
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_default();
            path.join(file_name)
        }
        Some(path) if path.extension().is_none() => path.with_extension("xlsx"),
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    }
}

#[cfg(windows)]
fn opener(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(windows, target_os = "macos")))]
fn opener(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}

/// 既定のアプリケーションでファイルを開く
pub fn open_file(path: &Path) -> Result<()> {
    let status = opener(path).status()?;
    if !status.success() {
        return Err(ScoutError::Io(std::io::Error::other(format!(
            "ファイルを開けませんでした (code {:?}): {}",
            status.code(),
            path.display()
        ))));
    }
    Ok(())
}
