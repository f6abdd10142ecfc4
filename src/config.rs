use crate::error::{Result, ScoutError};
use scout_formatter_common::{ChunkProfile, ProcessOptions, SanitizeOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 全行のCOSTに加算する送料
    pub shipping_cost: f64,
    /// 全行のCOSTに加算する諸経費
    pub misc_cost: f64,
    /// 書式設定のバッチ行数（未設定なら行数から推奨値）
    pub chunk_size: Option<usize>,
    pub profile: ChunkProfile,
    /// 識別コードが空の行の除去閾値
    pub sanitize_id_threshold: usize,
    /// キー項目が空の行の除去閾値
    pub sanitize_key_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScoutError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("scout-formatter").join("config.json"))
    }

    fn default_config() -> Self {
        let sanitize = SanitizeOptions::default();
        Self {
            shipping_cost: 0.0,
            misc_cost: 0.0,
            chunk_size: None,
            profile: ChunkProfile::Desktop,
            sanitize_id_threshold: sanitize.identifier_missing_max,
            sanitize_key_threshold: sanitize.key_missing_max,
        }
    }

    pub fn set_shipping_cost(&mut self, cost: f64) -> Result<()> {
        self.shipping_cost = validate_cost("送料", cost)?;
        Ok(())
    }

    pub fn set_misc_cost(&mut self, cost: f64) -> Result<()> {
        self.misc_cost = validate_cost("諸経費", cost)?;
        Ok(())
    }

    pub fn set_chunk_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(ScoutError::Config("チャンクサイズは1以上を指定してください".into()));
        }
        self.chunk_size = Some(size);
        Ok(())
    }

    /// 実行オプションに変換（CLI引数で上書きする前の値）
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            shipping_cost: self.shipping_cost,
            misc_cost: self.misc_cost,
            chunk_size: self.chunk_size,
            profile: self.profile,
            sanitize: SanitizeOptions {
                identifier_missing_max: self.sanitize_id_threshold,
                key_missing_max: self.sanitize_key_threshold,
            },
        }
    }
}

fn validate_cost(label: &str, cost: f64) -> Result<f64> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(cost)
    } else {
        Err(ScoutError::Config(format!("{}は0以上の数値を指定してください: {}", label, cost)))
    }
}
