use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters for batch write-back (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per batch (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (doubles per attempt).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// What to do when a SKU search returns more than one matching folder.
///
/// The remote store gives no useful ordering for duplicates, so the choice
/// is explicit rather than implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Take the first result the store returns (legacy behavior).
    #[default]
    First,
    /// Treat an ambiguous SKU as unresolved and skip the row.
    SkipAmbiguous,
}

/// Which sheet columns carry which fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Cell receiving the `=IMAGE(...)` formula.
    pub image: String,
    /// Cell receiving the browsable folder link.
    pub link: String,
    /// Column holding the SKU (the remote folder name).
    pub sku: String,
    /// Column holding the local save-name for downloads.
    pub save_name: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            image: "A".to_string(),
            link: "B".to_string(),
            sku: "C".to_string(),
            save_name: "E".to_string(),
        }
    }
}

impl ColumnLayout {
    /// Rightmost column the row snapshot needs to cover.
    pub fn last_column(&self) -> &str {
        [&self.image, &self.link, &self.sku, &self.save_name]
            .into_iter()
            .max_by_key(|c| crate::a1::column_index(c).unwrap_or(0))
            .map(|c| c.as_str())
            .unwrap_or("A")
    }
}

/// Global configuration loaded from `~/.config/skusync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Worker pool width for the row pipeline.
    pub concurrency: usize,
    /// Rows accumulated before a write-back batch is flushed.
    pub batch_size: usize,
    /// Remote API quota: tokens refilled per minute.
    pub rate_limit_per_minute: u32,
    /// Duplicate-folder policy.
    #[serde(default)]
    pub match_policy: MatchPolicy,
    /// Sheet column layout.
    #[serde(default)]
    pub columns: ColumnLayout,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            batch_size: 50,
            rate_limit_per_minute: 2000,
            match_policy: MatchPolicy::default(),
            columns: ColumnLayout::default(),
            retry: None,
        }
    }
}

impl SyncConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("skusync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Fail-fast validation of per-run inputs before any remote call is made.
pub fn validate_request(spreadsheet_id: &str, start_row: u32) -> Result<()> {
    if spreadsheet_id.trim().is_empty() {
        anyhow::bail!("spreadsheet id must not be empty");
    }
    if start_row < 1 {
        anyhow::bail!("start row is 1-based and must be >= 1");
    }
    Ok(())
}
