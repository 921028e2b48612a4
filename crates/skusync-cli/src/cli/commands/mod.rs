//! Command implementations and shared service wiring.

mod fetch;
mod link;

pub use fetch::run_fetch;
pub use link::run_link;

use anyhow::Result;
use std::sync::Arc;

use skusync_core::auth;
use skusync_core::config::SyncConfig;
use skusync_core::control::StopSignal;
use skusync_core::locator::ImageLocator;
use skusync_core::rate_limit::RateLimiter;
use skusync_core::resolver::FolderResolver;
use skusync_core::store::{DriveStore, Fetcher, FileStore, HttpFetcher, SheetStore, SheetsClient};

/// Shared services for one invocation: one HTTP client, one rate limiter,
/// one resolver cache across both stages.
pub struct Context {
    pub cfg: SyncConfig,
    pub sheets: Arc<dyn SheetStore>,
    pub resolver: Arc<FolderResolver>,
    pub locator: Arc<ImageLocator>,
    pub fetcher: Arc<dyn Fetcher>,
    pub limiter: Arc<RateLimiter>,
    pub stop: StopSignal,
}

impl Context {
    pub fn build(cfg: SyncConfig) -> Result<Self> {
        let creds = auth::default_provider()?;
        let http = reqwest::Client::new();
        let limiter = Arc::new(RateLimiter::new(cfg.rate_limit_per_minute));

        let drive: Arc<dyn FileStore> = Arc::new(DriveStore::new(http.clone(), Arc::clone(&creds)));
        let sheets: Arc<dyn SheetStore> = Arc::new(SheetsClient::new(http.clone(), creds));
        let resolver = Arc::new(FolderResolver::new(
            Arc::clone(&drive),
            Arc::clone(&limiter),
            cfg.match_policy,
        ));
        let locator = Arc::new(ImageLocator::new(drive, Arc::clone(&limiter)));
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(http));

        let stop = StopSignal::new();
        spawn_ctrl_c_handler(stop.clone());

        Ok(Self {
            cfg,
            sheets,
            resolver,
            locator,
            fetcher,
            limiter,
            stop,
        })
    }

    /// Log how much of the per-minute quota the finished stage consumed.
    pub async fn log_quota_usage(&self) {
        let used_pct = self.limiter.usage().await * 100.0;
        tracing::info!(used_pct, "rate quota usage");
    }
}

/// First Ctrl-C requests a cooperative stop; the run winds down at the next
/// row/batch checkpoint.
fn spawn_ctrl_c_handler(stop: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping at next checkpoint");
            stop.request_stop();
        }
    });
}
