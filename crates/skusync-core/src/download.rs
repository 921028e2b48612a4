//! Download stage: fetch each row's first image to local disk.
//!
//! Re-runs are idempotent: a destination file that already exists is never
//! re-fetched. Writes go to a `.part` file that is renamed into place only
//! after the full body has been flushed, so a crash mid-write cannot leave
//! a truncated final file.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::control::StopSignal;
use crate::drive_link;
use crate::locator::ImageLocator;
use crate::pipeline::SheetRow;
use crate::store::Fetcher;

/// Temporary file suffix used before the rename into place.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Default, Clone)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub aborted: bool,
}

impl DownloadReport {
    pub fn summary(&self) -> String {
        format!(
            "{} downloaded, {} skipped, {} failed{}",
            self.downloaded,
            self.skipped,
            self.failed,
            if self.aborted { " (stopped early)" } else { "" },
        )
    }
}

pub struct DownloadStage {
    locator: Arc<ImageLocator>,
    fetcher: Arc<dyn Fetcher>,
    stop: StopSignal,
}

impl DownloadStage {
    pub fn new(locator: Arc<ImageLocator>, fetcher: Arc<dyn Fetcher>, stop: StopSignal) -> Self {
        Self {
            locator,
            fetcher,
            stop,
        }
    }

    /// Process every row carrying both a link and a save-name. Per-row fetch
    /// errors are logged and do not abort remaining rows.
    pub async fn run(&self, rows: &[SheetRow], out_dir: &Path) -> Result<DownloadReport> {
        tokio::fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("create output directory {}", out_dir.display()))?;

        let mut report = DownloadReport::default();
        for row in rows {
            if self.stop.is_stopped() {
                tracing::warn!(row = row.row, "stop requested, leaving remaining rows");
                report.aborted = true;
                break;
            }

            if row.existing_link.is_empty() || row.save_name.is_empty() {
                tracing::debug!(row = row.row, "no link or save-name, skipping");
                report.skipped += 1;
                continue;
            }

            let Some(file_name) = safe_file_name(&row.save_name) else {
                tracing::warn!(row = row.row, save_name = %row.save_name, "unsafe save-name, skipping");
                report.failed += 1;
                continue;
            };
            let dest = out_dir.join(file_name);
            if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
                tracing::info!(row = row.row, path = %dest.display(), "already downloaded, skipping");
                report.skipped += 1;
                continue;
            }

            let Some(folder_id) = drive_link::extract_folder_id(&row.existing_link) else {
                tracing::warn!(row = row.row, link = %row.existing_link, "could not extract folder id");
                report.failed += 1;
                continue;
            };

            let Some(image_url) = self.locator.first_image(&folder_id).await else {
                report.failed += 1;
                continue;
            };

            match self.fetch_to(&image_url, &dest).await {
                Ok(bytes) => {
                    tracing::info!(row = row.row, bytes, path = %dest.display(), "downloaded");
                    report.downloaded += 1;
                }
                Err(e) => {
                    tracing::warn!(row = row.row, sku = %row.sku, error = %e, "download failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(summary = %report.summary(), "download stage finished");
        Ok(report)
    }

    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let part = temp_path(dest);
        let result = self.stream_to_part(url, &part).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&part).await;
            return result;
        }
        tokio::fs::rename(&part, dest)
            .await
            .with_context(|| format!("rename {} into place", part.display()))?;
        result
    }

    async fn stream_to_part(&self, url: &str, part: &Path) -> Result<u64> {
        let mut stream = self.fetcher.get_stream(url).await?;
        let mut file = tokio::fs::File::create(part)
            .await
            .with_context(|| format!("create temp file {}", part.display()))?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

/// Path for the in-progress file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// `<save_name>.jpg`, rejecting names that would escape the output dir.
fn safe_file_name(save_name: &str) -> Option<String> {
    if save_name.contains('/') || save_name.contains('\\') || save_name.contains("..") {
        return None;
    }
    Some(format!("{save_name}.jpg"))
}
