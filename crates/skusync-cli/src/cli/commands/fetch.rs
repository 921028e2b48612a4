//! `skusync fetch` – download each linked folder's first image.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use skusync_core::config;
use skusync_core::download::DownloadStage;
use skusync_core::pipeline;

use super::Context;

pub async fn run_fetch(
    ctx: &Context,
    spreadsheet: &str,
    sheet: &str,
    start_row: u32,
    out_dir: &Path,
) -> Result<()> {
    config::validate_request(spreadsheet, start_row)?;

    let rows = pipeline::read_rows(
        ctx.sheets.as_ref(),
        spreadsheet,
        sheet,
        start_row,
        &ctx.cfg.columns,
    )
    .await?;

    let stage = DownloadStage::new(
        Arc::clone(&ctx.locator),
        Arc::clone(&ctx.fetcher),
        ctx.stop.clone(),
    );
    let report = stage.run(&rows, out_dir).await?;
    ctx.log_quota_usage().await;

    println!("fetch: {}", report.summary());
    Ok(())
}
