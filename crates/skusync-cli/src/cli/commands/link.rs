//! `skusync link` – resolve SKU folders and write links back to the sheet.

use anyhow::Result;
use std::sync::Arc;

use skusync_core::config;
use skusync_core::pipeline::{PipelineParams, RowPipeline};

use super::Context;

pub async fn run_link(
    ctx: &Context,
    spreadsheet: &str,
    sheet: &str,
    start_row: u32,
    concurrency: Option<usize>,
) -> Result<()> {
    config::validate_request(spreadsheet, start_row)?;

    let mut params = PipelineParams::from(&ctx.cfg);
    if let Some(n) = concurrency {
        params.concurrency = n.max(1);
    }

    let pipeline = RowPipeline::new(
        Arc::clone(&ctx.sheets),
        Arc::clone(&ctx.resolver),
        Arc::clone(&ctx.locator),
        params,
        ctx.stop.clone(),
    );
    let report = pipeline.run(spreadsheet, sheet, start_row).await?;
    ctx.log_quota_usage().await;

    println!("link: {}", report.summary());
    if !report.failed_batches.is_empty() {
        anyhow::bail!(
            "{} batch write(s) failed after retries; see log for row ranges",
            report.failed_batches.len()
        );
    }
    Ok(())
}
