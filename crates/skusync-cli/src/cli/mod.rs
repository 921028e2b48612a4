//! CLI for the skusync catalog-image tool.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use skusync_core::config;
use std::path::PathBuf;

use commands::{run_fetch, run_link, Context};

/// Top-level CLI for skusync.
#[derive(Debug, Parser)]
#[command(name = "skusync")]
#[command(about = "Sync SKU folder links and thumbnails between a drive and a catalog sheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve each SKU's folder and write image/link formulas back to the sheet.
    Link {
        /// Spreadsheet id (from the document URL).
        spreadsheet: String,
        /// Sheet (tab) name within the spreadsheet.
        sheet: String,
        /// First data row, 1-based.
        #[arg(long, default_value = "2", value_name = "ROW")]
        start_row: u32,
        /// Worker pool width (defaults to the config value).
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },

    /// Download the first image of each linked folder to local disk.
    Fetch {
        /// Spreadsheet id (from the document URL).
        spreadsheet: String,
        /// Sheet (tab) name within the spreadsheet.
        sheet: String,
        /// First data row, 1-based.
        #[arg(long, default_value = "2", value_name = "ROW")]
        start_row: u32,
        /// Destination directory for downloaded images.
        #[arg(long, default_value = "downloaded_images", value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// Link then fetch in one pass.
    Run {
        /// Spreadsheet id (from the document URL).
        spreadsheet: String,
        /// Sheet (tab) name within the spreadsheet.
        sheet: String,
        /// First data row, 1-based.
        #[arg(long, default_value = "2", value_name = "ROW")]
        start_row: u32,
        /// Destination directory for downloaded images.
        #[arg(long, default_value = "downloaded_images", value_name = "DIR")]
        out_dir: PathBuf,
        /// Worker pool width (defaults to the config value).
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let ctx = Context::build(cfg)?;

        match cli.command {
            CliCommand::Link {
                spreadsheet,
                sheet,
                start_row,
                concurrency,
            } => {
                run_link(&ctx, &spreadsheet, &sheet, start_row, concurrency).await?;
            }
            CliCommand::Fetch {
                spreadsheet,
                sheet,
                start_row,
                out_dir,
            } => {
                run_fetch(&ctx, &spreadsheet, &sheet, start_row, &out_dir).await?;
            }
            CliCommand::Run {
                spreadsheet,
                sheet,
                start_row,
                out_dir,
                concurrency,
            } => {
                run_link(&ctx, &spreadsheet, &sheet, start_row, concurrency).await?;
                run_fetch(&ctx, &spreadsheet, &sheet, start_row, &out_dir).await?;
            }
        }

        Ok(())
    }
}
