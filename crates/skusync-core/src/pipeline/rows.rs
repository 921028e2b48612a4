//! Row snapshot: one contiguous read of the sheet at pipeline start.
//!
//! The snapshot is immutable for the duration of a pass; the pipeline only
//! writes back to cells it derives from each row's own index.

use crate::a1;
use crate::config::ColumnLayout;
use crate::store::{SheetStore, StoreError};

/// One materialized sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based sheet row index.
    pub row: u32,
    pub sku: String,
    /// Link already present in the link column, if any.
    pub existing_link: String,
    /// Local save-name for the download stage, if any.
    pub save_name: String,
}

impl SheetRow {
    /// Eligible for resolution: has a SKU and no link yet.
    pub fn needs_link(&self) -> bool {
        !self.sku.is_empty() && self.existing_link.is_empty()
    }
}

/// Read all rows from `start_row` downward in one range request.
pub async fn read_rows(
    sheets: &dyn SheetStore,
    spreadsheet_id: &str,
    sheet: &str,
    start_row: u32,
    layout: &ColumnLayout,
) -> Result<Vec<SheetRow>, StoreError> {
    let range = a1::open_range(sheet, "A", layout.last_column(), start_row);
    tracing::debug!(%range, "reading row snapshot");
    let grid = sheets.get_range(spreadsheet_id, &range).await?;
    Ok(parse_rows(&grid, start_row, layout))
}

fn cell_at(cells: &[String], column: &str) -> String {
    a1::column_index(column)
        .and_then(|i| cells.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn parse_rows(grid: &[Vec<String>], start_row: u32, layout: &ColumnLayout) -> Vec<SheetRow> {
    grid.iter()
        .enumerate()
        .map(|(offset, cells)| SheetRow {
            row: start_row + offset as u32,
            sku: cell_at(cells, &layout.sku),
            existing_link: cell_at(cells, &layout.link),
            save_name: cell_at(cells, &layout.save_name),
        })
        .collect()
}
