//! A1-notation helpers for addressing sheet cells and column ranges.
//!
//! The pipeline writes each row's result to that row's own cell address, so
//! range construction must be exact. Sheet names are always quoted; the
//! Sheets API accepts quoting even when it is not strictly required.

/// Escape a sheet name for A1 notation (single quotes doubled, then quoted).
fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// A single cell, e.g. `'Sheet1'!B5`.
pub fn cell(sheet: &str, column: &str, row: u32) -> String {
    format!("{}!{}{}", quote_sheet(sheet), column, row)
}

/// An open-ended multi-column range starting at `start_row`,
/// e.g. `'Sheet1'!A2:E` (used to snapshot the row data in one read).
pub fn open_range(sheet: &str, first_column: &str, last_column: &str, start_row: u32) -> String {
    format!(
        "{}!{}{}:{}",
        quote_sheet(sheet),
        first_column,
        start_row,
        last_column
    )
}

/// Zero-based index of a column letter (`A` = 0, `Z` = 25, `AA` = 26).
/// Returns `None` for an empty or non-alphabetic column spec.
pub fn column_index(column: &str) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let mut idx: usize = 0;
    for c in column.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        idx = idx * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(idx - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_is_quoted_and_addressed() {
        assert_eq!(cell("Sheet1", "B", 5), "'Sheet1'!B5");
        assert_eq!(cell("第3弾", "A", 2), "'第3弾'!A2");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        assert_eq!(cell("it's", "C", 1), "'it''s'!C1");
    }

    #[test]
    fn open_range_spans_columns() {
        assert_eq!(open_range("S", "A", "E", 2), "'S'!A2:E");
    }

    #[test]
    fn column_index_single_and_double_letters() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("C"), Some(2));
        assert_eq!(column_index("Z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("AB"), Some(27));
    }

    #[test]
    fn column_index_rejects_garbage() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }
}
