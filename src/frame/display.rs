//! Table rendering for [`Frame`] using [`comfy-table`](https://docs.rs/comfy-table).
//!
//! `format!("{frame}")` prints at most [`MAX_ROWS`] rows; the header shows the
//! index name followed by the column names, duplicates included.
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use super::Frame;

/// Maximum number of rows rendered by `Display`.
pub const MAX_ROWS: usize = 20;

impl Frame {
    /// Build the display table for the first `max_rows` rows.
    pub fn to_table(&self, max_rows: usize) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = Row::new();
        header.add_cell(Cell::new(self.index().name().unwrap_or("")));
        for name in self.column_names() {
            header.add_cell(Cell::new(name));
        }
        table.set_header(header);

        for i in 0..self.len().min(max_rows) {
            let mut row = Row::new();
            row.add_cell(Cell::new(self.index().label(i)));
            for (_, column) in self.columns() {
                let cell = Cell::new(column.cell(i));
                row.add_cell(if column.is_numeric() {
                    cell.set_alignment(CellAlignment::Right)
                } else {
                    cell
                });
            }
            table.add_row(row);
        }
        table
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.to_table(MAX_ROWS))?;
        if self.len() > MAX_ROWS {
            writeln!(f, "... {} more rows", self.len() - MAX_ROWS)?;
        }
        write!(f, "[{} rows x {} columns]", self.len(), self.width())
    }
}
