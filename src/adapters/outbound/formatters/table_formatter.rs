use crate::application::read_models::{OutputDocument, TableView};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// Spaces between columns
const COLUMN_GAP: usize = 3;

/// TableFormatter adapter rendering left-aligned text columns
///
/// Column width is the widest cell measured in characters. The last column
/// is not padded so lines carry no trailing whitespace.
pub struct TableFormatter;

impl TableFormatter {
    pub fn new() -> Self {
        Self
    }

    fn column_widths(table: &TableView) -> Vec<usize> {
        let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
        for row in &table.rows {
            for (idx, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(idx) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    fn render_line(cells: &[String], widths: &[usize], out: &mut String) {
        let last = cells.len().saturating_sub(1);
        for (idx, cell) in cells.iter().enumerate() {
            // Newlines would break the column layout
            let cell = cell.replace('\n', " ");
            out.push_str(&cell);
            if idx < last {
                let pad = widths[idx] - cell.chars().count() + COLUMN_GAP;
                out.push_str(&" ".repeat(pad));
            }
        }
        out.push('\n');
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TableFormatter {
    fn format(&self, document: &OutputDocument) -> Result<String> {
        let table = &document.table;
        let widths = Self::column_widths(table);
        let headers: Vec<String> = table.headers.iter().map(|h| h.to_uppercase()).collect();

        let mut out = String::new();
        Self::render_line(&headers, &widths, &mut out);
        for row in &table.rows {
            Self::render_line(row, &widths, &mut out);
        }
        Ok(out)
    }
}
