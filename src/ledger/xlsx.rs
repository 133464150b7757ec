//! Converts the in-memory `Workbook` to and from `.xlsx` bytes.

use crate::ledger::workbook::{Cell, Workbook, Worksheet};
use crate::Result;
use anyhow::{anyhow, Context};
use calamine::{Data, Reader};
use std::io::Cursor;
use tracing::trace;

/// Encodes `workbook` as an `.xlsx` file. A column of width zero is written hidden.
pub fn write(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut book = rust_xlsxwriter::Workbook::new();
    for sheet in workbook.sheets() {
        let out = book.add_worksheet();
        out.set_name(sheet.name())
            .map_err(|e| anyhow!("Invalid sheet name '{}': {e}", sheet.name()))?;

        for (col, width) in sheet.widths().iter().enumerate() {
            let col = u16::try_from(col).context("Too many columns")?;
            if *width <= 0.0 {
                out.set_column_hidden(col)
                    .map_err(|e| anyhow!("Unable to hide column {col}: {e}"))?;
            } else {
                out.set_column_width(col, *width)
                    .map_err(|e| anyhow!("Unable to set width of column {col}: {e}"))?;
            }
        }

        for (row_ix, row) in sheet.rows().iter().enumerate() {
            let row_ix = u32::try_from(row_ix).context("Too many rows")?;
            for (col, cell) in row.iter().enumerate() {
                let col = u16::try_from(col).context("Too many columns")?;
                let written = match cell {
                    Cell::Empty => continue,
                    Cell::Text(s) => out.write_string(row_ix, col, s),
                    Cell::Number(n) => out.write_number(row_ix, col, *n),
                    Cell::Bool(b) => out.write_boolean(row_ix, col, *b),
                };
                written.map_err(|e| {
                    anyhow!("Unable to write cell ({row_ix}, {col}) of '{}': {e}", sheet.name())
                })?;
            }
        }
    }
    book.save_to_buffer()
        .map_err(|e| anyhow!("Unable to encode the workbook: {e}"))
}

/// Decodes `.xlsx` (or any other format the reader recognizes) bytes into a `Workbook`. Cells keep
/// their position, so leading empty rows and columns are preserved.
pub fn read(bytes: Vec<u8>) -> Result<Workbook> {
    let mut book = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| anyhow!("Unable to open the workbook: {e}"))?;
    let mut workbook = Workbook::default();
    for name in book.sheet_names() {
        let range = book
            .worksheet_range(&name)
            .map_err(|e| anyhow!("Unable to read sheet '{name}': {e}"))?;
        let mut sheet = Worksheet::new(name.as_str());
        if let Some((first_row, first_col)) = range.start() {
            for _ in 0..first_row {
                sheet.push_row(Vec::new());
            }
            for row in range.rows() {
                let mut cells = vec![Cell::Empty; first_col as usize];
                cells.extend(row.iter().map(to_cell));
                sheet.push_row(cells);
            }
        }
        trace!("Sheet '{name}' has {} rows", sheet.rows().len());
        workbook.push(sheet);
    }
    Ok(workbook)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) | Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        _ => Cell::Empty,
    }
}
