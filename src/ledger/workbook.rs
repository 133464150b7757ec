//! A minimal in-memory spreadsheet: named sheets of rows of cells.
//!
//! The transform works on this model only. Converting it to and from a file format is the job of
//! the `xlsx` module, which keeps the transform free of I/O.

use chrono::{Duration, NaiveDate};
use std::borrow::Cow;

/// A single spreadsheet cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The cell as text, with whole numbers rendered without a fractional part. `None` for empty
    /// cells.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(Cow::Owned(format!("{}", *n as i64)))
            }
            Cell::Number(n) => Some(Cow::Owned(n.to_string())),
            Cell::Bool(b) => Some(Cow::Owned(b.to_string())),
        }
    }
}

/// Converts a spreadsheet serial day number to a date. Spreadsheet day zero is 1899-12-30 once the
/// 1900 leap year bug is accounted for.
pub(crate) fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 2_958_465 is 9999-12-31, the last day a spreadsheet can show.
    if !serial.is_finite() || !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// One named sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    /// Column widths in characters; a width of zero hides the column.
    widths: Vec<f64>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            widths: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_widths(mut self, widths: impl Into<Vec<f64>>) -> Self {
        self.widths = widths.into();
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Worksheet>) -> Self {
        Self { sheets }
    }

    pub fn push(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
