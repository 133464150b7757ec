//! Maps a `Transaction` to the row shape of an exported sheet and back.
//!
//! The backward direction never fails. Each field that cannot be understood falls back to a fixed
//! default, and a row whose provenance column cannot be read simply loses its id, which turns it
//! into a new record on import.

use crate::ledger::locale::Locale;
use crate::ledger::workbook::{serial_to_date, Cell};
use crate::model::{Amount, Transaction, TransactionType};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde_json::Value;
use std::str::FromStr;
use tracing::trace;

/// The columns of an exported sheet, in export order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Column {
    Day,
    FullDate,
    Category,
    Description,
    Type,
    Amount,
    Status,
    /// The whole record as JSON. Hidden in the exported file.
    RawData,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Day,
        Column::FullDate,
        Column::Category,
        Column::Description,
        Column::Type,
        Column::Amount,
        Column::Status,
        Column::RawData,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn header(self, locale: Locale) -> &'static str {
        locale.headers()[self.index()]
    }
}

/// The header row of an exported sheet.
pub fn header_row(locale: Locale) -> Vec<Cell> {
    locale.headers().iter().map(|h| Cell::text(*h)).collect()
}

/// Forward mapping: record -> display row with the provenance column last.
pub fn to_row(t: &Transaction, locale: Locale) -> Result<Vec<Cell>> {
    let (year, month, day) = t.date_parts();
    let description = if t.description().is_empty() {
        locale.general()
    } else {
        t.description()
    };
    let r#type = if t.is_income() {
        locale.income()
    } else {
        locale.expense()
    };
    let status = if t.paid() {
        locale.settled()
    } else {
        locale.pending()
    };
    let raw = serde_json::to_string(t).context("Unable to serialize a transaction")?;

    Ok(vec![
        Cell::text(day),
        Cell::text(format!("{day}/{month}/{year}")),
        Cell::text(t.category().to_uppercase()),
        Cell::text(description),
        Cell::text(r#type),
        Cell::Number(t.amount().to_f64()),
        Cell::text(status),
        Cell::Text(raw),
    ])
}

/// Locates the known columns of a sheet from its header row. Unknown headers are ignored, and
/// when a header repeats the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    positions: [Option<usize>; 8],
}

impl HeaderMap {
    pub fn new(header_row: &[Cell], locale: Locale) -> Self {
        let mut positions = [None; 8];
        for (ix, cell) in header_row.iter().enumerate() {
            let Some(text) = cell.as_text() else {
                continue;
            };
            let text = text.trim().to_uppercase();
            for column in Column::ALL {
                let slot = &mut positions[column.index()];
                if slot.is_none() && text == column.header(locale).to_uppercase() {
                    *slot = Some(ix);
                }
            }
        }
        Self { positions }
    }

    /// Matches `header_row` against the headers of every locale and returns the map of the locale
    /// that recognizes the most columns, together with that locale. Its type and status tokens are
    /// the ones to read the sheet's rows with. Ties go to `preferred`.
    pub fn detect(header_row: &[Cell], preferred: Locale) -> (Self, Locale) {
        let mut best = (Self::new(header_row, preferred), preferred);
        for locale in Locale::ALL.into_iter().filter(|l| *l != preferred) {
            let candidate = Self::new(header_row, locale);
            if candidate.matched() > best.0.matched() {
                best = (candidate, locale);
            }
        }
        best
    }

    /// The number of known columns found.
    pub fn matched(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    /// Returns the cell of `column` in `row`, or `None` if the column or the cell is missing.
    pub fn get<'a>(&self, row: &'a [Cell], column: Column) -> Option<&'a Cell> {
        let ix = self.positions[column.index()]?;
        row.get(ix).filter(|c| !c.is_empty())
    }

    /// True if none of the known headers were found.
    pub fn is_empty(&self) -> bool {
        self.positions.iter().all(Option::is_none)
    }
}

/// Backward mapping: display row -> record. `today` is used when the date cannot be read. The
/// returned record has no owner; the caller stamps it.
pub fn from_row(row: &[Cell], headers: &HeaderMap, locale: Locale, today: NaiveDate) -> Transaction {
    let provenance = headers
        .get(row, Column::RawData)
        .and_then(Cell::as_text)
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .filter(Value::is_object);

    let date = parse_date(headers.get(row, Column::FullDate), today);
    let amount = parse_amount(headers.get(row, Column::Amount));
    let r#type = match headers.get(row, Column::Type).and_then(Cell::as_text) {
        Some(token) if token.trim() == locale.income() => TransactionType::Income,
        _ => TransactionType::Expense,
    };
    let paid = matches!(
        headers.get(row, Column::Status).and_then(Cell::as_text),
        Some(token) if token.trim() == locale.settled()
    );

    let mut category = headers
        .get(row, Column::Category)
        .and_then(Cell::as_text)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| locale.fallback_category().to_string());
    let mut description = headers
        .get(row, Column::Description)
        .and_then(Cell::as_text)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut id = None;
    if let Some(raw) = &provenance {
        id = raw_id(raw);
        // The visible columns win, but undo the changes that export itself made to them.
        if let Some(raw_category) = raw.get("category").and_then(Value::as_str) {
            if raw_category.to_uppercase() == category {
                category = raw_category.to_string();
            }
        }
        let raw_description = raw.get("description").and_then(Value::as_str);
        if description == locale.general() && raw_description.map_or(true, str::is_empty) {
            description = String::new();
        }
    } else if headers.get(row, Column::RawData).is_some() {
        trace!("Ignoring an unreadable provenance cell, the row will be inserted as new");
    }

    let mut t = Transaction::new(amount, date, category, description, r#type, paid);
    t.id = id;
    t
}

/// The `id` of a provenance record, if it has a usable one.
fn raw_id(raw: &Value) -> Option<String> {
    match raw.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_date(cell: Option<&Cell>, today: NaiveDate) -> String {
    let fallback = || today.format("%Y-%m-%d").to_string();
    match cell {
        Some(Cell::Number(serial)) => serial_to_date(*serial)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(fallback),
        Some(cell) => {
            let text = cell.as_text().unwrap_or_default();
            let parts: Vec<&str> = text.trim().split('/').collect();
            match parts.as_slice() {
                [day, month, year] => format!("{year}-{month}-{day}"),
                _ => {
                    trace!("Unreadable date '{text}', using today");
                    fallback()
                }
            }
        }
        None => fallback(),
    }
}

/// Reads an amount cell as a magnitude. Anything unreadable is zero.
fn parse_amount(cell: Option<&Cell>) -> Amount {
    let amount = match cell {
        Some(Cell::Number(n)) => Amount::from_f64(*n),
        Some(Cell::Text(s)) => Amount::from_str(s).ok(),
        _ => None,
    };
    match amount {
        Some(amount) => amount.abs(),
        None => {
            trace!("Unreadable amount {cell:?}, using zero");
            Amount::ZERO
        }
    }
}
