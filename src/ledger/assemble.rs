//! Builds the export workbook: one sheet per month, a header row, one row per record.

use crate::ledger::locale::Locale;
use crate::ledger::month::{group, SheetOrder};
use crate::ledger::row::{header_row, to_row};
use crate::ledger::workbook::{Workbook, Worksheet};
use crate::model::Transaction;
use crate::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// The longest sheet name a spreadsheet file accepts, in characters.
pub const MAX_SHEET_NAME: usize = 31;

/// Widths of the exported columns. The provenance column is last and hidden.
pub const COLUMN_WIDTHS: [f64; 8] = [6.0, 15.0, 20.0, 35.0, 12.0, 15.0, 15.0, 0.0];

/// Assembles `records` into a workbook. An empty input gives a workbook with no sheets.
pub fn assemble<'a, I>(records: I, locale: Locale, order: SheetOrder) -> Result<Workbook>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut workbook = Workbook::default();
    let mut used = HashSet::new();
    for bucket in group(records, locale, order) {
        let name = sheet_name(bucket.label(), &used);
        used.insert(name.clone());
        let mut sheet = Worksheet::new(name).with_widths(COLUMN_WIDTHS);
        sheet.push_row(header_row(locale));
        for t in bucket.records() {
            sheet.push_row(to_row(t, locale)?);
        }
        debug!(
            "Sheet '{}' has {} records",
            sheet.name(),
            bucket.records().len()
        );
        workbook.push(sheet);
    }
    Ok(workbook)
}

/// Truncates `label` to the sheet name limit. Labels are unique per month, but truncation could in
/// principle collide, so a numeric suffix keeps the names distinct.
fn sheet_name(label: &str, used: &HashSet<String>) -> String {
    let truncated: String = label.chars().take(MAX_SHEET_NAME).collect();
    if !used.contains(&truncated) {
        return truncated;
    }
    (2..)
        .map(|n| {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
            let mut name: String = label.chars().take(keep).collect();
            name.push_str(&suffix);
            name
        })
        .find(|name| !used.contains(name))
        .unwrap_or(truncated)
}

/// The name of an export file made on `today`, e.g. `XMONEY_BACKUP_05-03-2024.xlsx`.
pub fn file_name(today: NaiveDate) -> String {
    format!("XMONEY_BACKUP_{}.xlsx", today.format("%d-%m-%Y"))
}
