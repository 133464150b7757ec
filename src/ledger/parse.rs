//! Reads the records back out of a workbook.

use crate::ledger::locale::Locale;
use crate::ledger::row::{from_row, HeaderMap};
use crate::ledger::workbook::{Cell, Workbook};
use crate::model::Transaction;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Parses every data row of every sheet, in sheet order then row order. The first row of each
/// sheet is its header, and its language is detected independently of `locale`, which only breaks
/// ties. Empty sheets and rows with no content are skipped. A sheet whose header names no known
/// column still yields one record per row, built entirely from defaults. Every record is stamped
/// with `owner`.
pub fn parse(workbook: &Workbook, owner: &str, locale: Locale, today: NaiveDate) -> Vec<Transaction> {
    let mut records = Vec::new();
    for sheet in workbook.sheets() {
        let Some((header, rows)) = sheet.rows().split_first() else {
            debug!("Sheet '{}' is empty", sheet.name());
            continue;
        };
        let (headers, sheet_locale) = HeaderMap::detect(header, locale);
        if headers.is_empty() {
            warn!(
                "Sheet '{}' has no known column headers, its rows get default values",
                sheet.name()
            );
        } else if sheet_locale != locale {
            debug!("Sheet '{}' is in {sheet_locale}", sheet.name());
        }
        let before = records.len();
        records.extend(
            rows.iter()
                .filter(|row| !row.iter().all(Cell::is_empty))
                .map(|row| from_row(row, &headers, sheet_locale, today).with_owner(owner)),
        );
        debug!(
            "Read {} records from sheet '{}'",
            records.len() - before,
            sheet.name()
        );
    }
    records
}
