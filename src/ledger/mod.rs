//! The ledger export/import transform.
//!
//! Export turns a list of transactions into a workbook with one sheet per month. Each row carries
//! the full record as JSON in a hidden `RAW_DATA` column so that a later import can tell edited
//! rows (which keep their id and overwrite the stored record) from new rows (which have no id and
//! are inserted). If a spreadsheet tool drops or mangles that column, every row becomes new.

mod assemble;
mod locale;
mod month;
mod parse;
mod report;
mod row;
mod workbook;
mod xlsx;

pub use assemble::{assemble, file_name, COLUMN_WIDTHS, MAX_SHEET_NAME};
pub use locale::{Locale, RAW_DATA};
pub use month::{group, Bucket, SheetOrder};
pub use parse::parse;
pub use report::{report, report_header, ReportKind, REPORT_COLUMN_WIDTHS};
pub use row::{from_row, header_row, to_row, Column, HeaderMap};
pub use workbook::{Cell, Workbook, Worksheet};

use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::Result;
use chrono::NaiveDate;

/// Encodes `records` as `.xlsx` bytes.
pub fn export_workbook<'a, I>(records: I, locale: Locale, order: SheetOrder) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let workbook = assemble(records, locale, order).pub_result(ErrorType::Workbook)?;
    xlsx::write(&workbook).pub_result(ErrorType::Workbook)
}

/// Encodes a single-sheet report of `records`, in the order given, as `.xlsx` bytes.
pub fn export_report<'a, I>(
    records: I,
    kind: ReportKind,
    locale: Locale,
    currency: &str,
) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    xlsx::write(&report(records, kind, locale, currency)).pub_result(ErrorType::Workbook)
}

/// Decodes `.xlsx`, `.xls` or `.ods` bytes into a `Workbook`.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Workbook> {
    xlsx::read(bytes).pub_result(ErrorType::Workbook)
}

/// Decodes workbook bytes into the list of records to upsert, each owned by `owner`. Fails only if
/// the bytes are not a readable workbook.
pub fn import_workbook(
    bytes: Vec<u8>,
    owner: &str,
    locale: Locale,
    today: NaiveDate,
) -> Result<Vec<Transaction>> {
    let workbook = read_workbook(bytes)?;
    Ok(parse(&workbook, owner, locale, today))
}
