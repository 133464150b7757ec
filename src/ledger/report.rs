//! Single-sheet reports: a readable listing of records with no provenance column. Unlike the
//! backup workbook these are not meant to be imported again.

use crate::ledger::locale::Locale;
use crate::ledger::workbook::{Cell, Workbook, Worksheet};
use crate::model::Transaction;

/// Widths of the report columns.
pub const REPORT_COLUMN_WIDTHS: [f64; 6] = [12.0, 20.0, 35.0, 12.0, 15.0, 15.0];

/// Which report to build.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReportKind {
    /// The records of one calendar month.
    Statement { year: i32, month: u32 },
    /// Any selection of records, e.g. a search result.
    Full,
}

impl ReportKind {
    /// `XMoney_Extrato_3_2024.xlsx` for a statement, `Relatorio_XMoney_Full.xlsx` otherwise.
    pub fn file_name(&self) -> String {
        match self {
            ReportKind::Statement { year, month } => {
                format!("XMoney_Extrato_{month}_{year}.xlsx")
            }
            ReportKind::Full => "Relatorio_XMoney_Full.xlsx".to_string(),
        }
    }

    fn sheet_name(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ReportKind::Statement { .. }, Locale::PtBr) => "XMoney Relatório",
            (ReportKind::Statement { .. }, Locale::En) => "XMoney Statement",
            (ReportKind::Full, Locale::PtBr) => "Planilha Geral",
            (ReportKind::Full, Locale::En) => "All Transactions",
        }
    }

    /// Shown in place of an empty description.
    fn no_description(&self) -> &'static str {
        match self {
            ReportKind::Statement { .. } => "N/A",
            ReportKind::Full => "—",
        }
    }
}

/// The header row of a report. A statement names the currency in the amount header.
pub fn report_header(kind: ReportKind, locale: Locale, currency: &str) -> Vec<Cell> {
    let [date, category, description, r#type, amount, status] = match locale {
        Locale::PtBr => ["DATA", "CATEGORIA", "DESCRIÇÃO", "TIPO", "VALOR", "STATUS"],
        Locale::En => ["DATE", "CATEGORY", "DESCRIPTION", "TYPE", "AMOUNT", "STATUS"],
    };
    let amount = match kind {
        ReportKind::Statement { .. } => format!("{amount} ({currency})"),
        ReportKind::Full => amount.to_string(),
    };
    vec![
        Cell::text(date),
        Cell::text(category),
        Cell::text(description),
        Cell::text(r#type),
        Cell::Text(amount),
        Cell::text(status),
    ]
}

/// Builds a one-sheet workbook listing `records` in the given order.
pub fn report<'a, I>(records: I, kind: ReportKind, locale: Locale, currency: &str) -> Workbook
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut sheet = Worksheet::new(kind.sheet_name(locale)).with_widths(REPORT_COLUMN_WIDTHS);
    sheet.push_row(report_header(kind, locale, currency));
    for t in records {
        let (year, month, day) = t.date_parts();
        let description = match t.description() {
            "" => kind.no_description(),
            d => d,
        };
        sheet.push_row(vec![
            Cell::text(format!("{day}/{month}/{year}")),
            Cell::text(t.category().to_uppercase()),
            Cell::text(description),
            Cell::text(if t.is_income() {
                locale.income()
            } else {
                locale.expense()
            }),
            Cell::Number(t.amount().to_f64()),
            Cell::text(if t.paid() {
                locale.settled()
            } else {
                locale.pending()
            }),
        ]);
    }
    Workbook::new(vec![sheet])
}
