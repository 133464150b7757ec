//! Groups records into one bucket per calendar month.

use crate::ledger::locale::Locale;
use crate::model::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The order of month sheets in an exported workbook.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SheetOrder {
    /// Newest month first, undated records last.
    #[default]
    Chronological,
    /// Labels sorted as text in descending order. Older backups were written this way, which puts
    /// e.g. `SETEMBRO_2024` before `MARÇO_2025`.
    Lexical,
}

serde_plain::derive_display_from_serialize!(SheetOrder);
serde_plain::derive_fromstr_from_deserialize!(SheetOrder);

/// The records of one month, in the order they were given.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    label: String,
    key: Option<(i32, u32)>,
    records: Vec<&'a Transaction>,
}

impl<'a> Bucket<'a> {
    /// `MONTHNAME_YYYY`, e.g. `MARÇO_2024`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// `(year, month)`, or `None` for the bucket of records without a usable date.
    pub fn key(&self) -> Option<(i32, u32)> {
        self.key
    }

    pub fn records(&self) -> &[&'a Transaction] {
        &self.records
    }
}

/// The bucket label of a record. Records with no usable year and month share the undated label.
pub fn label(t: &Transaction, locale: Locale) -> (String, Option<(i32, u32)>) {
    match t.year_month() {
        Some((year, month)) => match locale.month_name(month) {
            Some(name) => (format!("{name}_{year}"), Some((year, month))),
            None => (locale.undated().to_string(), None),
        },
        None => (locale.undated().to_string(), None),
    }
}

/// Partitions `records` by month. Every record lands in exactly one bucket and buckets keep the
/// input order of their records.
pub fn group<'a, I>(records: I, locale: Locale, order: SheetOrder) -> Vec<Bucket<'a>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buckets: Vec<Bucket<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for t in records {
        let (label, key) = label(t, locale);
        let ix = *index.entry(label.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                label,
                key,
                records: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[ix].records.push(t);
    }

    match order {
        SheetOrder::Chronological => {
            // Some > None, so undated sorts last.
            buckets.sort_by(|a, b| b.key.cmp(&a.key));
        }
        SheetOrder::Lexical => buckets.sort_by(|a, b| b.label.cmp(&a.label)),
    }
    buckets
}
