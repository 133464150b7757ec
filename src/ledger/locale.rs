//! The words that appear in an exported workbook.

use serde::{Deserialize, Serialize};

/// The language of column headers, type/status tokens and month names in a workbook.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    /// Brazilian Portuguese, the language of the original backups.
    #[default]
    PtBr,
    En,
}

serde_plain::derive_display_from_serialize!(Locale);
serde_plain::derive_fromstr_from_deserialize!(Locale);

/// The header of the provenance column. It is the same in every locale.
pub const RAW_DATA: &str = "RAW_DATA";

const PT_BR_MONTHS: [&str; 12] = [
    "JANEIRO",
    "FEVEREIRO",
    "MARÇO",
    "ABRIL",
    "MAIO",
    "JUNHO",
    "JULHO",
    "AGOSTO",
    "SETEMBRO",
    "OUTUBRO",
    "NOVEMBRO",
    "DEZEMBRO",
];

const EN_MONTHS: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::PtBr, Locale::En];

    /// Column headers in export order, provenance last.
    pub fn headers(&self) -> [&'static str; 8] {
        match self {
            Locale::PtBr => [
                "DIA",
                "DATA COMPLETA",
                "CATEGORIA",
                "DESCRIÇÃO",
                "TIPO",
                "VALOR",
                "STATUS",
                RAW_DATA,
            ],
            Locale::En => [
                "DAY",
                "FULL DATE",
                "CATEGORY",
                "DESCRIPTION",
                "TYPE",
                "AMOUNT",
                "STATUS",
                RAW_DATA,
            ],
        }
    }

    pub fn income(&self) -> &'static str {
        match self {
            Locale::PtBr => "ENTRADA",
            Locale::En => "INCOME",
        }
    }

    pub fn expense(&self) -> &'static str {
        match self {
            Locale::PtBr => "SAÍDA",
            Locale::En => "EXPENSE",
        }
    }

    pub fn settled(&self) -> &'static str {
        match self {
            Locale::PtBr => "LIQUIDADO",
            Locale::En => "SETTLED",
        }
    }

    pub fn pending(&self) -> &'static str {
        match self {
            Locale::PtBr => "PENDENTE",
            Locale::En => "PENDING",
        }
    }

    /// Shown in place of an empty description.
    pub fn general(&self) -> &'static str {
        match self {
            Locale::PtBr => "Geral",
            Locale::En => "General",
        }
    }

    /// The category given to imported rows that have none.
    pub fn fallback_category(&self) -> &'static str {
        match self {
            Locale::PtBr => "Outros",
            Locale::En => "Other",
        }
    }

    /// Label for records whose date has no usable year and month.
    pub fn undated(&self) -> &'static str {
        match self {
            Locale::PtBr => "SEM_DATA",
            Locale::En => "UNDATED",
        }
    }

    /// Upper-case month name for `month` in `1..=12`.
    pub fn month_name(&self, month: u32) -> Option<&'static str> {
        let names = match self {
            Locale::PtBr => &PT_BR_MONTHS,
            Locale::En => &EN_MONTHS,
        };
        let ix = usize::try_from(month).ok()?.checked_sub(1)?;
        names.get(ix).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_month_names() {
        assert_eq!(Locale::PtBr.month_name(3), Some("MARÇO"));
        assert_eq!(Locale::En.month_name(12), Some("DECEMBER"));
        assert_eq!(Locale::PtBr.month_name(0), None);
        assert_eq!(Locale::PtBr.month_name(13), None);
    }

    #[test]
    fn test_locale_strings() {
        assert_eq!(Locale::from_str("pt-br").unwrap(), Locale::PtBr);
        assert_eq!(Locale::En.to_string(), "en");
    }

    #[test]
    fn test_provenance_header_is_shared() {
        assert_eq!(Locale::PtBr.headers()[7], Locale::En.headers()[7]);
    }
}
