//! Amount type for monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses user-typed and
//! spreadsheet-typed values that may carry a currency symbol, thousands separators, and either a
//! `.` or a `,` as the decimal separator. On the wire (JSON) it is a plain number, which is how the
//! remote `transactions` table stores it.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{Error as _, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Currency symbols that may precede an amount. Longest first so that `R$` wins over `$`.
const CURRENCY_PREFIXES: &[&str] = &["R$", "US$", "€", "$"];

/// Represents a monetary amount.
///
/// Transaction amounts are magnitudes; the direction of money is carried by the transaction type.
/// Derived values, such as a monthly balance, can be negative.
///
/// # Examples
///
/// ```
/// # use xmoney::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("R$ 1.234,56").unwrap();
/// let b = Amount::from_str("1,234.56").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "1,234.56");
/// assert_eq!(a.to_currency_string("BRL"), "R$ 1.234,56");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates an Amount from a floating point number, e.g. a spreadsheet cell. Returns `None` for
    /// values that cannot be represented, such as `NaN`.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(|d| Self(d.normalize()))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Returns the magnitude of the amount.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Formats the amount for display in the given ISO currency.
    ///
    /// - `BRL` -> `R$ 1.234,56`
    /// - `EUR` -> `€ 1.234,56`
    /// - `USD` -> `$1,234.56`
    /// - anything else -> `GBP 1,234.56`
    pub fn to_currency_string(&self, currency: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let grouped = group_thousands(self.0);
        match currency.to_ascii_uppercase().as_str() {
            "BRL" => format!("{sign}R$ {}", swap_separators(&grouped)),
            "EUR" => format!("{sign}€ {}", swap_separators(&grouped)),
            "USD" => format!("{sign}${grouped}"),
            other => format!("{sign}{other} {grouped}"),
        }
    }
}

/// Renders the magnitude of `value` with two decimals and `,` between groups of thousands, e.g.
/// `1,234.50`. Works on the decimal digits, so large amounts keep every digit.
fn group_thousands(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{rounded:.2}");
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (ix, c) in int.chars().enumerate() {
        if ix > 0 && (int.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{frac}")
}

/// Turns `1,234.56` into `1.234,56`.
fn swap_separators(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ',' => '.',
            '.' => ',',
            c => c,
        })
        .collect()
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let without_symbol = CURRENCY_PREFIXES
            .iter()
            .find_map(|prefix| unsigned.strip_prefix(prefix))
            .unwrap_or(unsigned);

        let digits: String = without_symbol
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let normalized = normalize_separators(&digits);
        let text = if negative {
            format!("-{normalized}")
        } else {
            normalized
        };

        let value = Decimal::from_str(&text).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

/// Rewrites a number so that `.` is the only (decimal) separator.
///
/// When both separators appear, the last one is the decimal separator. A lone `,` followed by at
/// most two digits is a decimal comma (`12,5`); otherwise commas are thousands separators. Repeated
/// dots (`1.234.567`) are thousands separators.
fn normalize_separators(s: &str) -> String {
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');
    match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(c), None) => {
            let single = s.matches(',').count() == 1;
            if single && s.len() - c - 1 <= 2 {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(_)) if s.matches('.').count() > 1 => s.replace('.', ""),
        _ => s.to_string(),
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{sign}{}", group_thousands(self.0))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts JSON numbers as well as numeric strings, since the store may return either depending
/// on the column type.
struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).ok_or_else(|| E::custom(format!("unrepresentable amount {v}")))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_brl() {
        let amount = Amount::from_str("R$ 1.234,56").unwrap();
        assert_eq!(amount.value(), dec("1234.56"));
    }

    #[test]
    fn test_parse_dollar_with_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_decimal_comma() {
        let amount = Amount::from_str("12,5").unwrap();
        assert_eq!(amount.value(), dec("12.5"));
    }

    #[test]
    fn test_parse_thousands_comma() {
        let amount = Amount::from_str("1,000").unwrap();
        assert_eq!(amount.value(), dec("1000"));
    }

    #[test]
    fn test_parse_thousands_dots() {
        let amount = Amount::from_str("1.234.567").unwrap();
        assert_eq!(amount.value(), dec("1234567"));
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-R$ 50,00").unwrap();
        assert_eq!(amount.value(), dec("-50"));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_empty_string() {
        let amount = Amount::from_str("   ").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("fifty").is_err());
        assert!(Amount::from_str("12abc").is_err());
    }

    #[test]
    fn test_display() {
        let amount = Amount::from_str("2000").unwrap();
        assert_eq!(amount.to_string(), "2,000.00");
        let negative = Amount::from_str("-7.5").unwrap();
        assert_eq!(negative.to_string(), "-7.50");
    }

    #[test]
    fn test_display_keeps_every_digit() {
        let amount = Amount::from_str("12345678901234567.89").unwrap();
        assert_eq!(amount.to_string(), "12,345,678,901,234,567.89");
        assert_eq!(
            amount.to_currency_string("BRL"),
            "R$ 12.345.678.901.234.567,89"
        );
        assert_eq!(Amount::from_str("0.005").unwrap().to_string(), "0.01");
        assert_eq!(Amount::from_str("999.999").unwrap().to_string(), "1,000.00");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_currency_strings() {
        let amount = Amount::from_str("1234.5").unwrap();
        assert_eq!(amount.to_currency_string("BRL"), "R$ 1.234,50");
        assert_eq!(amount.to_currency_string("usd"), "$1,234.50");
        assert_eq!(amount.to_currency_string("EUR"), "€ 1.234,50");
        assert_eq!(amount.to_currency_string("GBP"), "GBP 1,234.50");
        let negative = Amount::ZERO - amount;
        assert_eq!(negative.to_currency_string("BRL"), "-R$ 1.234,50");
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::from_str("50.25").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "50.25");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("2000").unwrap();
        let b: Amount = serde_json::from_str("2000.0").unwrap();
        let c: Amount = serde_json::from_str("\"2000.00\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_from_f64() {
        let amount = Amount::from_f64(50.1).unwrap();
        assert_eq!(amount.value(), dec("50.1"));
        assert!(Amount::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_sum() {
        let total: Amount = ["1.50", "2.25", "0.25"]
            .iter()
            .map(|s| Amount::from_str(s).unwrap())
            .sum();
        assert_eq!(total.value(), dec("4.00"));
    }
}
