//! Money value object (Brazilian Real) on top of `rust_decimal`.
//!
//! Amounts are kept at full decimal precision. Rounding to centavos only
//! happens when an amount is rendered (`round_for_display`, `format_brl`).
//!
//! Prices are capped at [`Money::MAX`] (`u64::MAX` centavos). The cap keeps
//! every centavo count in range and leaves `Decimal` headroom for the
//! installment surcharge.

use core::num::NonZeroU32;
use core::str::FromStr;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Centavos per real.
const DECIMAL_PLACES: u32 = 2;

/// A non-negative amount of money in BRL.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Largest accepted price: R$ 184.467.440.737.095.516,15.
    pub const MAX: Money = Money(Decimal::from_parts(u32::MAX, u32::MAX, 0, false, DECIMAL_PLACES));

    /// Wrap a decimal amount, rejecting negative values and values above [`Money::MAX`].
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_zero() {
            return Ok(Self::ZERO);
        }
        if amount.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "price cannot be negative, got {amount}"
            )));
        }
        if amount > Self::MAX.0 {
            return Err(DomainError::validation(format!(
                "price exceeds the maximum of {}, got {amount}",
                Self::MAX.0
            )));
        }
        Ok(Self(amount))
    }

    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from_i128_with_scale(i128::from(cents), DECIMAL_PLACES))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a non-negative factor (e.g. `1.08` for an 8% surcharge).
    ///
    /// Does not overflow for factors up to 10^11, given the [`Money::MAX`] cap.
    pub fn scale_by(self, factor: Decimal) -> Self {
        debug_assert!(!factor.is_sign_negative() || factor.is_zero());
        Self(self.0 * factor)
    }

    /// Split the amount into `parts` equal shares, at full precision.
    pub fn divided_into(self, parts: NonZeroU32) -> Self {
        Self(self.0 / Decimal::from(parts.get()))
    }

    /// Round to centavos (half away from zero) for display.
    pub fn round_for_display(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whole centavos after display rounding.
    ///
    /// Wider than `u64` so surcharged totals above [`Money::MAX`] still fit.
    pub fn to_cents(&self) -> u128 {
        let mut rounded = self.round_for_display().0;
        rounded.rescale(DECIMAL_PLACES);
        rounded.mantissa().unsigned_abs()
    }

    /// Parse a price typed into a back-office form.
    ///
    /// Accepts pt-BR (`"1.234,56"`, `"R$ 999,00"`) and plain (`"1234.56"`)
    /// notation. Blank input means "price not set" and yields `Ok(None)`.
    pub fn parse_brl(input: &str) -> DomainResult<Option<Self>> {
        let cleaned: String = input
            .trim()
            .trim_start_matches("R$")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return Ok(None);
        }
        if cleaned.starts_with('-') {
            return Err(DomainError::validation(format!(
                "price cannot be negative: {input:?}"
            )));
        }

        let normalized = normalize_separators(&cleaned)
            .ok_or_else(|| DomainError::validation(format!("malformed price: {input:?}")))?;

        if let Some((_, fraction)) = normalized.split_once('.') {
            if fraction.len() > DECIMAL_PLACES as usize {
                return Err(DomainError::validation(format!(
                    "price has more than two decimal places: {input:?}"
                )));
            }
        }

        let amount = Decimal::from_str(&normalized)
            .map_err(|e| DomainError::validation(format!("malformed price {input:?}: {e}")))?;
        Self::new(amount).map(Some)
    }
}

/// Turn pt-BR grouping into a plain `digits[.digits]` string.
fn normalize_separators(s: &str) -> Option<String> {
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    let plain = match (commas, dots) {
        (0, 0) => s.to_string(),
        // "1.234,56" / "1234,56": dots group thousands, the comma is decimal.
        (1, _) => {
            let (int, frac) = s.split_once(',')?;
            if !grouping_is_valid(int) || frac.contains('.') {
                return None;
            }
            format!("{}.{}", int.replace('.', ""), frac)
        }
        // "1.234" groups thousands; "1234.5" is a plain decimal point.
        (0, 1) => {
            let (int, frac) = s.split_once('.')?;
            if frac.len() == 3 && is_leading_group(int) {
                format!("{int}{frac}")
            } else {
                s.to_string()
            }
        }
        (0, _) => {
            if !grouping_is_valid(s) {
                return None;
            }
            s.replace('.', "")
        }
        _ => return None,
    };

    let mut parts = plain.split('.');
    let int = parts.next()?;
    let frac = parts.next();
    if int.is_empty() || frac.is_some_and(str::is_empty) {
        return None;
    }
    Some(plain)
}

/// `"1.234.567"` is valid grouping, `"12.34"`, `"1..234"` and `"0.500"` are not.
fn grouping_is_valid(int: &str) -> bool {
    let mut groups = int.split('.');
    let Some(first) = groups.next() else {
        return false;
    };
    if !int.contains('.') {
        return !first.is_empty();
    }
    is_leading_group(first) && groups.all(|g| g.len() == 3)
}

/// One to three digits with no leading zero: `"1"`, `"250"`, not `"0"` or `"050"`.
fn is_leading_group(group: &str) -> bool {
    (1..=3).contains(&group.len()) && !group.starts_with('0')
}

/// Format an amount the way pt-BR `toLocaleString` does with two fraction
/// digits: `1234.5` becomes `"1.234,50"`.
pub fn format_brl(money: Money) -> String {
    let cents = money.to_cents();
    let reais = (cents / 100).to_string();
    let centavos = cents % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, digit) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{grouped},{centavos:02}")
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "R$ {}", format_brl(*self))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}
