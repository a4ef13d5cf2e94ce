//! Fixed-point money type with 2 decimal places.
//!
//! Amounts enter the engine as decimal strings and are converted once into
//! integer minor units (hundredths). All accumulation happens on those
//! integers; `Money` only reappears when a balance is rendered.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;

/// Largest accepted single amount, in minor units.
///
/// Keeps any realistic sum of balances well inside the 96-bit mantissa of
/// `rust_decimal::Decimal`.
pub const MAX_AMOUNT_MINOR_UNITS: i64 = 1_000_000_000_000_000;

/// A monetary value with exactly 2 decimal places.
///
/// # Examples
///
/// ```
/// use ledger_report::Money;
///
/// let balance = Money::from_minor_units(-10050);
/// assert_eq!(balance.to_string(), "-100.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Builds a value from hundredths of the currency unit.
    pub fn from_minor_units(minor_units: i128) -> Self {
        Money(Decimal::from_i128_with_scale(minor_units, Self::SCALE))
    }

    /// Parses a transfer amount.
    ///
    /// Returns `None` unless the input is numeric, strictly positive, has at
    /// most 2 significant decimal places and does not exceed
    /// [`MAX_AMOUNT_MINOR_UNITS`]. Trailing zeros beyond the scale are
    /// accepted (`"1.500"` is `1.50`). Digit separators, exponents and any
    /// input that does not fit a `Decimal` exactly are rejected.
    pub fn parse_amount(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if !is_plain_decimal(trimmed) {
            return None;
        }

        let value = Decimal::from_str_exact(trimmed).ok()?;
        if value <= Decimal::ZERO || value.normalize().scale() > Self::SCALE {
            return None;
        }

        let mut scaled = value;
        scaled.rescale(Self::SCALE);
        let money = Money(scaled);
        if money.to_minor_units() > i128::from(MAX_AMOUNT_MINOR_UNITS) {
            return None;
        }
        Some(money)
    }

    /// Returns the value in hundredths of the currency unit.
    pub fn to_minor_units(&self) -> i128 {
        let mut scaled = self.0;
        scaled.rescale(Self::SCALE);
        scaled.mantissa()
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven)
    }
}

/// An optional sign, digits, and optionally one decimal point followed by
/// more digits.
fn is_plain_decimal(s: &str) -> bool {
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    match unsigned.split_once('.') {
        Some((int_part, frac_part)) => is_digits(int_part) && is_digits(frac_part),
        None => is_digits(unsigned),
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
