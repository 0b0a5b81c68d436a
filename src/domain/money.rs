use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::order::PriceError;

/// Number of micro-units in one currency unit.
const SCALE: i64 = 1_000_000;
const FRACTION_DIGITS: u32 = 6;

/// Fixed-point monetary amount, stored as micro-units (1e-6 of the unit).
///
/// Sums are exact integer additions, so accumulating the same prices in the
/// same order always yields the same total. On the wire the amount is a plain
/// JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn micros(&self) -> i64 {
        self.0
    }

    /// Parse a non-negative decimal such as `10`, `10.5`, `10.00` or `1.5e2`.
    ///
    /// Digits beyond the sixth fractional place are rounded half to even, so
    /// `0.1234565` becomes `0.123456` and `19.999999999` becomes `20.00`.
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
            Some((m, e)) => (m, Some(e)),
            None => (unsigned, None),
        };
        let (whole_str, frac_str) = match mantissa.split_once('.') {
            Some((w, f)) => (w, f),
            None => (mantissa, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole_str.is_empty() && frac_str.is_empty())
            || !all_digits(whole_str)
            || !all_digits(frac_str)
        {
            return Err(PriceError::Invalid(raw.to_string()));
        }

        let exponent: Option<i64> = match exponent {
            Some(e) => {
                let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
                if digits.is_empty() || !all_digits(digits) {
                    return Err(PriceError::Invalid(raw.to_string()));
                }
                Some(e.parse().map_err(|_| PriceError::OutOfRange(raw.to_string()))?)
            }
            None => None,
        };

        let whole_str = if whole_str.is_empty() { "0" } else { whole_str };
        let normalized = if frac_str.is_empty() {
            whole_str.to_string()
        } else {
            format!("{whole_str}.{frac_str}")
        };
        let decimal = match exponent {
            Some(exp) => Decimal::from_scientific(&format!("{normalized}e{exp}")),
            None => Decimal::from_str(&normalized),
        }
        .map_err(|_| PriceError::OutOfRange(raw.to_string()))?;

        if negative && !decimal.is_zero() {
            return Err(PriceError::Negative(raw.to_string()));
        }

        let micros = decimal
            .round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::MidpointNearestEven)
            .checked_mul(Decimal::from(SCALE))
            .and_then(|scaled| scaled.to_i64())
            .ok_or_else(|| PriceError::OutOfRange(raw.to_string()))?;

        Ok(Self(micros))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn to_f64(&self) -> f64 {
        self.micros() as f64 / SCALE as f64
    }
}

impl fmt::Display for Money {
    /// At least two fractional digits: `15.00`, `0.125`, `3.000001`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let frac = format!("{:06}", abs % SCALE as u64);
        let trimmed = frac.trim_end_matches('0');
        let shown = if trimmed.len() < 2 { &frac[..2] } else { trimmed };
        write!(f, "{sign}{whole}.{shown}")
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(serde::de::Error::custom("amount must be finite"));
        }
        let scaled = (value * SCALE as f64).round();
        // i64::MAX rounds up to 2^63 as f64, so that bound is exclusive
        if scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
            return Err(serde::de::Error::custom(format!("amount {value} is out of range")));
        }
        Ok(Money::from_micros(scaled as i64))
    }
}
