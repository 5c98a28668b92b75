// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Exact integer + fraction pairs.
//!
//! [`IntFrac`] splits a real value into an exact integer part and a
//! fractional remainder confined to `(-1, 1)`. Day counts and year numbers
//! held this way never lose precision to an accompanying fraction, which a
//! single `f64` cannot guarantee once the integer part grows large.
//!
//! The fraction's sign must be compatible with the integer's: a positive
//! integer carries a non-negative fraction, a negative integer a
//! non-positive one, and a zero integer either sign.

use crate::error::{TimeError, TimeResult};
use std::fmt;

/// An exact integer part plus a fractional remainder in `(-1, 1)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IntFrac {
    int: i64,
    frac: f64,
}

impl IntFrac {
    /// Creates a pair from an already-split integer and fraction.
    ///
    /// Fails with [`TimeError::RangeViolation`] when `|frac| >= 1` or the
    /// fraction's sign opposes the integer's.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrochron::IntFrac;
    ///
    /// let x = IntFrac::new(51910, 0.5).unwrap();
    /// assert_eq!(x.value(), 51910.5);
    ///
    /// assert!(IntFrac::new(1, -0.5).is_err());
    /// assert!(IntFrac::new(0, 1.0).is_err());
    /// ```
    pub fn new(int: i64, frac: f64) -> TimeResult<Self> {
        if !(frac > -1.0 && frac < 1.0) {
            return Err(TimeError::range_violation(format!(
                "fractional part {frac} outside (-1, 1)"
            )));
        }
        if (int > 0 && frac < 0.0) || (int < 0 && frac > 0.0) {
            return Err(TimeError::range_violation(format!(
                "fractional part {frac} opposes the sign of integer part {int}"
            )));
        }
        Ok(Self { int, frac })
    }

    /// Splits a raw double into integer and fraction.
    ///
    /// The integer part is exact; the fraction is rounded at the last
    /// decimal digit a double can faithfully carry alongside that integer,
    /// so repeated `from_f64(x.value())` round-trips are stable. (A
    /// truncating split is not: recombining through `value()` rounds at
    /// the pair's ulp, which can push a fraction sitting on a digit
    /// boundary below it, and the next split then chops one digit lower.)
    ///
    /// Fails with [`TimeError::RangeViolation`] when the value is not
    /// finite or its integer part does not fit an `i64`.
    pub fn from_f64(value: f64) -> TimeResult<Self> {
        if !value.is_finite() {
            return Err(TimeError::range_violation(format!(
                "{value} has no integer/fraction split"
            )));
        }
        let int_part = value.trunc();
        if int_part >= i64::MAX as f64 || int_part < i64::MIN as f64 {
            return Err(TimeError::range_violation(format!(
                "integer part of {value} overflows i64"
            )));
        }
        let mut int = int_part as i64;

        // A double carries f64::DIGITS faithful decimal digits in total;
        // whatever the integer part consumes is unavailable to the fraction.
        let int_digits = if int == 0 {
            0
        } else {
            int.unsigned_abs().ilog10() + 1
        };
        let keep = f64::DIGITS.saturating_sub(int_digits);
        let scale = 10f64.powi(keep as i32);
        let mut frac = ((value - int_part) * scale).round() / scale;

        // rounding the last kept digit can complete a whole unit
        if frac >= 1.0 {
            int += 1;
            frac = 0.0;
        } else if frac <= -1.0 {
            int -= 1;
            frac = 0.0;
        }

        Ok(Self { int, frac })
    }

    /// Parses a plain decimal literal (`[+-]?digits[.digits]`, `.digits`
    /// also accepted) directly into integer and fraction.
    ///
    /// The two halves are parsed separately, so digits that a single
    /// double would drop next to a large integer part are preserved.
    /// Malformed literals fail with [`TimeError::ParseFailure`]; an
    /// integer part that overflows `i64` is a
    /// [`TimeError::RangeViolation`].
    pub fn parse(input: &str) -> TimeResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(TimeError::parse_failure(input, "empty numeric literal"));
        }

        let (negative, body) = match s.as_bytes()[0] {
            b'+' => (false, &s[1..]),
            b'-' => (true, &s[1..]),
            _ => (false, s),
        };

        let (int_digits, frac_digits) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(TimeError::parse_failure(input, "no digits"));
        }
        if !int_digits.bytes().all(|b| b.is_ascii_digit())
            || !frac_digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TimeError::parse_failure(
                input,
                "expected a plain decimal literal",
            ));
        }

        let magnitude: i64 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| {
                TimeError::range_violation(format!("integer part of \"{s}\" overflows i64"))
            })?
        };
        let frac_magnitude: f64 = if frac_digits.is_empty() {
            0.0
        } else {
            // Parsed as "0.<digits>" so no integer digits compete for precision.
            format!("0.{frac_digits}")
                .parse()
                .map_err(|_| TimeError::parse_failure(input, "unreadable fractional digits"))?
        };

        if negative {
            Ok(Self {
                int: -magnitude,
                frac: -frac_magnitude,
            })
        } else {
            Ok(Self {
                int: magnitude,
                frac: frac_magnitude,
            })
        }
    }

    /// The exact integer part.
    #[inline]
    pub const fn int(&self) -> i64 {
        self.int
    }

    /// The fractional remainder in `(-1, 1)`.
    #[inline]
    pub const fn frac(&self) -> f64 {
        self.frac
    }

    /// The recombined value. Lossy once the integer part outgrows the
    /// fraction's precision; that is the reason this type exists.
    #[inline]
    pub fn value(&self) -> f64 {
        self.int as f64 + self.frac
    }

    /// Renders the pair by splicing the integer digits and the fraction
    /// digits, avoiding the precision loss of going through one `f64`.
    ///
    /// With `decimals = None` the fraction prints in its shortest form and
    /// an exact integer prints bare (`51910`, `2451910.5`). With
    /// `Some(n)` the fraction is rounded to `n` digits, carrying into the
    /// integer when it rounds up to a whole unit.
    pub fn format_value(&self, decimals: Option<usize>) -> String {
        let sign = if self.int < 0 || self.frac < 0.0 { "-" } else { "" };
        let int_abs = self.int.unsigned_abs();
        let frac_abs = self.frac.abs();

        match decimals {
            None => {
                if frac_abs == 0.0 {
                    format!("{sign}{int_abs}")
                } else {
                    let rendered = format!("{frac_abs}");
                    let digits = rendered.strip_prefix("0.").unwrap_or("0");
                    format!("{sign}{int_abs}.{digits}")
                }
            }
            Some(0) => {
                let carry = if frac_abs.round() >= 1.0 { 1 } else { 0 };
                format!("{sign}{}", int_abs + carry)
            }
            Some(n) => {
                let scale = 10f64.powi(n as i32);
                let mut units = int_abs;
                let mut scaled = (frac_abs * scale).round() as u64;
                if scaled >= scale as u64 {
                    units += 1;
                    scaled -= scale as u64;
                }
                format!("{sign}{units}.{scaled:0n$}")
            }
        }
    }
}

impl fmt::Display for IntFrac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_value(None))
    }
}
