// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Canonical instant carrier.
//!
//! A [`Moment`] pins an instant to a Modified Julian Day number plus
//! seconds since that day's midnight.  The seconds are deliberately
//! unconstrained: conversions accept values outside `[0, 86 400)` (an
//! instant just before midnight is naturally written with negative
//! seconds on the next day) and UTC can legitimately carry seconds past
//! `86 400` inside an inserted leap second.
//!
//! [`Moment::rationalized`] folds the seconds into `[0, 86 400)` with
//! fixed-length days; the time-system laws apply their own leap-aware
//! handling on top of it where needed.

use crate::duration::{split_sec, SECONDS_PER_DAY};
use crate::error::{TimeError, TimeResult};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

/// An instant as a Modified Julian Day number plus seconds of that day.
///
/// # Examples
///
/// ```
/// use astrochron::Moment;
///
/// let m = Moment::new(51_179, -0.001);
/// let r = m.rationalized().unwrap();
/// assert_eq!(r.day, 51_178);
/// assert!((r.sec - 86_399.999).abs() < 1e-9);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Moment {
    /// Modified Julian Day number.
    pub day: i64,
    /// Seconds since the day's midnight, any magnitude.
    pub sec: f64,
}

impl Moment {
    /// Creates a moment without folding the seconds.
    #[inline]
    pub const fn new(day: i64, sec: f64) -> Self {
        Self { day, sec }
    }

    /// Folds the seconds into `[0, 86 400)` with fixed 86 400-second days.
    ///
    /// Fails with [`TimeError::RangeViolation`] when the seconds are not
    /// finite or the folded day number overflows `i64`.
    pub fn rationalized(&self) -> TimeResult<Self> {
        if self.sec >= 0.0 && self.sec < SECONDS_PER_DAY {
            return Ok(*self);
        }
        let (extra, sec) = split_sec(self.sec)?;
        let day = self.day.checked_add(extra).ok_or_else(|| {
            TimeError::range_violation(format!("MJD {} + {extra} days overflows i64", self.day))
        })?;
        Ok(Self { day, sec })
    }

    /// The Julian Date split of this moment: `JD = MJD + 2 400 000.5`.
    ///
    /// The integer part carries the day count and the fractional part the
    /// half-day shift plus seconds, so the split loses none of the
    /// sub-second digits a single `f64` Julian Date would.
    #[inline]
    pub fn julian_date_parts(&self) -> (i64, f64) {
        (self.day + 2_400_000, 0.5 + self.sec / SECONDS_PER_DAY)
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seconds after {} MJD", self.sec, self.day)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for Moment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Moment", 2)?;
        s.serialize_field("day", &self.day)?;
        s.serialize_field("sec", &self.sec)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Moment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            day: i64,
            sec: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Moment::new(raw.day, raw.sec))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rationalized_is_identity_in_range() {
        let m = Moment::new(51_544, 43_200.0);
        assert_eq!(m.rationalized().unwrap(), m);
    }

    #[test]
    fn rationalized_folds_positive_overflow() {
        let r = Moment::new(51_544, 90_000.0).rationalized().unwrap();
        assert_eq!((r.day, r.sec), (51_545, 3_600.0));

        let r = Moment::new(51_544, 3.0 * SECONDS_PER_DAY).rationalized().unwrap();
        assert_eq!((r.day, r.sec), (51_547, 0.0));
    }

    #[test]
    fn rationalized_folds_negative_seconds() {
        let r = Moment::new(51_179, -0.001).rationalized().unwrap();
        assert_eq!(r.day, 51_178);
        assert!((r.sec - 86_399.999).abs() < 1e-9);

        let r = Moment::new(0, -86_400.0).rationalized().unwrap();
        assert_eq!((r.day, r.sec), (-1, 0.0));
    }

    #[test]
    fn rationalized_rejects_non_finite() {
        assert!(Moment::new(0, f64::NAN).rationalized().is_err());
        assert!(Moment::new(0, f64::INFINITY).rationalized().is_err());
    }

    #[test]
    fn julian_date_parts_carry_the_half_day() {
        let (int, frac) = Moment::new(51_544, 43_200.0).julian_date_parts();
        assert_eq!(int, 2_451_544);
        assert_eq!(frac, 1.0);

        // J2000.0: 2000-01-01T12:00:00 TT is JD 2 451 545.0
        let (int, frac) = Moment::new(51_544, 43_200.0).julian_date_parts();
        assert_eq!(int as f64 + frac, 2_451_545.0);
    }

    #[test]
    fn display_reads_like_an_offset() {
        assert_eq!(format!("{}", Moment::new(51_910, 0.5)), "0.5 seconds after 51910 MJD");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip_keeps_raw_seconds() {
        // seconds outside [0, 86 400) survive unfolded
        let m = Moment::new(51_179, -0.001);
        let json = serde_json::to_string(&m).unwrap();
        let back: Moment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
