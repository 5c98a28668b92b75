// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Fixed-point time lengths.
//!
//! [`Duration`] stores a length of time as an integer day count plus
//! seconds-of-day, with the invariant `0 <= sec < 86 400`.  A single `f64`
//! of seconds starts dropping sub-microsecond digits after a few decades;
//! the split representation keeps nanosecond-class resolution at any day
//! count an `i64` can hold.
//!
//! Negative lengths keep the seconds in the same positive range by carrying
//! a more negative day: `-0.5` day is `(-1, 43 200.0)`.
//!
//! [`TimeUnit`] names the units a duration can be read back in through
//! [`Duration::get`], which reports the value as an exact [`IntFrac`] pair.

use crate::error::{TimeError, TimeResult};
use crate::intfrac::IntFrac;
use qtty::{Days, Seconds};
use std::fmt;
use std::ops::{Add, Div, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

/// Seconds in one fixed-length day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// ═══════════════════════════════════════════════════════════════════════════
// TimeUnit
// ═══════════════════════════════════════════════════════════════════════════

/// Units a [`Duration`] can be expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Fixed 86 400-second days.
    Day,
    /// 3 600-second hours.
    Hour,
    /// 60-second minutes.
    Min,
    /// SI seconds.
    Sec,
}

impl TimeUnit {
    /// Every supported unit, largest first.
    pub const ALL: [TimeUnit; 4] = [TimeUnit::Day, TimeUnit::Hour, TimeUnit::Min, TimeUnit::Sec];

    /// Canonical unit name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            TimeUnit::Day => "Day",
            TimeUnit::Hour => "Hour",
            TimeUnit::Min => "Min",
            TimeUnit::Sec => "Sec",
        }
    }

    /// How many of this unit make up one day.
    #[inline]
    pub const fn per_day(self) -> i64 {
        match self {
            TimeUnit::Day => 1,
            TimeUnit::Hour => 24,
            TimeUnit::Min => 1_440,
            TimeUnit::Sec => 86_400,
        }
    }

    /// Length of one unit in seconds.
    #[inline]
    pub const fn seconds_per_unit(self) -> f64 {
        match self {
            TimeUnit::Day => 86_400.0,
            TimeUnit::Hour => 3_600.0,
            TimeUnit::Min => 60.0,
            TimeUnit::Sec => 1.0,
        }
    }

    /// Case-insensitive lookup by unit name.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrochron::TimeUnit;
    ///
    /// assert_eq!(TimeUnit::from_name("sec").unwrap(), TimeUnit::Sec);
    /// assert_eq!(TimeUnit::from_name("DAY").unwrap(), TimeUnit::Day);
    /// assert!(TimeUnit::from_name("fortnight").is_err());
    /// ```
    pub fn from_name(name: &str) -> TimeResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| TimeError::not_found("time unit", name))
    }
}

impl std::str::FromStr for TimeUnit {
    type Err = TimeError;

    fn from_str(s: &str) -> TimeResult<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Duration
// ═══════════════════════════════════════════════════════════════════════════

/// Folds seconds of any magnitude into whole days plus a remainder in
/// `[0, 86 400)`.
///
/// Floating tails at a day boundary are clamped into the invariant rather
/// than left one ulp outside it, so a remainder can never read back as a
/// full day.
pub(crate) fn split_sec(sec: f64) -> TimeResult<(i64, f64)> {
    if !sec.is_finite() {
        return Err(TimeError::range_violation(format!(
            "{sec} seconds cannot be split into days"
        )));
    }
    let days = (sec / SECONDS_PER_DAY).floor();
    if days >= i64::MAX as f64 || days < i64::MIN as f64 {
        return Err(TimeError::range_violation(format!(
            "{sec} seconds overflows the i64 day count"
        )));
    }
    let mut day = days as i64;
    let mut rem = sec - days * SECONDS_PER_DAY;
    if rem >= SECONDS_PER_DAY {
        // the quotient rounded down across a boundary; the true remainder
        // is a hair under zero on the next day
        day += 1;
        rem = 0.0;
    } else if rem < 0.0 {
        rem = 0.0;
    }
    Ok((day, rem))
}

/// A fixed-point length of time: whole days plus seconds-of-day.
///
/// The invariant `0 <= sec < 86 400` holds after every construction and
/// every arithmetic operation.  Durations order and compare exactly by
/// `(day, sec)`.
///
/// # Examples
///
/// ```
/// use astrochron::{Duration, TimeUnit};
///
/// // Seconds of any magnitude fold into whole days.
/// let d = Duration::new(0, 90_000.0).unwrap();
/// assert_eq!((d.days(), d.secs()), (1, 3_600.0));
///
/// // Six days, read back in seconds, stay exact.
/// let week = Duration::new(6, 0.0).unwrap();
/// let secs = week.get(TimeUnit::Sec).unwrap();
/// assert_eq!((secs.int(), secs.frac()), (518_400, 0.0));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Duration {
    day: i64,
    sec: f64,
}

impl Duration {
    /// The zero-length duration.
    pub const ZERO: Duration = Duration { day: 0, sec: 0.0 };

    /// Creates a duration from a day count and seconds of any magnitude.
    ///
    /// Seconds outside `[0, 86 400)` are folded into the day count.  Fails
    /// with [`TimeError::RangeViolation`] when the seconds are not finite
    /// or the folded day count overflows `i64`.
    pub fn new(day: i64, sec: f64) -> TimeResult<Self> {
        let (extra, sec) = split_sec(sec)?;
        let day = day.checked_add(extra).ok_or_else(|| {
            TimeError::range_violation(format!("day count {day} + {extra} overflows i64"))
        })?;
        Ok(Self { day, sec })
    }

    /// Creates a duration from fractional days.
    ///
    /// Sub-second precision degrades with the magnitude of `days`; pass an
    /// explicit day count to [`new`](Self::new) when exactness matters.
    pub fn from_days(days: f64) -> TimeResult<Self> {
        Self::new(0, days * SECONDS_PER_DAY)
    }

    /// Creates a duration from seconds.
    pub fn from_seconds(seconds: f64) -> TimeResult<Self> {
        Self::new(0, seconds)
    }

    /// The whole-day part.
    #[inline]
    pub const fn days(&self) -> i64 {
        self.day
    }

    /// The seconds-of-day part, in `[0, 86 400)`.
    #[inline]
    pub const fn secs(&self) -> f64 {
        self.sec
    }

    /// The length in days as a [`Days`] quantity (single-float, lossy for
    /// large day counts).
    #[inline]
    pub fn as_days(&self) -> Days {
        Days::new(self.day as f64 + self.sec / SECONDS_PER_DAY)
    }

    /// The length in seconds as a [`Seconds`] quantity (single-float, lossy
    /// for large day counts).
    #[inline]
    pub fn as_seconds(&self) -> Seconds {
        Seconds::new(self.day as f64 * SECONDS_PER_DAY + self.sec)
    }

    /// Expresses the duration in `unit` as an exact integer + fraction pair.
    ///
    /// The whole-day part contributes an exact integer count of units; the
    /// seconds-of-day contribute strictly less than one day's worth.  Fails
    /// with [`TimeError::RangeViolation`] when the integer count overflows
    /// `i64`.
    pub fn get(&self, unit: TimeUnit) -> TimeResult<IntFrac> {
        let from_days = self.day.checked_mul(unit.per_day()).ok_or_else(|| {
            TimeError::range_violation(format!(
                "{} days in {} overflows i64",
                self.day,
                unit.name()
            ))
        })?;
        let from_secs = IntFrac::from_f64(self.sec / unit.seconds_per_unit())?;
        let int = from_days.checked_add(from_secs.int()).ok_or_else(|| {
            TimeError::range_violation(format!(
                "{} days {} s in {} overflows i64",
                self.day,
                self.sec,
                unit.name()
            ))
        })?;
        let frac = from_secs.frac();
        // the seconds part is non-negative, so only a negative total can
        // leave the fraction on the wrong side of the integer
        if int < 0 && frac > 0.0 {
            IntFrac::new(int + 1, frac - 1.0)
        } else {
            IntFrac::new(int, frac)
        }
    }

    /// Symmetric closeness predicate: the two durations differ by at most
    /// `tolerance`, whichever side is larger.
    ///
    /// Defined as `self <= other + tolerance` when `self > other`, else
    /// `other <= self + tolerance`, which keeps the test symmetric under
    /// swapping the operands.
    pub fn equivalent_to(&self, other: &Duration, tolerance: &Duration) -> bool {
        if self > other {
            *self <= *other + *tolerance
        } else {
            *other <= *self + *tolerance
        }
    }

    /// True for lengths strictly between minus one day and one day.
    #[inline]
    fn is_sub_day(&self) -> bool {
        self.day == 0 || (self.day == -1 && self.sec > 0.0)
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut day = self.day + rhs.day;
        let mut sec = self.sec + rhs.sec;
        // each operand is below one day of seconds, so one carry suffices
        if sec >= SECONDS_PER_DAY {
            day += 1;
            sec -= SECONDS_PER_DAY;
        }
        Self { day, sec }
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self::Output {
        if self.sec == 0.0 {
            Self {
                day: -self.day,
                sec: 0.0,
            }
        } else {
            let sec = SECONDS_PER_DAY - self.sec;
            if sec >= SECONDS_PER_DAY {
                // the seconds were below one ulp of the boundary
                Self {
                    day: -self.day,
                    sec: 0.0,
                }
            } else {
                Self {
                    day: -self.day - 1,
                    sec,
                }
            }
        }
    }
}

impl Div for Duration {
    type Output = f64;

    /// Ratio of two durations.
    ///
    /// When both operands are shorter than one day the ratio is taken in
    /// seconds, preserving sub-second digits; otherwise in days.
    fn div(self, rhs: Self) -> Self::Output {
        if self.is_sub_day() && rhs.is_sub_day() {
            (self.day as f64 * SECONDS_PER_DAY + self.sec)
                / (rhs.day as f64 * SECONDS_PER_DAY + rhs.sec)
        } else {
            (self.day as f64 + self.sec / SECONDS_PER_DAY)
                / (rhs.day as f64 + rhs.sec / SECONDS_PER_DAY)
        }
    }
}

// ── Display ───────────────────────────────────────────────────────────────

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days {} seconds", self.day, self.sec)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Duration", 2)?;
        s.serialize_field("day", &self.day)?;
        s.serialize_field("sec", &self.sec)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Duration {
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
        Duration::new(raw.day, raw.sec).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
