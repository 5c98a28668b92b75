// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Instants tagged with their time system.
//!
//! [`AbsoluteTime`] pairs a [`Moment`] with the [`TimeSystem`] it is read
//! in; [`ElapsedTime`] pairs a [`Duration`] with a system the same way.
//! Instants in different systems compare by converting the right operand
//! into the left one's system and running that system's own difference
//! law, so a TAI reading and the equal UTC reading are equal.
//!
//! Subtracting two instants yields a [`TimeInterval`], which re-measures
//! its length in whatever system it is asked about.

use crate::duration::Duration;
use crate::error::{TimeError, TimeResult};
use crate::interval::TimeInterval;
use crate::moment::Moment;
use crate::system::TimeSystem;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Neg, Sub};

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

/// MJD of the Unix epoch, 1970-01-01T00:00:00 UTC.
const UNIX_EPOCH_MJD: i64 = 40_587;

// ═══════════════════════════════════════════════════════════════════════════
// ElapsedTime
// ═══════════════════════════════════════════════════════════════════════════

/// A length of time tagged with the system it was measured in.
///
/// Arithmetic between elapsed times demands matching systems; mixing two
/// is a [`TimeError::ConfigurationConflict`].
///
/// # Examples
///
/// ```
/// use astrochron::{Duration, ElapsedTime, TimeSystem};
///
/// let a = ElapsedTime::new(TimeSystem::Tdb, Duration::new(0, 100.0).unwrap());
/// let b = ElapsedTime::new(TimeSystem::Tdb, Duration::new(0, 50.0).unwrap());
/// let sum = a.checked_add(&b).unwrap();
/// assert_eq!(sum.duration(), Duration::new(0, 150.0).unwrap());
///
/// let foreign = ElapsedTime::new(TimeSystem::Tt, b.duration());
/// assert!(a.checked_add(&foreign).is_err());
/// ```
#[derive(Debug, Copy, Clone)]
pub struct ElapsedTime {
    system: TimeSystem,
    duration: Duration,
}

impl ElapsedTime {
    /// Tags `duration` with `system`.
    #[inline]
    pub const fn new(system: TimeSystem, duration: Duration) -> Self {
        Self { system, duration }
    }

    /// Name-keyed constructor.
    pub fn from_name(system_name: &str, duration: Duration) -> TimeResult<Self> {
        Ok(Self::new(TimeSystem::from_name(system_name)?, duration))
    }

    /// Tags a plain second count with `system`.
    pub fn from_seconds(system: TimeSystem, seconds: f64) -> TimeResult<Self> {
        Ok(Self::new(system, Duration::from_seconds(seconds)?))
    }

    #[inline]
    pub const fn system(&self) -> TimeSystem {
        self.system
    }

    #[inline]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Sum of two elapsed times in the same system.
    pub fn checked_add(&self, other: &ElapsedTime) -> TimeResult<ElapsedTime> {
        self.require_same_system(other)?;
        Ok(Self::new(self.system, self.duration + other.duration))
    }

    /// Difference of two elapsed times in the same system.
    pub fn checked_sub(&self, other: &ElapsedTime) -> TimeResult<ElapsedTime> {
        self.require_same_system(other)?;
        Ok(Self::new(self.system, self.duration - other.duration))
    }

    fn require_same_system(&self, other: &ElapsedTime) -> TimeResult<()> {
        if self.system == other.system {
            Ok(())
        } else {
            Err(TimeError::configuration_conflict(
                self.system.name(),
                other.system.name(),
            ))
        }
    }
}

impl Neg for ElapsedTime {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self::new(self.system, -self.duration)
    }
}

impl PartialEq for ElapsedTime {
    fn eq(&self, other: &Self) -> bool {
        self.system == other.system && self.duration == other.duration
    }
}

impl PartialOrd for ElapsedTime {
    /// Orders elapsed times of the same system; different systems are
    /// incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.system == other.system {
            self.duration.partial_cmp(&other.duration)
        } else {
            None
        }
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.duration, self.system)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AbsoluteTime
// ═══════════════════════════════════════════════════════════════════════════

/// An instant tagged with the system its moment is read in.
///
/// # Examples
///
/// ```
/// use astrochron::{AbsoluteTime, Duration, ElapsedTime, Moment, TimeSystem};
///
/// let t = AbsoluteTime::new(TimeSystem::Tdb, 51_910, Duration::new(0, 1_000.0).unwrap())
///     .unwrap();
/// let later = t
///     .add_elapsed(&ElapsedTime::new(TimeSystem::Tdb, Duration::new(0, 100.0).unwrap()))
///     .unwrap();
/// assert_eq!(later.moment(), Moment::new(51_910, 1_100.0));
/// ```
#[derive(Debug, Copy, Clone)]
pub struct AbsoluteTime {
    system: TimeSystem,
    moment: Moment,
}

impl AbsoluteTime {
    /// The instant `elapsed` after midnight of `origin_mjd`, advanced by
    /// the system's own law.
    pub fn new(system: TimeSystem, origin_mjd: i64, elapsed: Duration) -> TimeResult<Self> {
        let moment = system.compute_advanced_time(Moment::new(origin_mjd, 0.0), elapsed)?;
        Ok(Self { system, moment })
    }

    /// Name-keyed constructor.
    pub fn from_name(system_name: &str, origin_mjd: i64, elapsed: Duration) -> TimeResult<Self> {
        Self::new(TimeSystem::from_name(system_name)?, origin_mjd, elapsed)
    }

    /// Wraps a moment as is, without folding its seconds.
    ///
    /// This is the entry point for moments produced by the format layer,
    /// including UTC readings inside an inserted leap second.
    #[inline]
    pub const fn from_moment(system: TimeSystem, moment: Moment) -> Self {
        Self { system, moment }
    }

    #[inline]
    pub const fn system(&self) -> TimeSystem {
        self.system
    }

    #[inline]
    pub const fn moment(&self) -> Moment {
        self.moment
    }

    /// The same instant read in another system.
    pub fn to_system(&self, system: TimeSystem) -> TimeResult<Self> {
        Ok(Self {
            system,
            moment: system.convert_from(self.system, self.moment)?,
        })
    }

    /// The instant `elapsed` later, advanced in this instant's own system.
    ///
    /// The elapsed time's tag does not matter here: elapsed seconds are SI
    /// seconds in every supported system.
    pub fn add_elapsed(&self, elapsed: &ElapsedTime) -> TimeResult<Self> {
        Ok(Self {
            system: self.system,
            moment: self
                .system
                .compute_advanced_time(self.moment, elapsed.duration())?,
        })
    }

    /// The instant `elapsed` earlier.
    pub fn sub_elapsed(&self, elapsed: &ElapsedTime) -> TimeResult<Self> {
        self.add_elapsed(&-*elapsed)
    }

    /// Symmetric closeness predicate: the instants differ by at most
    /// `tolerance`, measured in this instant's system.
    pub fn equivalent_to(&self, other: &AbsoluteTime, tolerance: &ElapsedTime) -> TimeResult<bool> {
        let converted = self.system.convert_from(other.system, other.moment)?;
        let diff = self.system.compute_time_difference(self.moment, converted)?;
        let tol = tolerance.duration();
        Ok(if diff > Duration::ZERO {
            diff <= tol
        } else {
            -diff <= tol
        })
    }

    // ── Chrono interop ────────────────────────────────────────────────────

    /// The UTC instant of a chrono timestamp.
    ///
    /// POSIX time counts fixed 86 400-second days, which is exactly the
    /// folded (day, seconds) form of a civil UTC reading.
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let stamp = datetime.timestamp();
        let day = UNIX_EPOCH_MJD + stamp.div_euclid(86_400);
        let sec = stamp.rem_euclid(86_400) as f64 + datetime.timestamp_subsec_nanos() as f64 / 1e9;
        Self::from_moment(TimeSystem::Utc, Moment::new(day, sec))
    }

    /// This instant as a chrono UTC datetime, at nanosecond resolution.
    ///
    /// A reading inside an inserted leap second folds onto the following
    /// midnight; chrono has no 23:59:60.  Fails with
    /// [`TimeError::RangeViolation`] outside chrono's representable range.
    pub fn to_datetime(&self) -> TimeResult<DateTime<Utc>> {
        let utc = self.to_system(TimeSystem::Utc)?;
        let folded = utc.moment.rationalized()?;
        let whole = folded.sec.floor();
        let mut nanos = ((folded.sec - whole) * 1e9).round() as u32;
        let mut stamp = folded
            .day
            .checked_sub(UNIX_EPOCH_MJD)
            .and_then(|days| days.checked_mul(86_400))
            .and_then(|base| base.checked_add(whole as i64))
            .ok_or_else(|| {
                TimeError::range_violation(format!(
                    "MJD {} is outside the Unix timestamp range",
                    folded.day
                ))
            })?;
        if nanos >= 1_000_000_000 {
            stamp += 1;
            nanos = 0;
        }
        DateTime::from_timestamp(stamp, nanos).ok_or_else(|| {
            TimeError::range_violation(format!(
                "MJD {} is outside chrono's representable range",
                folded.day
            ))
        })
    }
}

// ── Comparison ────────────────────────────────────────────────────────────

impl PartialEq for AbsoluteTime {
    /// Instants are equal when they name the same physical instant, even
    /// in different systems.
    fn eq(&self, other: &Self) -> bool {
        matches!(self.partial_cmp(other), Some(Ordering::Equal))
    }
}

impl PartialOrd for AbsoluteTime {
    /// Converts the right operand into the left one's system and compares
    /// through that system's difference law.  Incomparable when the
    /// conversion fails, e.g. UTC before the leap-second era.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let converted = self.system.convert_from(other.system, other.moment).ok()?;
        let diff = self
            .system
            .compute_time_difference(self.moment, converted)
            .ok()?;
        diff.partial_cmp(&Duration::ZERO)
    }
}

impl Sub for AbsoluteTime {
    type Output = TimeInterval;

    /// The interval from `rhs` up to `self`.
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        TimeInterval::new(rhs, self)
    }
}

impl fmt::Display for AbsoluteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.moment, self.system)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for AbsoluteTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("AbsoluteTime", 3)?;
        s.serialize_field("system", self.system.name())?;
        s.serialize_field("day", &self.moment.day)?;
        s.serialize_field("sec", &self.moment.sec)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for AbsoluteTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            system: String,
            day: i64,
            sec: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        let system = TimeSystem::from_name(&raw.system).map_err(serde::de::Error::custom)?;
        Ok(AbsoluteTime::from_moment(
            system,
            Moment::new(raw.day, raw.sec),
        ))
    }
}

#[cfg(feature = "serde")]
impl Serialize for ElapsedTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("ElapsedTime", 3)?;
        s.serialize_field("system", self.system.name())?;
        s.serialize_field("day", &self.duration.days())?;
        s.serialize_field("sec", &self.duration.secs())?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ElapsedTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            system: String,
            day: i64,
            sec: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        let system = TimeSystem::from_name(&raw.system).map_err(serde::de::Error::custom)?;
        let duration = Duration::new(raw.day, raw.sec).map_err(serde::de::Error::custom)?;
        Ok(ElapsedTime::new(system, duration))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
