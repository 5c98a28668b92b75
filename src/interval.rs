// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Anchored time intervals.
//!
//! A [`TimeInterval`] keeps both endpoints instead of a pre-computed
//! length.  Its length is re-derived on every request, in whatever system
//! the caller names, so a leap-second table reload between two calls is
//! reflected in the next answer.

use crate::error::TimeResult;
use crate::instant::{AbsoluteTime, ElapsedTime};
use crate::system::TimeSystem;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

/// The span between two instants, each carrying its own system tag.
///
/// # Examples
///
/// ```
/// use astrochron::{AbsoluteTime, Moment, TimeSystem};
///
/// let start = AbsoluteTime::from_moment(TimeSystem::Tdb, Moment::new(51_910, 1_000.0));
/// let end = AbsoluteTime::from_moment(TimeSystem::Tdb, Moment::new(51_910, 2_000.0));
/// let elapsed = (end - start).compute_elapsed_time("TDB").unwrap();
/// assert_eq!(elapsed.duration().secs(), 1_000.0);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct TimeInterval {
    start: AbsoluteTime,
    end: AbsoluteTime,
}

impl TimeInterval {
    /// Anchors the interval between two instants.
    #[inline]
    pub const fn new(start: AbsoluteTime, end: AbsoluteTime) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn start(&self) -> AbsoluteTime {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> AbsoluteTime {
        self.end
    }

    /// Measures the interval in the named system, end minus start.
    ///
    /// Both endpoints are converted into the requested system and the
    /// difference runs under that system's own law, so a UTC measurement
    /// counts inserted leap seconds.  Nothing is cached.
    pub fn compute_elapsed_time(&self, system_name: &str) -> TimeResult<ElapsedTime> {
        let system = TimeSystem::from_name(system_name)?;
        let start = self.start.to_system(system)?;
        let end = self.end.to_system(system)?;
        let duration = system.compute_time_difference(end.moment(), start.moment())?;
        Ok(ElapsedTime::new(system, duration))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(feature = "serde")]
impl Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("TimeInterval", 2)?;
        s.serialize_field("start", &self.start)?;
        s.serialize_field("end", &self.end)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: AbsoluteTime,
            end: AbsoluteTime,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(TimeInterval::new(raw.start, raw.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::SECONDS_PER_DAY;
    use crate::moment::Moment;

    fn at(system: TimeSystem, day: i64, sec: f64) -> AbsoluteTime {
        AbsoluteTime::from_moment(system, Moment::new(day, sec))
    }

    #[test]
    fn measurement_in_the_native_system_is_exact() {
        let interval = TimeInterval::new(
            at(TimeSystem::Tdb, 51_910, 1_000.0),
            at(TimeSystem::Tdb, 51_910, 2_000.0),
        );
        let elapsed = interval.compute_elapsed_time("TDB").unwrap();
        assert_eq!(elapsed.system(), TimeSystem::Tdb);
        assert_eq!(elapsed.duration().days(), 0);
        assert_eq!(elapsed.duration().secs(), 1_000.0);
    }

    #[test]
    fn measurement_converts_both_endpoints() {
        let interval = TimeInterval::new(
            at(TimeSystem::Tdb, 51_910, 1_000.0),
            at(TimeSystem::Tdb, 51_910, 2_000.0),
        );
        // measured in TT the span is the same SI length, up to the
        // inverse-solver tolerance at each endpoint
        let elapsed = interval.compute_elapsed_time("tt").unwrap();
        let duration = elapsed.duration();
        let total = duration.days() as f64 * SECONDS_PER_DAY + duration.secs();
        assert!((total - 1_000.0).abs() < 1e-6, "span was {total}");
    }

    #[test]
    fn utc_measurement_counts_inserted_seconds() {
        // the 1998-12-31 insertion sits between these midnights
        let interval = TimeInterval::new(
            at(TimeSystem::Utc, 51_178, 0.0),
            at(TimeSystem::Utc, 51_179, 0.0),
        );
        let in_utc = interval.compute_elapsed_time("UTC").unwrap().duration();
        assert_eq!(in_utc.days(), 1);
        assert_eq!(in_utc.secs(), 1.0);

        // TAI agrees on the physical length
        let in_tai = interval.compute_elapsed_time("TAI").unwrap().duration();
        assert_eq!(in_tai.days(), 1);
        assert_eq!(in_tai.secs(), 1.0);
    }

    #[test]
    fn reversed_intervals_measure_negative() {
        let interval = TimeInterval::new(
            at(TimeSystem::Tt, 51_544, 100.0),
            at(TimeSystem::Tt, 51_544, 0.0),
        );
        let duration = interval.compute_elapsed_time("TT").unwrap().duration();
        assert_eq!(duration.days(), -1);
        assert_eq!(duration.secs(), 86_300.0);
    }

    #[test]
    fn unknown_system_names_are_rejected() {
        let interval = TimeInterval::new(
            at(TimeSystem::Tt, 51_544, 0.0),
            at(TimeSystem::Tt, 51_544, 1.0),
        );
        assert!(interval.compute_elapsed_time("GPS").is_err());
    }

    #[test]
    fn display_names_both_endpoints() {
        let interval = TimeInterval::new(
            at(TimeSystem::Tt, 51_544, 0.0),
            at(TimeSystem::Tt, 51_544, 100.0),
        );
        assert_eq!(
            format!("{interval}"),
            "0 seconds after 51544 MJD (TT) to 100 seconds after 51544 MJD (TT)"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip_keeps_both_endpoints() {
        let interval = TimeInterval::new(
            at(TimeSystem::Utc, 51_178, 0.0),
            at(TimeSystem::Tai, 51_179, 32.0),
        );
        let json = serde_json::to_string(&interval).unwrap();
        let back: TimeInterval = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start().system(), TimeSystem::Utc);
        assert_eq!(back.start().moment(), interval.start().moment());
        assert_eq!(back.end().system(), TimeSystem::Tai);
        assert_eq!(back.end().moment(), interval.end().moment());
    }
}
