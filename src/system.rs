// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time systems and the conversions between them.
//!
//! | System | Name | Relation |
//! |--------|------|----------|
//! | TAI | International Atomic Time | the base atomic scale |
//! | TT  | Terrestrial Time | TAI + 32.184 s |
//! | TDB | Barycentric Dynamical Time | TT + periodic relativistic terms |
//! | UTC | Coordinated Universal Time | TAI - (10 s + inserted leap seconds) |
//!
//! TT is the hub: any pair without a direct edge converts through it, with
//! UTC legs passing through TAI.  TT to TDB applies the active correction
//! series directly; the reverse direction has no closed form and runs a
//! fixed-point iteration bounded by [`TDB_TOLERANCE_SEC`] and
//! [`TDB_MAX_ITERATIONS`].
//!
//! # Leap-second handling
//!
//! The TAI-UTC offset is read from the process-wide [`LeapSecondTable`]
//! at the conversion's origin: the moment is folded into `[0, 86 400)`
//! first and the offset of that day applied, in both directions.  An
//! instant inside an inserted leap second therefore does not round-trip
//! bit-exactly across the boundary; the elapsed-time laws
//! ([`TimeSystem::compute_time_difference`] and
//! [`TimeSystem::compute_advanced_time`]) do count inserted seconds,
//! walking real day lengths, and can land on seconds-of-day past 86 400
//! inside an insertion.

use crate::duration::{Duration, SECONDS_PER_DAY};
use crate::error::{TimeError, TimeResult};
use crate::leapsec::LeapSecondTable;
use crate::moment::Moment;
use once_cell::sync::Lazy;
use qtty::Seconds;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// TT leads TAI by this fixed amount.
pub const TT_MINUS_TAI_SEC: f64 = 32.184;

/// Convergence tolerance of the TDB to TT fixed-point iteration, 100 ns.
pub const TDB_TOLERANCE_SEC: f64 = 1.0e-7;

/// Iteration cap of the TDB to TT fixed-point iteration.
pub const TDB_MAX_ITERATIONS: u32 = 100;

// ═══════════════════════════════════════════════════════════════════════════
// TDB correction
// ═══════════════════════════════════════════════════════════════════════════

/// A model of the periodic TDB-TT offset.
///
/// The Julian Date of the evaluation point arrives split into integer and
/// fractional parts so implementations keep sub-millisecond phase accuracy
/// far from J2000.
pub trait TdbCorrection: Send + Sync {
    /// Identifies the model; two corrections conflict exactly when their
    /// names differ.
    fn name(&self) -> &'static str;

    /// TDB-TT at the given Julian Date.
    fn tdb_minus_tt(&self, jd_int: i64, jd_frac: f64) -> Seconds;
}

/// The four dominant terms of the Fairhead & Bretagnon (1990) series.
///
/// Good to a few microseconds over several centuries around J2000, which
/// is well inside the 2 ms amplitude of the full effect.
#[derive(Debug, Copy, Clone, Default)]
pub struct FairheadBretagnon1990;

impl TdbCorrection for FairheadBretagnon1990 {
    fn name(&self) -> &'static str {
        "FB1990"
    }

    fn tdb_minus_tt(&self, jd_int: i64, jd_frac: f64) -> Seconds {
        // Julian centuries since J2000.0 (JD 2 451 545.0)
        let t = ((jd_int - 2_451_545) as f64 + jd_frac) / 36_525.0;

        let m_earth = (357.529_109_2 + 35_999.050_290_9 * t).to_radians();
        let m_jupiter = (246.451_2 + 3_035.233_5 * t).to_radians();
        let d_moon = (297.850_204_2 + 445_267.111_516_8 * t).to_radians();
        let omega = (125.044_555_0 - 1_934.136_209_1 * t).to_radians();

        Seconds::new(
            0.001_657 * (m_earth + 0.016_71 * m_earth.sin()).sin()
                + 0.000_022 * (d_moon - m_earth).sin()
                + 0.000_014 * (2.0 * d_moon).sin()
                + 0.000_005 * m_jupiter.sin()
                + 0.000_005 * omega.sin(),
        )
    }
}

static DEFAULT_CORRECTION: Lazy<Arc<dyn TdbCorrection>> =
    Lazy::new(|| Arc::new(FairheadBretagnon1990));
static SELECTED_CORRECTION: Lazy<RwLock<Option<Arc<dyn TdbCorrection>>>> =
    Lazy::new(|| RwLock::new(None));

/// Selects the process-wide TDB correction model.
///
/// The first selection wins for the lifetime of the process; re-selecting
/// a model of the same name is a no-op, while a different name fails with
/// [`TimeError::ConfigurationConflict`].  Until a model is selected,
/// conversions use [`FairheadBretagnon1990`].
pub fn select_tdb_correction(correction: Arc<dyn TdbCorrection>) -> TimeResult<()> {
    let mut slot = SELECTED_CORRECTION
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some(active) if active.name() != correction.name() => Err(
            TimeError::configuration_conflict(active.name(), correction.name()),
        ),
        _ => {
            *slot = Some(correction);
            Ok(())
        }
    }
}

/// The correction model conversions currently use.
pub fn active_tdb_correction() -> Arc<dyn TdbCorrection> {
    SELECTED_CORRECTION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| DEFAULT_CORRECTION.clone())
}

// ═══════════════════════════════════════════════════════════════════════════
// TimeSystem
// ═══════════════════════════════════════════════════════════════════════════

/// The supported time systems.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimeSystem {
    /// International Atomic Time.
    Tai,
    /// Terrestrial Time.
    Tt,
    /// Barycentric Dynamical Time.
    Tdb,
    /// Coordinated Universal Time.
    Utc,
}

impl TimeSystem {
    /// Every supported system.
    pub const ALL: [TimeSystem; 4] = [
        TimeSystem::Tai,
        TimeSystem::Tt,
        TimeSystem::Tdb,
        TimeSystem::Utc,
    ];

    /// Canonical system name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            TimeSystem::Tai => "TAI",
            TimeSystem::Tt => "TT",
            TimeSystem::Tdb => "TDB",
            TimeSystem::Utc => "UTC",
        }
    }

    /// Case-insensitive lookup by system name.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrochron::TimeSystem;
    ///
    /// assert_eq!(TimeSystem::from_name("tdb").unwrap(), TimeSystem::Tdb);
    /// assert!(TimeSystem::from_name("GPS").is_err());
    /// ```
    pub fn from_name(name: &str) -> TimeResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|system| system.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| TimeError::not_found("time system", name))
    }

    /// Converts `moment`, read in the `src` system, into this system.
    ///
    /// Converting a system into itself returns the moment unchanged, bit
    /// for bit.  Every other conversion folds the origin into
    /// `[0, 86 400)` and returns a folded result.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrochron::{Moment, TimeSystem};
    ///
    /// // 1999-01-01T00:00:00 UTC, 22 leap seconds into the era
    /// let tai = TimeSystem::Tai
    ///     .convert_from(TimeSystem::Utc, Moment::new(51_179, 0.0))
    ///     .unwrap();
    /// assert_eq!((tai.day, tai.sec), (51_179, 32.0));
    /// ```
    pub fn convert_from(self, src: TimeSystem, moment: Moment) -> TimeResult<Moment> {
        use TimeSystem::*;
        match (src, self) {
            (Tai, Tai) | (Tt, Tt) | (Tdb, Tdb) | (Utc, Utc) => Ok(moment),

            // direct edges
            (Tai, Tt) => tai_to_tt(moment),
            (Tt, Tai) => tt_to_tai(moment),
            (Tt, Tdb) => tt_to_tdb(moment),
            (Tdb, Tt) => tdb_to_tt(moment),
            (Utc, Tai) => utc_to_tai(moment),
            (Tai, Utc) => tai_to_utc(moment),

            // everything else routes through TT, UTC legs through TAI
            (Utc, Tt) => tai_to_tt(utc_to_tai(moment)?),
            (Tt, Utc) => tai_to_utc(tt_to_tai(moment)?),
            (Tai, Tdb) => tt_to_tdb(tai_to_tt(moment)?),
            (Tdb, Tai) => tt_to_tai(tdb_to_tt(moment)?),
            (Utc, Tdb) => tt_to_tdb(tai_to_tt(utc_to_tai(moment)?)?),
            (Tdb, Utc) => tai_to_utc(tt_to_tai(tdb_to_tt(moment)?)?),
        }
    }

    /// Elapsed time from `m2` to `m1`, both read in this system.
    ///
    /// Uniform systems subtract the pairs directly.  UTC additionally adds
    /// one second for every leap second inserted between the two days, so
    /// the result counts real SI seconds.
    pub fn compute_time_difference(self, m1: Moment, m2: Moment) -> TimeResult<Duration> {
        match self {
            TimeSystem::Utc => {
                let table = LeapSecondTable::current();
                let (day1, sec1) = utc_canonical(&table, m1)?;
                let (day2, sec2) = utc_canonical(&table, m2)?;
                let adjust = (table.cumulative_at(day1)? - table.cumulative_at(day2)?) as f64;
                let days = day1.checked_sub(day2).ok_or_else(|| {
                    TimeError::range_violation(format!("MJD {day1} - {day2} overflows i64"))
                })?;
                Duration::new(days, sec1 - sec2 + adjust)
            }
            _ => {
                let days = m1.day.checked_sub(m2.day).ok_or_else(|| {
                    TimeError::range_violation(format!("MJD {} - {} overflows i64", m1.day, m2.day))
                })?;
                Duration::new(days, m1.sec - m2.sec)
            }
        }
    }

    /// The moment `elapsed` after `moment`, both read in this system.
    ///
    /// Uniform systems add and fold.  UTC re-derives the landing day so
    /// that [`compute_time_difference`](Self::compute_time_difference)
    /// between result and origin reproduces `elapsed` exactly; the result
    /// can carry seconds-of-day past 86 400 when it falls inside an
    /// inserted leap second.
    pub fn compute_advanced_time(self, moment: Moment, elapsed: Duration) -> TimeResult<Moment> {
        match self {
            TimeSystem::Utc => utc_advance(moment, elapsed),
            _ => {
                let day = moment.day.checked_add(elapsed.days()).ok_or_else(|| {
                    TimeError::range_violation(format!(
                        "MJD {} + {} days overflows i64",
                        moment.day,
                        elapsed.days()
                    ))
                })?;
                Moment::new(day, moment.sec + elapsed.secs()).rationalized()
            }
        }
    }
}

impl std::str::FromStr for TimeSystem {
    type Err = TimeError;

    fn from_str(s: &str) -> TimeResult<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for TimeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Conversion edges
// ═══════════════════════════════════════════════════════════════════════════

fn shifted(moment: Moment, offset_sec: f64) -> TimeResult<Moment> {
    let folded = moment.rationalized()?;
    Moment::new(folded.day, folded.sec + offset_sec).rationalized()
}

#[inline]
fn tai_to_tt(moment: Moment) -> TimeResult<Moment> {
    shifted(moment, TT_MINUS_TAI_SEC)
}

#[inline]
fn tt_to_tai(moment: Moment) -> TimeResult<Moment> {
    shifted(moment, -TT_MINUS_TAI_SEC)
}

/// The leap-second lookup keys on the origin's day after folding; the
/// same rule in both directions keeps the pair of conversions symmetric
/// to read, at the cost of bit-exact round-trips within a minute of a
/// boundary.
fn utc_to_tai(moment: Moment) -> TimeResult<Moment> {
    let folded = moment.rationalized()?;
    let offset = LeapSecondTable::current().tai_minus_utc(folded.day)?;
    Moment::new(folded.day, folded.sec + offset).rationalized()
}

fn tai_to_utc(moment: Moment) -> TimeResult<Moment> {
    let folded = moment.rationalized()?;
    let offset = LeapSecondTable::current().tai_minus_utc(folded.day)?;
    Moment::new(folded.day, folded.sec - offset).rationalized()
}

fn tt_to_tdb(moment: Moment) -> TimeResult<Moment> {
    let folded = moment.rationalized()?;
    let (jd_int, jd_frac) = folded.julian_date_parts();
    let delta = active_tdb_correction().tdb_minus_tt(jd_int, jd_frac).value();
    Moment::new(folded.day, folded.sec + delta).rationalized()
}

fn tdb_to_tt(moment: Moment) -> TimeResult<Moment> {
    tdb_to_tt_with(active_tdb_correction().as_ref(), moment)
}

/// Inverts `correction` by fixed-point iteration: guess the TT moment,
/// evaluate the series there, and pull the guess back until the forward
/// mapping reproduces the source within [`TDB_TOLERANCE_SEC`].
fn tdb_to_tt_with(correction: &dyn TdbCorrection, moment: Moment) -> TimeResult<Moment> {
    let src = moment.rationalized()?;
    let mut dest = src;
    let mut residual = f64::MAX;
    for _ in 0..TDB_MAX_ITERATIONS {
        let (jd_int, jd_frac) = dest.julian_date_parts();
        let delta = correction.tdb_minus_tt(jd_int, jd_frac).value();
        residual = dest.sec + delta - src.sec;
        if residual.abs() <= TDB_TOLERANCE_SEC {
            return dest.rationalized();
        }
        dest = Moment::new(src.day, src.sec - delta);
    }
    Err(TimeError::convergence_failure(
        TDB_MAX_ITERATIONS,
        residual.abs(),
    ))
}

// ═══════════════════════════════════════════════════════════════════════════
// UTC elapsed-time laws
// ═══════════════════════════════════════════════════════════════════════════

/// Folds a UTC moment onto the day whose real span contains it, walking
/// true day lengths (86 400 plus insertions) instead of fixed days.
///
/// A moment already inside its day's real span is returned as is, which
/// keeps instants inside an inserted leap second on their own day.
fn utc_canonical(table: &LeapSecondTable, moment: Moment) -> TimeResult<(i64, f64)> {
    if moment.sec >= 0.0 && moment.sec < SECONDS_PER_DAY {
        return Ok((moment.day, moment.sec));
    }
    if !moment.sec.is_finite() {
        return Err(TimeError::range_violation(format!(
            "{} seconds of day is not finite",
            moment.sec
        )));
    }
    let origin_count = table.cumulative_at(moment.day)?;
    // first guess ignores insertions entirely, so it lands within a day
    // or two of the true one
    let guess = (moment.sec / SECONDS_PER_DAY).floor();
    if guess >= i64::MAX as f64 || guess <= i64::MIN as f64 {
        return Err(TimeError::range_violation(format!(
            "{} seconds of day overflows the day count",
            moment.sec
        )));
    }
    let mut day = moment.day.checked_add(guess as i64).ok_or_else(|| {
        TimeError::range_violation(format!("MJD {} + {guess} days overflows i64", moment.day))
    })?;
    loop {
        let count = table.cumulative_at(day)?;
        let span = (day - moment.day) as f64 * SECONDS_PER_DAY + (count - origin_count) as f64;
        let sec = moment.sec - span;
        if sec < 0.0 {
            day -= 1;
        } else if sec >= table.day_length(day)? {
            day += 1;
        } else {
            return Ok((day, sec));
        }
    }
}

fn utc_advance(moment: Moment, elapsed: Duration) -> TimeResult<Moment> {
    let table = LeapSecondTable::current();
    let (origin_day, origin_sec) = utc_canonical(&table, moment)?;
    let origin_count = table.cumulative_at(origin_day)?;

    let base = origin_day.checked_add(elapsed.days()).ok_or_else(|| {
        TimeError::range_violation(format!(
            "MJD {origin_day} + {} days overflows i64",
            elapsed.days()
        ))
    })?;
    let naive = Moment::new(base, origin_sec + elapsed.secs()).rationalized()?;

    // search the days around the fixed-length guess for the one whose
    // leap-aware difference from the origin matches the elapsed time
    for offset in [0i64, 1, -1, 2, -2] {
        let day = naive.day + offset;
        let count = match table.cumulative_at(day) {
            Ok(count) => count,
            Err(_) => continue,
        };
        let length = match table.day_length(day) {
            Ok(length) => length,
            Err(_) => continue,
        };
        let sec = (base - day) as f64 * SECONDS_PER_DAY + origin_sec + elapsed.secs()
            - (count - origin_count) as f64;
        if sec >= 0.0 && sec < length {
            return Ok(Moment::new(day, sec));
        }
    }

    // reachable only when every candidate day precedes the table start
    LeapSecondTable::current().cumulative_at(naive.day)?;
    Err(TimeError::range_violation(format!(
        "advancing UTC MJD {origin_day} by {elapsed} lands on no calendar day"
    )))
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
