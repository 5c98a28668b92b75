// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Leap-second bookkeeping.
//!
//! A [`LeapSecondTable`] maps Modified Julian Day numbers (UTC) to the
//! cumulative count of leap seconds inserted since the start of the
//! leap-second era on 1972-01-01.  The TAI-UTC offset on a given day is
//! `10 s + cumulative(mjd)`: ten seconds were already on the books when
//! the era began, and every row adds one more.
//!
//! Lookups floor to the last entry at or before the requested day.  Days
//! before the first entry have no defined offset and report
//! [`TimeError::NotFound`]; pre-1972 UTC is not a uniform scheme and this
//! crate does not guess at it.
//!
//! # Process-wide table
//!
//! Conversions read the table through [`LeapSecondTable::current`], an
//! [`Arc`] snapshot of a process-wide slot initialised lazily with the
//! built-in IERS data.  [`LeapSecondTable::install`] swaps the slot and
//! stamps a fresh version number, so a conversion that started on the old
//! table finishes on it; readers never block each other.

use crate::duration::SECONDS_PER_DAY;
use crate::error::{TimeError, TimeResult};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// TAI-UTC in seconds on 1972-01-01, before any tabulated insertion.
pub const TAI_MINUS_UTC_BASE_SEC: f64 = 10.0;

/// IERS leap-second insertions, 1972-01-01 through 2017-01-01, as
/// `(MJD of the day the new offset takes effect, cumulative insertions)`.
const BUILTIN: [(i64, i64); 28] = [
    (41_317, 0),  // 1972-01-01
    (41_499, 1),  // 1972-07-01
    (41_683, 2),  // 1973-01-01
    (42_048, 3),  // 1974-01-01
    (42_413, 4),  // 1975-01-01
    (42_778, 5),  // 1976-01-01
    (43_144, 6),  // 1977-01-01
    (43_509, 7),  // 1978-01-01
    (43_874, 8),  // 1979-01-01
    (44_239, 9),  // 1980-01-01
    (44_786, 10), // 1981-07-01
    (45_151, 11), // 1982-07-01
    (45_516, 12), // 1983-07-01
    (46_247, 13), // 1985-07-01
    (47_161, 14), // 1988-01-01
    (47_892, 15), // 1990-01-01
    (48_257, 16), // 1991-01-01
    (48_804, 17), // 1992-07-01
    (49_169, 18), // 1993-07-01
    (49_534, 19), // 1994-07-01
    (50_083, 20), // 1996-01-01
    (50_630, 21), // 1997-07-01
    (51_179, 22), // 1999-01-01
    (53_736, 23), // 2006-01-01
    (54_832, 24), // 2009-01-01
    (56_109, 25), // 2012-07-01
    (57_204, 26), // 2015-07-01
    (57_754, 27), // 2017-01-01
];

static TABLE: Lazy<RwLock<Arc<LeapSecondTable>>> =
    Lazy::new(|| RwLock::new(Arc::new(LeapSecondTable::builtin())));
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);
static EXPLICITLY_LOADED: AtomicBool = AtomicBool::new(false);

/// Cumulative leap-second insertions keyed by UTC day.
///
/// Entries are strictly increasing in day and non-decreasing in count.
///
/// # Examples
///
/// ```
/// use astrochron::LeapSecondTable;
///
/// let table = LeapSecondTable::builtin();
/// // 1999-01-01: the 22nd insertion took effect
/// assert_eq!(table.cumulative_at(51_179).unwrap(), 22);
/// // the day before still carries 21
/// assert_eq!(table.cumulative_at(51_178).unwrap(), 21);
/// assert_eq!(table.tai_minus_utc(51_179).unwrap(), 32.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeapSecondTable {
    entries: Vec<(i64, i64)>,
    version: u64,
}

impl LeapSecondTable {
    /// The compiled-in IERS table, 1972-01-01 through 2017-01-01.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN.to_vec(),
            version: 0,
        }
    }

    /// Builds a table from `(mjd, cumulative insertions)` rows.
    ///
    /// Rows must be non-empty, strictly increasing in day and
    /// non-decreasing in count; anything else is a
    /// [`TimeError::RangeViolation`].
    pub fn from_entries(entries: &[(i64, i64)]) -> TimeResult<Self> {
        if entries.is_empty() {
            return Err(TimeError::range_violation("empty leap-second table"));
        }
        for pair in entries.windows(2) {
            let (day_a, count_a) = pair[0];
            let (day_b, count_b) = pair[1];
            if day_b <= day_a {
                return Err(TimeError::range_violation(format!(
                    "leap-second entries out of order: MJD {day_b} follows MJD {day_a}"
                )));
            }
            if count_b < count_a {
                return Err(TimeError::range_violation(format!(
                    "leap-second count decreases at MJD {day_b}: {count_b} after {count_a}"
                )));
            }
        }
        Ok(Self {
            entries: entries.to_vec(),
            version: 0,
        })
    }

    /// Builds a table from floating-point rows, as read from an external
    /// source.
    ///
    /// Both columns must hold exact integers; a fractional day or count is
    /// a [`TimeError::ParseFailure`].
    pub fn from_raw_entries(raw: &[(f64, f64)]) -> TimeResult<Self> {
        let mut entries = Vec::with_capacity(raw.len());
        for &(day, count) in raw {
            if !day.is_finite() || day.fract() != 0.0 || day.abs() >= i64::MAX as f64 {
                return Err(TimeError::parse_failure(
                    format!("({day}, {count})"),
                    "non-integral MJD in leap-second row",
                ));
            }
            if !count.is_finite() || count.fract() != 0.0 || count.abs() >= i64::MAX as f64 {
                return Err(TimeError::parse_failure(
                    format!("({day}, {count})"),
                    "non-integral count in leap-second row",
                ));
            }
            entries.push((day as i64, count as i64));
        }
        Self::from_entries(&entries)
    }

    /// Cumulative insertions in effect on `mjd` (floor lookup).
    ///
    /// Fails with [`TimeError::NotFound`] for days before the first entry.
    pub fn cumulative_at(&self, mjd: i64) -> TimeResult<i64> {
        let idx = self.entries.partition_point(|&(day, _)| day <= mjd);
        if idx == 0 {
            return Err(TimeError::not_found(
                "leap-second entry",
                format!("MJD {mjd} precedes the table start MJD {}", self.first_mjd()),
            ));
        }
        Ok(self.entries[idx - 1].1)
    }

    /// TAI-UTC in seconds on `mjd`.
    #[inline]
    pub fn tai_minus_utc(&self, mjd: i64) -> TimeResult<f64> {
        Ok(TAI_MINUS_UTC_BASE_SEC + self.cumulative_at(mjd)? as f64)
    }

    /// Length of the UTC day `mjd` in SI seconds: 86 400 plus whatever is
    /// inserted at its end.
    pub fn day_length(&self, mjd: i64) -> TimeResult<f64> {
        let at_start = self.cumulative_at(mjd)?;
        let at_next = self.cumulative_at(mjd + 1)?;
        Ok(SECONDS_PER_DAY + (at_next - at_start) as f64)
    }

    /// First day the table covers.
    #[inline]
    pub fn first_mjd(&self) -> i64 {
        self.entries[0].0
    }

    /// Day the last entry takes effect.
    #[inline]
    pub fn last_mjd(&self) -> i64 {
        self.entries[self.entries.len() - 1].0
    }

    /// The raw rows.
    #[inline]
    pub fn entries(&self) -> &[(i64, i64)] {
        &self.entries
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no rows; every constructor rejects that.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version stamped when this table was installed; the built-in table
    /// is version 0.
    #[inline]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ── Process-wide slot ─────────────────────────────────────────────────

    /// Snapshot of the process-wide table.
    pub fn current() -> Arc<LeapSecondTable> {
        TABLE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `table` process-wide and returns its freshly stamped
    /// version.  Conversions already holding a snapshot finish on the old
    /// table.
    pub fn install(mut table: LeapSecondTable) -> u64 {
        let version = NEXT_VERSION.fetch_add(1, Ordering::Relaxed);
        table.version = version;
        let mut slot = TABLE.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(table);
        version
    }

    /// Loads `raw` rows process-wide.
    ///
    /// Once a table has been loaded this way, further calls are a no-op
    /// returning the current version unless `force_reload` is set.  The
    /// lazily created built-in table does not count as loaded.
    pub fn load_entries(raw: &[(f64, f64)], force_reload: bool) -> TimeResult<u64> {
        if EXPLICITLY_LOADED.load(Ordering::Acquire) && !force_reload {
            return Ok(Self::current().version());
        }
        let table = Self::from_raw_entries(raw)?;
        let version = Self::install(table);
        EXPLICITLY_LOADED.store(true, Ordering::Release);
        Ok(version)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
