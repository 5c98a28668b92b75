// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Astronomical time representation and conversion.
//!
//! This crate keeps instants as an exact pair of a whole Modified Julian
//! Day and seconds of that day, converts them between the TAI, TT, TDB
//! and UTC time systems, and reads and writes the usual astronomical
//! encodings (MJD, JD, ISO-8601 calendar, week and ordinal dates).
//!
//! # Core types
//!
//! - [`Duration`] — fixed-point time length, whole days + seconds in `[0, 86 400)`.
//! - [`Moment`] — canonical instant, `(integer MJD, seconds of day)`.
//! - [`TimeSystem`] — the four supported systems and their conversion laws.
//! - [`AbsoluteTime`] / [`ElapsedTime`] / [`TimeInterval`] — instants,
//!   system-tagged lengths and anchored spans.
//! - [`LeapSecondTable`] — UTC's leap-second history, reloadable at run time.
//! - [`TimeFormat`] — name-keyed access to the format family below.
//! - [`IntFrac`] — exact integer + fraction split backing the day counts.
//!
//! # Time systems
//!
//! | Variant | System | Relation |
//! |---------|--------|----------|
//! | [`TimeSystem::Tai`] | International Atomic Time | reference clock |
//! | [`TimeSystem::Tt`]  | Terrestrial Time | `TT = TAI + 32.184 s` |
//! | [`TimeSystem::Tdb`] | Barycentric Dynamical Time | `TT` + periodic relativistic terms |
//! | [`TimeSystem::Utc`] | Coordinated Universal Time | `TAI − (10 s + leap seconds)` |
//!
//! Cross conversions route through TT; the TDB leg evaluates a
//! [`TdbCorrection`] (Fairhead & Bretagnon 1990 by default, replaceable
//! through [`select_tdb_correction`]).
//!
//! # Time formats
//!
//! Implementations of [`TimeRep`]: [`Mjd`], [`Mjd1`], [`Jd`], [`Jd1`],
//! [`Calendar`], [`IsoWeek`] and [`Ordinal`].  The three ISO-8601 forms
//! render a moment inside an inserted leap second as `23:59:60.x`.

mod calendar;
mod duration;
mod error;
mod format;
mod instant;
mod interval;
mod intfrac;
mod leapsec;
mod moment;
mod system;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use duration::{Duration, TimeUnit, SECONDS_PER_DAY};
pub use error::{TimeError, TimeResult};
pub use format::{Calendar, IsoWeek, Jd, Jd1, Mjd, Mjd1, Ordinal, TimeFormat, TimeRep};
pub use instant::{AbsoluteTime, ElapsedTime};
pub use interval::TimeInterval;
pub use intfrac::IntFrac;
pub use leapsec::{LeapSecondTable, TAI_MINUS_UTC_BASE_SEC};
pub use moment::Moment;
pub use system::{
    active_tdb_correction, select_tdb_correction, FairheadBretagnon1990, TdbCorrection,
    TimeSystem, TDB_MAX_ITERATIONS, TDB_TOLERANCE_SEC, TT_MINUS_TAI_SEC,
};
