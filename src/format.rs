// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Human-readable time formats.
//!
//! Seven formats cover three families:
//!
//! | Format | Shape | Example |
//! |--------|-------|---------|
//! | [`Mjd`] | day + fraction pair | `51910.5 MJD` |
//! | [`Mjd1`] | single float | `51910.5 MJD` |
//! | [`Jd`] | day + fraction pair | `2451910.5 JD` |
//! | [`Jd1`] | single float | `2451910.5 JD` |
//! | [`Calendar`] | ISO-8601 calendar date | `2001-01-01T00:00:00` |
//! | [`IsoWeek`] | ISO-8601 week date | `2001-W01-1T00:00:00` |
//! | [`Ordinal`] | ISO-8601 ordinal date | `2001-001T00:00:00` |
//!
//! Each implements [`TimeRep`], the bidirectional mapping between its
//! fields and the canonical [`Moment`]; [`TimeFormat`] is the name-keyed
//! face of the same seven.  The pair forms keep the day exact next to any
//! fraction; the `1`-suffixed forms trade that for a single `f64`.
//!
//! The three ISO-8601 formats read and write seconds up to `60.999…`, so
//! a moment inside an inserted leap second renders as `23:59:60.x`
//! instead of folding onto the next midnight.  The number-line formats
//! fold such moments, having no way to show them.

use crate::calendar::{self, IsoDate};
use crate::duration::SECONDS_PER_DAY;
use crate::error::{TimeError, TimeResult};
use crate::intfrac::IntFrac;
use crate::moment::Moment;
use std::fmt;

/// Days from MJD 0 back to JD 0, the whole-day part of `2 400 000.5`.
const JD_SHIFT_DAYS: i64 = 2_400_000;

// ═══════════════════════════════════════════════════════════════════════════
// TimeRep
// ═══════════════════════════════════════════════════════════════════════════

/// A bidirectional mapping between one format's fields and a [`Moment`].
///
/// Conversion and formatting validate the carrier's fields on every call;
/// a hand-built representation with a month of 13 fails rather than
/// rendering nonsense.
pub trait TimeRep: Sized {
    /// Reads a canonical moment into this representation.
    fn from_moment(moment: Moment) -> TimeResult<Self>;

    /// The canonical moment of this representation.
    fn to_moment(&self) -> TimeResult<Moment>;

    /// Parses this format's textual form.
    fn parse(input: &str) -> TimeResult<Self>;

    /// Renders the textual form, with `precision` fractional digits or
    /// the shortest faithful form when `None`.
    fn format(&self, precision: Option<usize>) -> TimeResult<String>;
}

// ── Shared helpers ────────────────────────────────────────────────────────

fn check_fraction(frac: f64) -> TimeResult<()> {
    if frac >= 0.0 && frac < 1.0 {
        Ok(())
    } else {
        Err(TimeError::range_violation(format!(
            "day fraction {frac} outside [0, 1)"
        )))
    }
}

/// Signed literal split → (floor day, fraction in `[0, 1)`).
fn pair_from_literal(literal: IntFrac) -> TimeResult<(i64, f64)> {
    if literal.frac() < 0.0 {
        let day = literal.int().checked_sub(1).ok_or_else(|| {
            TimeError::range_violation(format!("day {} - 1 overflows i64", literal.int()))
        })?;
        Ok((day, literal.frac() + 1.0))
    } else {
        Ok((literal.int(), literal.frac()))
    }
}

/// (floor day, fraction) → the signed literal that renders it.
fn literal_from_pair(day: i64, frac: f64) -> TimeResult<IntFrac> {
    check_fraction(frac)?;
    if day < 0 && frac > 0.0 {
        IntFrac::new(day + 1, frac - 1.0)
    } else {
        IntFrac::new(day, frac)
    }
}

/// Strips a trailing unit word (`MJD`, `JD`) and the whitespace before it.
///
/// The unit must stand alone: `"51910.5 MJD"` loses its suffix for the
/// `MJD` unit but keeps it, and fails to parse, for the `JD` unit.
fn strip_unit<'a>(input: &'a str, unit: &str) -> &'a str {
    let trimmed = input.trim();
    if trimmed.len() > unit.len() {
        let cut = trimmed.len() - unit.len();
        // a cut inside a multibyte character cannot precede the ASCII unit
        if trimmed.is_char_boundary(cut) {
            let (head, tail) = trimmed.split_at(cut);
            if tail.eq_ignore_ascii_case(unit) && head.ends_with(|c: char| c.is_whitespace()) {
                return head.trim_end();
            }
        }
    }
    trimmed
}

/// Splits a moment into day + clock fields, keeping a leap-second reading
/// (`sec` in `[86 400, 86 401)`) on its own day as `23:59:60.x`.
fn clock_split(moment: Moment) -> TimeResult<(i64, u32, u32, f64)> {
    let (day, sec) = if moment.sec >= 0.0 && moment.sec < SECONDS_PER_DAY + 1.0 {
        (moment.day, moment.sec)
    } else {
        let folded = moment.rationalized()?;
        (folded.day, folded.sec)
    };
    let hour = ((sec / 3_600.0) as u32).min(23);
    let minute = (((sec - hour as f64 * 3_600.0) / 60.0) as u32).min(59);
    let second = sec - (hour * 3_600 + minute * 60) as f64;
    Ok((day, hour, minute, second))
}

/// Clock fields → seconds of day, accepting the leap-second digit.
fn clock_seconds(hour: u32, minute: u32, second: f64) -> TimeResult<f64> {
    if hour > 23 {
        return Err(TimeError::range_violation(format!(
            "hour {hour} outside 0..=23"
        )));
    }
    if minute > 59 {
        return Err(TimeError::range_violation(format!(
            "minute {minute} outside 0..=59"
        )));
    }
    if !(second >= 0.0 && second < 61.0) {
        return Err(TimeError::range_violation(format!(
            "second {second} outside [0, 61)"
        )));
    }
    Ok((hour * 3_600 + minute * 60) as f64 + second)
}

/// Renders `HH:MM:SS[.s…]`.
///
/// Fixed precision truncates the seconds instead of rounding: a round-up
/// would either fabricate a `:60` or demand a carry through the whole
/// date.
fn format_clock(hour: u32, minute: u32, second: f64, precision: Option<usize>) -> String {
    let seconds_text = match precision {
        None => {
            let whole = second as u32;
            let frac = second - whole as f64;
            if frac == 0.0 {
                format!("{whole:02}")
            } else {
                let tail = format!("{frac}");
                let digits = tail.strip_prefix('0').unwrap_or(&tail);
                format!("{whole:02}{digits}")
            }
        }
        Some(0) => format!("{:02}", second.trunc() as u32),
        Some(p) => {
            let scale = 10f64.powi(p as i32);
            let truncated = (second * scale).trunc() / scale;
            format!("{truncated:0width$.p$}", width = p + 3)
        }
    };
    format!("{hour:02}:{minute:02}:{seconds_text}")
}

// ═══════════════════════════════════════════════════════════════════════════
// Number-line formats
// ═══════════════════════════════════════════════════════════════════════════

/// Modified Julian Date as an exact day + fraction pair.
///
/// # Examples
///
/// ```
/// use astrochron::{Mjd, Moment, TimeRep};
///
/// let mjd = Mjd::from_moment(Moment::new(51_910, 0.0)).unwrap();
/// assert_eq!(mjd.format(None).unwrap(), "51910 MJD");
///
/// let parsed = Mjd::parse("51910.5 MJD").unwrap();
/// assert_eq!(parsed.to_moment().unwrap(), Moment::new(51_910, 43_200.0));
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mjd {
    pub day: i64,
    pub frac: f64,
}

impl TimeRep for Mjd {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let folded = moment.rationalized()?;
        Ok(Self {
            day: folded.day,
            frac: folded.sec / SECONDS_PER_DAY,
        })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        check_fraction(self.frac)?;
        Ok(Moment::new(self.day, self.frac * SECONDS_PER_DAY))
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let literal = IntFrac::parse(strip_unit(input, "MJD"))?;
        let (day, frac) = pair_from_literal(literal)?;
        Ok(Self { day, frac })
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        let literal = literal_from_pair(self.day, self.frac)?;
        Ok(format!("{} MJD", literal.format_value(precision)))
    }
}

/// Modified Julian Date collapsed into one `f64`.
///
/// Cheaper to carry than [`Mjd`] but the fraction shares the mantissa
/// with the day count, so sub-millisecond detail fades in the current
/// epoch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mjd1 {
    pub value: f64,
}

impl TimeRep for Mjd1 {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let folded = moment.rationalized()?;
        Ok(Self {
            value: folded.day as f64 + folded.sec / SECONDS_PER_DAY,
        })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        split_float_day(self.value)
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let literal = IntFrac::parse(strip_unit(input, "MJD"))?;
        Ok(Self {
            value: literal.value(),
        })
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        let literal = IntFrac::from_f64(self.value)?;
        Ok(format!("{} MJD", literal.format_value(precision)))
    }
}

/// Julian Date as an exact day + fraction pair, `JD = MJD + 2 400 000.5`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Jd {
    pub day: i64,
    pub frac: f64,
}

impl TimeRep for Jd {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let folded = moment.rationalized()?;
        let mut day = folded.day.checked_add(JD_SHIFT_DAYS).ok_or_else(|| {
            TimeError::range_violation(format!("MJD {} overflows the JD range", folded.day))
        })?;
        // JD days begin at noon, half a day before the MJD midnight
        let mut frac = folded.sec / SECONDS_PER_DAY + 0.5;
        if frac >= 1.0 {
            day = day.checked_add(1).ok_or_else(|| {
                TimeError::range_violation(format!("MJD {} overflows the JD range", folded.day))
            })?;
            frac -= 1.0;
        }
        Ok(Self { day, frac })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        check_fraction(self.frac)?;
        let mut day = self.day.checked_sub(JD_SHIFT_DAYS).ok_or_else(|| {
            TimeError::range_violation(format!("JD {} overflows the MJD range", self.day))
        })?;
        let mut sec = (self.frac - 0.5) * SECONDS_PER_DAY;
        if sec < 0.0 {
            day = day.checked_sub(1).ok_or_else(|| {
                TimeError::range_violation(format!("JD {} overflows the MJD range", self.day))
            })?;
            sec += SECONDS_PER_DAY;
        }
        Ok(Moment::new(day, sec))
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let literal = IntFrac::parse(strip_unit(input, "JD"))?;
        let (day, frac) = pair_from_literal(literal)?;
        Ok(Self { day, frac })
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        let literal = literal_from_pair(self.day, self.frac)?;
        Ok(format!("{} JD", literal.format_value(precision)))
    }
}

/// Julian Date collapsed into one `f64`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Jd1 {
    pub value: f64,
}

impl TimeRep for Jd1 {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let pair = Jd::from_moment(moment)?;
        Ok(Self {
            value: pair.day as f64 + pair.frac,
        })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        if !self.value.is_finite() {
            return Err(TimeError::range_violation(format!(
                "JD {} is not a finite day number",
                self.value
            )));
        }
        split_float_day(self.value - 2_400_000.5)
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let literal = IntFrac::parse(strip_unit(input, "JD"))?;
        Ok(Self {
            value: literal.value(),
        })
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        let literal = IntFrac::from_f64(self.value)?;
        Ok(format!("{} JD", literal.format_value(precision)))
    }
}

/// Floor-splits a float day count into a folded moment.
fn split_float_day(value: f64) -> TimeResult<Moment> {
    if !value.is_finite() {
        return Err(TimeError::range_violation(format!(
            "{value} is not a finite day number"
        )));
    }
    let day = value.floor();
    if day >= i64::MAX as f64 || day < i64::MIN as f64 {
        return Err(TimeError::range_violation(format!(
            "day number {value} overflows i64"
        )));
    }
    Ok(Moment::new(day as i64, (value - day) * SECONDS_PER_DAY))
}

// ═══════════════════════════════════════════════════════════════════════════
// Calendar formats
// ═══════════════════════════════════════════════════════════════════════════

/// ISO-8601 calendar date and clock, `YYYY-MM-DDTHH:MM:SS[.s…]`.
///
/// # Examples
///
/// ```
/// use astrochron::{Calendar, Moment, TimeRep};
///
/// let date = Calendar::parse("2001-01-01T00:00:00").unwrap();
/// assert_eq!(date.to_moment().unwrap(), Moment::new(51_910, 0.0));
///
/// let leap = Calendar::from_moment(Moment::new(51_178, 86_400.5)).unwrap();
/// assert_eq!(leap.format(None).unwrap(), "1998-12-31T23:59:60.5");
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Calendar {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl TimeRep for Calendar {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let (mjd, hour, minute, second) = clock_split(moment)?;
        let (year, day_of_year) = calendar::find_year(mjd)?;
        let (month, day) = calendar::month_day_from_ordinal(year, day_of_year)?;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        let day_of_year = calendar::ordinal_from_month_day(self.year, self.month, self.day)?;
        let mjd = calendar::year_start_mjd(self.year)?
            .checked_add(day_of_year as i64 - 1)
            .ok_or_else(|| {
                TimeError::range_violation(format!("year {} overflows the MJD range", self.year))
            })?;
        let sec = clock_seconds(self.hour, self.minute, self.second)?;
        Ok(Moment::new(mjd, sec))
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let (date, time) = calendar::lex_iso8601(input)?;
        let IsoDate::Calendar { year, month, day } = date else {
            return Err(TimeError::parse_failure(input, "expected a calendar date"));
        };
        let rep = Self {
            year,
            month,
            day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        };
        rep.to_moment()?;
        Ok(rep)
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        self.to_moment()?;
        Ok(format!(
            "{:04}-{:02}-{:02}T{}",
            self.year,
            self.month,
            self.day,
            format_clock(self.hour, self.minute, self.second, precision)
        ))
    }
}

/// ISO-8601 week date and clock, `YYYY-Www-DTHH:MM:SS[.s…]`.
///
/// The year field is the ISO year, which differs from the calendar year
/// for up to three days around January 1st.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IsoWeek {
    pub year: i64,
    pub week: u32,
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl TimeRep for IsoWeek {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let (mjd, hour, minute, second) = clock_split(moment)?;
        let (year, week, weekday) = calendar::iso_week_from_mjd(mjd)?;
        Ok(Self {
            year,
            week,
            weekday,
            hour,
            minute,
            second,
        })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        let mjd = calendar::mjd_from_iso_week(self.year, self.week, self.weekday)?;
        let sec = clock_seconds(self.hour, self.minute, self.second)?;
        Ok(Moment::new(mjd, sec))
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let (date, time) = calendar::lex_iso8601(input)?;
        let IsoDate::Week {
            year,
            week,
            weekday,
        } = date
        else {
            return Err(TimeError::parse_failure(input, "expected a week date"));
        };
        let rep = Self {
            year,
            week,
            weekday,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        };
        rep.to_moment()?;
        Ok(rep)
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        self.to_moment()?;
        Ok(format!(
            "{:04}-W{:02}-{}T{}",
            self.year,
            self.week,
            self.weekday,
            format_clock(self.hour, self.minute, self.second, precision)
        ))
    }
}

/// ISO-8601 ordinal date and clock, `YYYY-DDDTHH:MM:SS[.s…]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ordinal {
    pub year: i64,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl TimeRep for Ordinal {
    fn from_moment(moment: Moment) -> TimeResult<Self> {
        let (mjd, hour, minute, second) = clock_split(moment)?;
        let (year, day) = calendar::find_year(mjd)?;
        Ok(Self {
            year,
            day,
            hour,
            minute,
            second,
        })
    }

    fn to_moment(&self) -> TimeResult<Moment> {
        let start = calendar::year_start_mjd(self.year)?;
        let length = calendar::year_length(self.year);
        if self.day == 0 || self.day as i64 > length {
            return Err(TimeError::range_violation(format!(
                "day-of-year {} outside 1..={length} for year {}",
                self.day, self.year
            )));
        }
        let mjd = start.checked_add(self.day as i64 - 1).ok_or_else(|| {
            TimeError::range_violation(format!("year {} overflows the MJD range", self.year))
        })?;
        let sec = clock_seconds(self.hour, self.minute, self.second)?;
        Ok(Moment::new(mjd, sec))
    }

    fn parse(input: &str) -> TimeResult<Self> {
        let (date, time) = calendar::lex_iso8601(input)?;
        let IsoDate::Ordinal { year, day } = date else {
            return Err(TimeError::parse_failure(input, "expected an ordinal date"));
        };
        let rep = Self {
            year,
            day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        };
        rep.to_moment()?;
        Ok(rep)
    }

    fn format(&self, precision: Option<usize>) -> TimeResult<String> {
        self.to_moment()?;
        Ok(format!(
            "{:04}-{:03}T{}",
            self.year,
            self.day,
            format_clock(self.hour, self.minute, self.second, precision)
        ))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TimeFormat
// ═══════════════════════════════════════════════════════════════════════════

/// The seven formats behind one name-keyed face.
///
/// # Examples
///
/// ```
/// use astrochron::{Moment, TimeFormat};
///
/// let format = TimeFormat::from_name("jd").unwrap();
/// let text = format.format_moment(Moment::new(51_910, 0.0), None).unwrap();
/// assert_eq!(text, "2451910.5 JD");
///
/// let moment = TimeFormat::Ordinal.parse_moment("1998-005T12:00:00").unwrap();
/// assert_eq!(moment, Moment::new(50_818, 43_200.0));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    Mjd,
    Mjd1,
    Jd,
    Jd1,
    Calendar,
    IsoWeek,
    Ordinal,
}

impl TimeFormat {
    /// Every format, in declaration order.
    pub const ALL: [TimeFormat; 7] = [
        TimeFormat::Mjd,
        TimeFormat::Mjd1,
        TimeFormat::Jd,
        TimeFormat::Jd1,
        TimeFormat::Calendar,
        TimeFormat::IsoWeek,
        TimeFormat::Ordinal,
    ];

    /// The format's canonical name.
    pub const fn name(&self) -> &'static str {
        match self {
            TimeFormat::Mjd => "MJD",
            TimeFormat::Mjd1 => "MJD1",
            TimeFormat::Jd => "JD",
            TimeFormat::Jd1 => "JD1",
            TimeFormat::Calendar => "Calendar",
            TimeFormat::IsoWeek => "IsoWeek",
            TimeFormat::Ordinal => "Ordinal",
        }
    }

    /// Case-insensitive lookup by format name.
    pub fn from_name(name: &str) -> TimeResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| TimeError::not_found("time format", name))
    }

    /// Parses `input` in this format, straight to the canonical moment.
    pub fn parse_moment(&self, input: &str) -> TimeResult<Moment> {
        match self {
            TimeFormat::Mjd => Mjd::parse(input)?.to_moment(),
            TimeFormat::Mjd1 => Mjd1::parse(input)?.to_moment(),
            TimeFormat::Jd => Jd::parse(input)?.to_moment(),
            TimeFormat::Jd1 => Jd1::parse(input)?.to_moment(),
            TimeFormat::Calendar => Calendar::parse(input)?.to_moment(),
            TimeFormat::IsoWeek => IsoWeek::parse(input)?.to_moment(),
            TimeFormat::Ordinal => Ordinal::parse(input)?.to_moment(),
        }
    }

    /// Renders `moment` in this format.
    pub fn format_moment(&self, moment: Moment, precision: Option<usize>) -> TimeResult<String> {
        match self {
            TimeFormat::Mjd => Mjd::from_moment(moment)?.format(precision),
            TimeFormat::Mjd1 => Mjd1::from_moment(moment)?.format(precision),
            TimeFormat::Jd => Jd::from_moment(moment)?.format(precision),
            TimeFormat::Jd1 => Jd1::from_moment(moment)?.format(precision),
            TimeFormat::Calendar => Calendar::from_moment(moment)?.format(precision),
            TimeFormat::IsoWeek => IsoWeek::from_moment(moment)?.format(precision),
            TimeFormat::Ordinal => Ordinal::from_moment(moment)?.format(precision),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
