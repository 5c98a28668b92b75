// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Proleptic Gregorian calendar arithmetic over integer MJDs.
//!
//! Everything here works in whole days; the format layer attaches the
//! clock fields.  Year resolution decomposes the day offset from
//! 0001-01-01 into nested 400-, 100-, 4- and 1-year cycles instead of
//! walking years, so dates centuries apart cost the same as neighbours.
//!
//! Years before 1 are out of range throughout.

use crate::error::{TimeError, TimeResult};

/// MJD of 0001-01-01 in the proleptic Gregorian calendar.
pub(crate) const MJD_YEAR_ONE: i64 = -678_575;

const DAYS_PER_400Y: i64 = 146_097;
const DAYS_PER_100Y: i64 = 36_524;
const DAYS_PER_4Y: i64 = 1_461;

const DAYS_IN_MONTH: [[u32; 12]; 2] = [
    [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
    [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
];

// ── Year arithmetic ───────────────────────────────────────────────────────

pub(crate) const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) const fn year_length(year: i64) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// MJD of January 1st of `year`.
pub(crate) fn year_start_mjd(year: i64) -> TimeResult<i64> {
    if year < 1 {
        return Err(TimeError::range_violation(format!(
            "year {year} precedes year 1"
        )));
    }
    let prior = year - 1;
    let days = prior
        .checked_mul(365)
        .and_then(|d| d.checked_add(prior / 4))
        .and_then(|d| d.checked_sub(prior / 100))
        .and_then(|d| d.checked_add(prior / 400))
        .and_then(|d| d.checked_add(MJD_YEAR_ONE))
        .ok_or_else(|| TimeError::range_violation(format!("year {year} overflows the MJD range")))?;
    Ok(days)
}

/// The year containing `mjd`, and the 1-based day of that year.
///
/// The offset from year 1 is peeled cycle by cycle.  The two `min(3)`
/// clamps pin December 31st of a 400th or 4th year, which otherwise
/// divides into the following cycle.
pub(crate) fn find_year(mjd: i64) -> TimeResult<(i64, u32)> {
    let elapsed = mjd.checked_sub(MJD_YEAR_ONE).ok_or_else(|| {
        TimeError::range_violation(format!("MJD {mjd} overflows the calendar range"))
    })?;
    if elapsed < 0 {
        return Err(TimeError::range_violation(format!(
            "MJD {mjd} precedes 0001-01-01"
        )));
    }

    let n400 = elapsed / DAYS_PER_400Y;
    let mut rem = elapsed % DAYS_PER_400Y;
    let n100 = (rem / DAYS_PER_100Y).min(3);
    rem -= n100 * DAYS_PER_100Y;
    let n4 = rem / DAYS_PER_4Y;
    rem -= n4 * DAYS_PER_4Y;
    let n1 = (rem / 365).min(3);
    rem -= n1 * 365;

    let year = n400 * 400 + n100 * 100 + n4 * 4 + n1 + 1;
    Ok((year, rem as u32 + 1))
}

// ── Month arithmetic ──────────────────────────────────────────────────────

pub(crate) fn days_in_month(year: i64, month: u32) -> TimeResult<u32> {
    if !(1..=12).contains(&month) {
        return Err(TimeError::range_violation(format!(
            "month {month} outside 1..=12"
        )));
    }
    Ok(DAYS_IN_MONTH[is_leap_year(year) as usize][month as usize - 1])
}

/// Splits a 1-based day of year into (month, day of month).
pub(crate) fn month_day_from_ordinal(year: i64, day_of_year: u32) -> TimeResult<(u32, u32)> {
    let length = year_length(year);
    if day_of_year == 0 || day_of_year as i64 > length {
        return Err(TimeError::range_violation(format!(
            "day-of-year {day_of_year} outside 1..={length} for year {year}"
        )));
    }
    let mut remaining = day_of_year;
    for (index, &len) in DAYS_IN_MONTH[is_leap_year(year) as usize].iter().enumerate() {
        if remaining <= len {
            return Ok((index as u32 + 1, remaining));
        }
        remaining -= len;
    }
    Err(TimeError::range_violation(format!(
        "day-of-year {day_of_year} outside year {year}"
    )))
}

/// The 1-based day of year of a (month, day) pair.
pub(crate) fn ordinal_from_month_day(year: i64, month: u32, day: u32) -> TimeResult<u32> {
    let month_length = days_in_month(year, month)?;
    if day == 0 || day > month_length {
        return Err(TimeError::range_violation(format!(
            "day {day} outside 1..={month_length} for {year}-{month:02}"
        )));
    }
    let head: u32 = DAYS_IN_MONTH[is_leap_year(year) as usize][..month as usize - 1]
        .iter()
        .sum();
    Ok(head + day)
}

// ── ISO week arithmetic ───────────────────────────────────────────────────

/// Weekday of `mjd`, Monday = 1 through Sunday = 7.
pub(crate) const fn weekday(mjd: i64) -> u32 {
    (mjd + 2).rem_euclid(7) as u32 + 1
}

/// MJD of the Monday opening week 1 of `iso_year`: the Monday nearest to
/// January 1st, which can fall in the previous calendar year.
pub(crate) fn iso_week_year_start(iso_year: i64) -> TimeResult<i64> {
    let jan_first = year_start_mjd(iso_year)?;
    let wd = weekday(jan_first) as i64;
    if wd <= 4 {
        Ok(jan_first - (wd - 1))
    } else {
        Ok(jan_first + (8 - wd))
    }
}

pub(crate) fn weeks_in_iso_year(iso_year: i64) -> TimeResult<u32> {
    let this = iso_week_year_start(iso_year)?;
    let next = iso_year
        .checked_add(1)
        .ok_or_else(|| TimeError::range_violation(format!("year {iso_year} + 1 overflows i64")))
        .and_then(iso_week_year_start)?;
    Ok(((next - this) / 7) as u32)
}

/// The (ISO year, week, weekday) triple containing `mjd`.
///
/// The ISO year differs from the calendar year for up to three days at
/// each end of the year.
pub(crate) fn iso_week_from_mjd(mjd: i64) -> TimeResult<(i64, u32, u32)> {
    let (calendar_year, _) = find_year(mjd)?;
    let mut iso_year = calendar_year;
    let mut anchor = iso_week_year_start(iso_year)?;
    if mjd < anchor {
        iso_year -= 1;
        anchor = iso_week_year_start(iso_year)?;
    } else {
        let next = iso_week_year_start(iso_year + 1)?;
        if mjd >= next {
            iso_year += 1;
            anchor = next;
        }
    }
    let offset = mjd - anchor;
    Ok((iso_year, (offset / 7) as u32 + 1, (offset % 7) as u32 + 1))
}

/// MJD of an (ISO year, week, weekday) triple.
pub(crate) fn mjd_from_iso_week(iso_year: i64, week: u32, weekday: u32) -> TimeResult<i64> {
    if !(1..=7).contains(&weekday) {
        return Err(TimeError::range_violation(format!(
            "weekday {weekday} outside 1..=7"
        )));
    }
    let weeks = weeks_in_iso_year(iso_year)?;
    if week == 0 || week > weeks {
        return Err(TimeError::range_violation(format!(
            "week {week} outside 1..={weeks} for ISO year {iso_year}"
        )));
    }
    let anchor = iso_week_year_start(iso_year)?;
    anchor
        .checked_add((week as i64 - 1) * 7 + weekday as i64 - 1)
        .ok_or_else(|| {
            TimeError::range_violation(format!("ISO year {iso_year} overflows the MJD range"))
        })
}

// ═══════════════════════════════════════════════════════════════════════════
// ISO-8601 lexer
// ═══════════════════════════════════════════════════════════════════════════

/// Date half of a lexed ISO-8601 string, before bounds are applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum IsoDate {
    Calendar { year: i64, month: u32, day: u32 },
    Week { year: i64, week: u32, weekday: u32 },
    Ordinal { year: i64, day: u32 },
}

/// Time half of a lexed ISO-8601 string.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct IsoTime {
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

/// Splits an ISO-8601 extended date-time string into its fields.
///
/// Only the full extended layout is accepted: a 4-digit year, a date that
/// is calendar (`-MM-DD`), week (`-Www-D`) or ordinal (`-DDD`) shaped,
/// one `T`, and a complete `HH:MM:SS[.s…]` clock.  Partial forms and the
/// basic (hyphenless) format are [`TimeError::ParseFailure`]s.  Field
/// values outside their clock bounds are [`TimeError::RangeViolation`]s;
/// seconds run to `60.999…` so an inserted leap second stays readable.
pub(crate) fn lex_iso8601(input: &str) -> TimeResult<(IsoDate, IsoTime)> {
    let (date_part, time_part) = input
        .split_once('T')
        .ok_or_else(|| TimeError::parse_failure(input, "expected a 'T' between date and time"))?;
    if time_part.contains('T') {
        return Err(TimeError::parse_failure(input, "more than one 'T'"));
    }

    let fields: Vec<&str> = date_part.split('-').collect();
    let date = match fields.as_slice() {
        [year, week, day] if week.starts_with('W') => IsoDate::Week {
            year: digit_field(input, year, 4)? as i64,
            week: digit_field(input, &week[1..], 2)?,
            weekday: digit_field(input, day, 1)?,
        },
        [year, month, day] => IsoDate::Calendar {
            year: digit_field(input, year, 4)? as i64,
            month: digit_field(input, month, 2)?,
            day: digit_field(input, day, 2)?,
        },
        [year, day] => IsoDate::Ordinal {
            year: digit_field(input, year, 4)? as i64,
            day: digit_field(input, day, 3)?,
        },
        _ => {
            return Err(TimeError::parse_failure(
                input,
                "date is not calendar, week or ordinal shaped",
            ))
        }
    };

    let clock: Vec<&str> = time_part.split(':').collect();
    let [hours, minutes, seconds] = clock.as_slice() else {
        return Err(TimeError::parse_failure(input, "time is not HH:MM:SS shaped"));
    };
    let hour = digit_field(input, hours, 2)?;
    let minute = digit_field(input, minutes, 2)?;
    let second = seconds_field(input, seconds)?;

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

    Ok((
        date,
        IsoTime {
            hour,
            minute,
            second,
        },
    ))
}

/// An exact-width run of ASCII digits.
fn digit_field(input: &str, field: &str, width: usize) -> TimeResult<u32> {
    if field.len() != width || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::parse_failure(
            input,
            format!("expected {width} digits, found \"{field}\""),
        ));
    }
    field
        .parse()
        .map_err(|_| TimeError::parse_failure(input, format!("unreadable field \"{field}\"")))
}

/// `SS` or `SS.digits`, allowing the leap-second reading `60.x`.
fn seconds_field(input: &str, field: &str) -> TimeResult<f64> {
    let (whole, fraction) = match field.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (field, None),
    };
    let mut second = digit_field(input, whole, 2)? as f64;
    if let Some(digits) = fraction {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::parse_failure(
                input,
                format!("expected fractional-second digits, found \"{field}\""),
            ));
        }
        let tail: f64 = format!("0.{digits}")
            .parse()
            .map_err(|_| TimeError::parse_failure(input, "unreadable fractional seconds"))?;
        second += tail;
    }
    if second >= 61.0 {
        return Err(TimeError::range_violation(format!(
            "second {second} outside [0, 61)"
        )));
    }
    Ok(second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_one_starts_at_the_fixed_anchor() {
        assert_eq!(year_start_mjd(1).unwrap(), MJD_YEAR_ONE);
        assert_eq!(find_year(MJD_YEAR_ONE).unwrap(), (1, 1));
        assert!(find_year(MJD_YEAR_ONE - 1).is_err());
        assert!(year_start_mjd(0).is_err());
    }

    #[test]
    fn known_year_starts() {
        assert_eq!(year_start_mjd(1998).unwrap(), 50_814);
        assert_eq!(year_start_mjd(1999).unwrap(), 51_179);
        assert_eq!(year_start_mjd(2000).unwrap(), 51_544);
        assert_eq!(year_start_mjd(2001).unwrap(), 51_910);
        // 2001-01-01 closes the fifth 400-year cycle
        assert_eq!(51_910 - MJD_YEAR_ONE, 5 * DAYS_PER_400Y);
    }

    #[test]
    fn find_year_inverts_year_start() {
        for year in [1, 4, 100, 400, 401, 1858, 1998, 2000, 2001, 2400] {
            let start = year_start_mjd(year).unwrap();
            assert_eq!(find_year(start).unwrap(), (year, 1), "year {year}");
            let end = start + year_length(year) - 1;
            assert_eq!(
                find_year(end).unwrap(),
                (year, year_length(year) as u32),
                "year {year}"
            );
        }
    }

    #[test]
    fn century_leap_exceptions() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(1996));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(1999));
        assert_eq!(year_length(2000), 366);
        assert_eq!(year_length(1900), 365);
    }

    #[test]
    fn cycle_boundary_day_is_december_31st() {
        // last day of the first 400-year cycle
        let (year, doy) = find_year(MJD_YEAR_ONE + DAYS_PER_400Y - 1).unwrap();
        assert_eq!((year, doy), (400, 366));
        // last day of a plain 4-year cycle
        let (year, doy) = find_year(year_start_mjd(1996).unwrap() + 365).unwrap();
        assert_eq!((year, doy), (1996, 366));
    }

    #[test]
    fn month_split_handles_leap_february() {
        assert_eq!(month_day_from_ordinal(2000, 60).unwrap(), (2, 29));
        assert_eq!(month_day_from_ordinal(1999, 60).unwrap(), (3, 1));
        assert_eq!(month_day_from_ordinal(1998, 5).unwrap(), (1, 5));
        assert_eq!(month_day_from_ordinal(2000, 366).unwrap(), (12, 31));
        assert!(month_day_from_ordinal(1999, 366).is_err());
        assert!(month_day_from_ordinal(1999, 0).is_err());
    }

    #[test]
    fn ordinal_inverts_month_split() {
        for year in [1999, 2000] {
            for doy in 1..=year_length(year) as u32 {
                let (month, day) = month_day_from_ordinal(year, doy).unwrap();
                assert_eq!(ordinal_from_month_day(year, month, day).unwrap(), doy);
            }
        }
        assert!(ordinal_from_month_day(1999, 2, 29).is_err());
        assert!(ordinal_from_month_day(1999, 13, 1).is_err());
        assert!(ordinal_from_month_day(1999, 4, 31).is_err());
    }

    #[test]
    fn weekday_formula() {
        assert_eq!(weekday(51_910), 1); // 2001-01-01, Monday
        assert_eq!(weekday(51_179), 5); // 1999-01-01, Friday
        assert_eq!(weekday(51_178), 4); // 1998-12-31, Thursday
        assert_eq!(weekday(51_544), 6); // 2000-01-01, Saturday
        assert_eq!(weekday(0), 3); // 1858-11-17, Wednesday
    }

    #[test]
    fn iso_year_anchors_on_the_nearest_monday() {
        // 1999-01-01 is a Friday, so week 1 starts the following Monday
        assert_eq!(iso_week_year_start(1999).unwrap(), 51_182);
        // 1998-01-01 is a Thursday, so week 1 starts the previous Monday
        assert_eq!(iso_week_year_start(1998).unwrap(), 50_811);
        // 2001-01-01 is itself a Monday
        assert_eq!(iso_week_year_start(2001).unwrap(), 51_910);
    }

    #[test]
    fn week_counts_per_iso_year() {
        assert_eq!(weeks_in_iso_year(1998).unwrap(), 53);
        assert_eq!(weeks_in_iso_year(1999).unwrap(), 52);
        assert_eq!(weeks_in_iso_year(2000).unwrap(), 52);
    }

    #[test]
    fn iso_week_crosses_calendar_year_ends() {
        // 1998-12-31 sits in week 53 of ISO year 1998
        assert_eq!(iso_week_from_mjd(51_178).unwrap(), (1998, 53, 4));
        // 1999-01-01 still belongs to ISO year 1998
        assert_eq!(iso_week_from_mjd(51_179).unwrap(), (1998, 53, 5));
        // 2000-01-01 belongs to ISO year 1999
        assert_eq!(iso_week_from_mjd(51_544).unwrap(), (1999, 52, 6));
        // a mid-year date keeps its calendar year
        assert_eq!(iso_week_from_mjd(51_182).unwrap(), (1999, 1, 1));
    }

    #[test]
    fn iso_week_roundtrip() {
        for mjd in [0, 50_811, 51_178, 51_179, 51_544, 51_910, 58_881] {
            let (year, week, day) = iso_week_from_mjd(mjd).unwrap();
            assert_eq!(mjd_from_iso_week(year, week, day).unwrap(), mjd, "MJD {mjd}");
        }
        assert!(mjd_from_iso_week(1999, 53, 1).is_err());
        assert!(mjd_from_iso_week(1998, 53, 1).is_ok());
        assert!(mjd_from_iso_week(1999, 1, 8).is_err());
        assert!(mjd_from_iso_week(1999, 0, 1).is_err());
    }

    // ── Lexer ─────────────────────────────────────────────────────────────

    #[test]
    fn lexes_the_three_date_shapes() {
        let (date, time) = lex_iso8601("1998-01-05T12:00:00").unwrap();
        assert_eq!(
            date,
            IsoDate::Calendar {
                year: 1998,
                month: 1,
                day: 5
            }
        );
        assert_eq!(time.hour, 12);
        assert_eq!(time.second, 0.0);

        let (date, _) = lex_iso8601("1998-W53-4T23:59:59").unwrap();
        assert_eq!(
            date,
            IsoDate::Week {
                year: 1998,
                week: 53,
                weekday: 4
            }
        );

        let (date, _) = lex_iso8601("1998-005T12:00:00").unwrap();
        assert_eq!(date, IsoDate::Ordinal { year: 1998, day: 5 });
    }

    #[test]
    fn lexes_fractional_and_leap_seconds() {
        let (_, time) = lex_iso8601("1998-12-31T23:59:60.5").unwrap();
        assert_eq!(time.second, 60.5);

        let (_, time) = lex_iso8601("2000-01-01T00:00:00.125").unwrap();
        assert_eq!(time.second, 0.125);
    }

    #[test]
    fn rejects_partial_and_basic_layouts() {
        for bad in [
            "1998-01-05",            // no time
            "1998-01-05T12:00",      // omitted seconds
            "19980105T120000",       // basic format
            "1998-01-05 12:00:00",   // missing T
            "1998-01-05T12:00:00T0", // two Ts
            "1998-1-05T12:00:00",    // narrow month
            "98-01-05T12:00:00",     // narrow year
            "1998-005-01T12:00:00",  // ordinal with a third field
            "1998-01-05T12:00:0.5",  // narrow seconds
            "1998-01-05T12:00:00.",  // empty fraction
            "-998-01-05T12:00:00",   // signed year
            "1998-w01-1T00:00:00",   // lowercase week marker
        ] {
            let err = lex_iso8601(bad).unwrap_err();
            assert!(
                matches!(err, TimeError::ParseFailure { .. }),
                "wrong error for {bad:?}: {err}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_clock_fields() {
        for bad in [
            "1998-01-05T24:00:00",
            "1998-01-05T12:60:00",
            "1998-01-05T12:00:61.0",
        ] {
            let err = lex_iso8601(bad).unwrap_err();
            assert!(
                matches!(err, TimeError::RangeViolation { .. }),
                "wrong error for {bad:?}: {err}"
            );
        }
    }
}
