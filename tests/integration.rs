use astrochron::{
    active_tdb_correction, select_tdb_correction, AbsoluteTime, Calendar, Duration, ElapsedTime,
    FairheadBretagnon1990, IntFrac, LeapSecondTable, Moment, TdbCorrection, TimeError, TimeFormat,
    TimeRep, TimeSystem, TimeUnit,
};
use chrono::DateTime;
use std::sync::Arc;

#[test]
fn six_days_count_as_exact_seconds() {
    let six_days = Duration::new(6, 0.0).unwrap();
    let seconds = six_days.get(TimeUnit::Sec).unwrap();
    assert_eq!(seconds, IntFrac::new(518_400, 0.0).unwrap());
}

#[test]
fn utc_to_tai_across_the_1999_boundary() {
    // midnight carries the freshly inserted 22nd leap second: offset 32
    let at_midnight = TimeSystem::Tai
        .convert_from(TimeSystem::Utc, Moment::new(51_179, 0.0))
        .unwrap();
    assert_eq!(at_midnight, Moment::new(51_179, 32.0));

    // a millisecond earlier the offset is still 31
    let just_before = TimeSystem::Tai
        .convert_from(TimeSystem::Utc, Moment::new(51_179, -0.001))
        .unwrap();
    assert_eq!(just_before.day, 51_179);
    assert!((just_before.sec - 30.999).abs() < 1e-9);
}

#[test]
fn tdb_arithmetic_is_exact() {
    let base = AbsoluteTime::from_name("TDB", 51_910, Duration::new(0, 1_000.0).unwrap()).unwrap();
    let step = ElapsedTime::from_name("TDB", Duration::new(0, 100.0).unwrap()).unwrap();
    let moved = base.add_elapsed(&step).unwrap();
    assert_eq!(moved.moment(), Moment::new(51_910, 1_100.0));

    let direct =
        AbsoluteTime::from_name("TDB", 51_910, Duration::new(0, 1_100.0).unwrap()).unwrap();
    assert_eq!(moved, direct);
}

#[test]
fn ordinal_rejects_calendar_shapes() {
    assert!(TimeFormat::Ordinal
        .parse_moment("1998-01-05T12:00:00")
        .is_err());
    let moment = TimeFormat::Ordinal
        .parse_moment("1998-005T12:00:00")
        .unwrap();
    assert_eq!(moment, Moment::new(50_818, 43_200.0));
}

#[test]
fn mjd_and_jd_name_the_same_instant() {
    let moment = Moment::new(51_910, 0.0);
    let mjd = TimeFormat::from_name("MJD").unwrap();
    let jd = TimeFormat::from_name("JD").unwrap();
    assert_eq!(mjd.format_moment(moment, None).unwrap(), "51910 MJD");
    assert_eq!(jd.format_moment(moment, None).unwrap(), "2451910.5 JD");
    assert_eq!(jd.parse_moment("2451910.5 JD").unwrap(), moment);
}

#[test]
fn conversions_are_reflexive() {
    for system in TimeSystem::ALL {
        // identity conversion keeps even an unfolded moment bit for bit
        let odd = Moment::new(51_544, -12.25);
        assert_eq!(system.convert_from(system, odd).unwrap(), odd);
    }
}

#[test]
fn leap_second_reading_matches_elapsed_advance() {
    // half a second into the 1998-12-31 insertion, by two routes
    let parsed = Calendar::parse("1998-12-31T23:59:60.5")
        .unwrap()
        .to_moment()
        .unwrap();
    assert_eq!(parsed, Moment::new(51_178, 86_400.5));

    let origin = AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_178, 0.0));
    let advanced = origin
        .add_elapsed(&ElapsedTime::from_seconds(TimeSystem::Utc, 86_400.5).unwrap())
        .unwrap();
    assert_eq!(advanced.moment(), parsed);
    assert_eq!(advanced, AbsoluteTime::from_moment(TimeSystem::Utc, parsed));

    // the difference law hands the elapsed seconds back, day-folded
    let span = (advanced - origin).compute_elapsed_time("UTC").unwrap();
    assert_eq!(span.duration(), Duration::new(0, 86_400.5).unwrap());
}

#[test]
fn interval_length_agrees_across_systems() {
    // one UTC calendar day containing one inserted second
    let start = AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_178, 0.0));
    let end = AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_179, 0.0));
    let interval = end - start;

    let in_utc = interval.compute_elapsed_time("UTC").unwrap().duration();
    let in_tai = interval.compute_elapsed_time("TAI").unwrap().duration();
    assert_eq!(in_utc, Duration::new(1, 1.0).unwrap());
    assert_eq!(in_tai, Duration::new(1, 1.0).unwrap());

    // the same pair read a year later spans a plain day
    let quiet_start = AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_544, 0.0));
    let quiet_end = AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_545, 0.0));
    let quiet = (quiet_end - quiet_start)
        .compute_elapsed_time("UTC")
        .unwrap();
    assert_eq!(quiet.duration(), Duration::new(1, 0.0).unwrap());
}

#[test]
fn instants_compare_across_systems() {
    let utc = AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_179, 0.0));
    let tai = AbsoluteTime::from_moment(TimeSystem::Tai, Moment::new(51_179, 32.0));
    let tt = AbsoluteTime::from_moment(TimeSystem::Tt, Moment::new(51_179, 64.184));
    assert_eq!(utc, tai);
    assert_eq!(tai, tt);
    assert!(utc < AbsoluteTime::from_moment(TimeSystem::Tai, Moment::new(51_179, 33.0)));

    let tolerance = ElapsedTime::from_seconds(TimeSystem::Tai, 0.5).unwrap();
    assert!(utc.equivalent_to(&tai, &tolerance).unwrap());
    assert!(tai.equivalent_to(&utc, &tolerance).unwrap());
}

#[test]
fn chrono_timestamps_map_onto_utc_days() {
    let datetime = DateTime::from_timestamp(946_684_800, 500_000_000).unwrap();
    let instant = AbsoluteTime::from_datetime(datetime);
    assert_eq!(instant.system(), TimeSystem::Utc);
    assert_eq!(instant.moment(), Moment::new(51_544, 0.5));
    assert_eq!(instant.to_datetime().unwrap(), datetime);
}

#[test]
fn format_pipeline_survives_a_system_trip() {
    let moment = TimeFormat::Calendar
        .parse_moment("2000-01-01T12:00:00")
        .unwrap();
    let utc = AbsoluteTime::from_moment(TimeSystem::Utc, moment);

    // the TAI leg is pure offset arithmetic, so the text survives bit for bit
    let via_tai = utc
        .to_system(TimeSystem::Tai)
        .unwrap()
        .to_system(TimeSystem::Utc)
        .unwrap();
    assert_eq!(via_tai.moment(), moment);
    let rendered = TimeFormat::Calendar
        .format_moment(via_tai.moment(), Some(3))
        .unwrap();
    assert_eq!(rendered, "2000-01-01T12:00:00.000");

    // the TDB leg only promises the inverse-solver tolerance
    let via_tdb = utc
        .to_system(TimeSystem::Tdb)
        .unwrap()
        .to_system(TimeSystem::Utc)
        .unwrap();
    assert_eq!(via_tdb.moment().day, moment.day);
    assert!((via_tdb.moment().sec - moment.sec).abs() < 1e-6);
}

#[test]
fn leap_table_reload_pipeline() {
    // identical numbers to the built-in table, so concurrent tests keep
    // seeing the same offsets
    let rows: Vec<(f64, f64)> = LeapSecondTable::builtin()
        .entries()
        .iter()
        .map(|&(day, count)| (day as f64, count as f64))
        .collect();

    let v1 = LeapSecondTable::load_entries(&rows, false).unwrap();
    let v2 = LeapSecondTable::load_entries(&rows, false).unwrap();
    assert_eq!(v2, v1, "plain reload after an explicit load must no-op");
    let v3 = LeapSecondTable::load_entries(&rows, true).unwrap();
    assert!(v3 > v2);

    // conversions keep working on the reloaded table
    let converted = TimeSystem::Tai
        .convert_from(TimeSystem::Utc, Moment::new(51_179, 0.0))
        .unwrap();
    assert_eq!(converted, Moment::new(51_179, 32.0));

    // rows with fractional days never make it in
    assert!(LeapSecondTable::load_entries(&[(41_317.5, 0.0)], true).is_err());
}

struct SameSeries;

impl TdbCorrection for SameSeries {
    fn name(&self) -> &'static str {
        "FB1990"
    }

    fn tdb_minus_tt(&self, jd_int: i64, jd_frac: f64) -> qtty::Seconds {
        FairheadBretagnon1990.tdb_minus_tt(jd_int, jd_frac)
    }
}

struct OtherModel;

impl TdbCorrection for OtherModel {
    fn name(&self) -> &'static str {
        "DE405"
    }

    fn tdb_minus_tt(&self, _jd_int: i64, _jd_frac: f64) -> qtty::Seconds {
        qtty::Seconds::new(0.0)
    }
}

#[test]
fn tdb_correction_selection_is_exclusive() {
    // numerically identical to the default, so parallel TDB tests are
    // untouched by the selection
    select_tdb_correction(Arc::new(SameSeries)).unwrap();
    assert_eq!(active_tdb_correction().name(), "FB1990");

    let err = select_tdb_correction(Arc::new(OtherModel)).unwrap_err();
    assert!(matches!(err, TimeError::ConfigurationConflict { .. }));
    // the active model survives the rejected request
    assert_eq!(active_tdb_correction().name(), "FB1990");

    // re-selecting the same name stays fine
    select_tdb_correction(Arc::new(SameSeries)).unwrap();
}

#[cfg(feature = "serde")]
#[test]
fn serde_roundtrips_a_mixed_interval() {
    let interval = AbsoluteTime::from_moment(TimeSystem::Tai, Moment::new(51_179, 32.0))
        - AbsoluteTime::from_moment(TimeSystem::Utc, Moment::new(51_178, 0.0));
    let json = serde_json::to_string(&interval).unwrap();
    let back: astrochron::TimeInterval = serde_json::from_str(&json).unwrap();
    assert_eq!(back.start().system(), TimeSystem::Utc);
    assert_eq!(back.end().system(), TimeSystem::Tai);
    assert_eq!(
        back.compute_elapsed_time("TAI").unwrap().duration(),
        Duration::new(1, 1.0).unwrap()
    );
}
