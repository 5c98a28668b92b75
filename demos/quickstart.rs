use astrochron::{AbsoluteTime, TimeFormat, TimeResult, TimeSystem};

fn main() -> TimeResult<()> {
    let moment = TimeFormat::Calendar.parse_moment("1998-12-31T23:59:60.5")?;
    let utc = AbsoluteTime::from_moment(TimeSystem::Utc, moment);
    let tai = utc.to_system(TimeSystem::Tai)?;
    let tdb = utc.to_system(TimeSystem::Tdb)?;

    println!("UTC: {utc}");
    println!("TAI: {tai}");
    println!("TDB: {tdb}");
    println!("MJD: {}", TimeFormat::Mjd.format_moment(tai.moment(), Some(6))?);
    println!("week date: {}", TimeFormat::IsoWeek.format_moment(moment, None)?);
    Ok(())
}
