//! Resolution of the next transition time.
//!
//! Given "now" and the persisted sunrise/sunset record, decide which event
//! comes next and at what local wall-clock time the job should be armed.

use chrono::{DateTime, FixedOffset, Local, NaiveTime, Offset, Timelike, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::logger::Logger;
use crate::solar::SunTimes;

/// Local timezone used to turn absolute instants into wall-clock times.
///
/// Preferably a named IANA zone (DST-correct across dates); when the system
/// database cannot be consulted, the process's current UTC offset serves as
/// a degraded fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalZone {
    Iana(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    /// Local time-of-day of an absolute instant under this zone.
    pub fn time_of_day(&self, instant: DateTime<Utc>) -> NaiveTime {
        match self {
            LocalZone::Iana(tz) => instant.with_timezone(tz).time(),
            LocalZone::Fixed(offset) => instant.with_timezone(offset).time(),
        }
    }
}

/// Resolve the local timezone, falling back to the current UTC offset.
///
/// The fallback is never fatal: scheduling keeps working with a frozen
/// offset, it just stops tracking DST until the next resolution.
pub fn local_zone(logger: &Logger) -> LocalZone {
    match system_iana_zone() {
        Some(tz) => LocalZone::Iana(tz),
        None => {
            let offset = Local::now().offset().fix();
            logger.warning(format!(
                "Could not resolve IANA timezone, falling back to UTC offset {offset}"
            ));
            LocalZone::Fixed(offset)
        }
    }
}

/// Look up the system timezone name and parse it against the IANA database.
///
/// Checks the `TZ` environment variable first, then the `/etc/localtime`
/// symlink target.
fn system_iana_zone() -> Option<Tz> {
    if let Ok(name) = std::env::var("TZ") {
        let name = name.trim_start_matches(':');
        if let Ok(tz) = Tz::from_str(name) {
            return Some(tz);
        }
    }

    let target = std::fs::read_link("/etc/localtime").ok()?;
    let target = target.to_str()?;
    let name = target.split("zoneinfo/").nth(1)?;
    Tz::from_str(name).ok()
}

/// Compute the wall-clock time of the next transition.
///
/// Sunrise and sunset are reduced to minute-precision local time-of-day
/// (the scheduler only supports minute-granularity arming) and compared
/// against the full-precision time-of-day of "now". If "now" falls strictly
/// between sunrise and sunset the next event is sunset; otherwise (before
/// sunrise, after sunset) it is sunrise.
///
/// Tie-break: when "now" equals a truncated event time exactly, the event
/// counts as already past (the strict comparison fails), so the answer is
/// sunrise. In live operation the loop polls strictly after the armed
/// minute, so a job that just fired is always seen as past.
pub fn next_run_at(now: DateTime<Utc>, times: &SunTimes, zone: &LocalZone) -> NaiveTime {
    let now = zone.time_of_day(now);
    let sunrise = truncate_to_minute(zone.time_of_day(times.sunrise));
    let sunset = truncate_to_minute(zone.time_of_day(times.sunset));

    if sunrise < now && now < sunset {
        sunset
    } else {
        sunrise
    }
}

fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_zone() -> LocalZone {
        LocalZone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn times(sunrise: (u32, u32), sunset: (u32, u32)) -> SunTimes {
        SunTimes {
            sunrise: Utc
                .with_ymd_and_hms(2025, 6, 21, sunrise.0, sunrise.1, 0)
                .unwrap(),
            sunset: Utc
                .with_ymd_and_hms(2025, 6, 21, sunset.0, sunset.1, 0)
                .unwrap(),
        }
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 21, hour, min, 0).unwrap()
    }

    #[test]
    fn midday_resolves_to_sunset() {
        let t = times((6, 45), (19, 10));
        assert_eq!(
            next_run_at(at(12, 0), &t, &utc_zone()),
            NaiveTime::from_hms_opt(19, 10, 0).unwrap()
        );
    }

    #[test]
    fn before_sunrise_resolves_to_sunrise() {
        let t = times((6, 45), (19, 10));
        assert_eq!(
            next_run_at(at(3, 0), &t, &utc_zone()),
            NaiveTime::from_hms_opt(6, 45, 0).unwrap()
        );
    }

    #[test]
    fn after_sunset_resolves_to_sunrise() {
        let t = times((6, 45), (19, 10));
        assert_eq!(
            next_run_at(at(22, 30), &t, &utc_zone()),
            NaiveTime::from_hms_opt(6, 45, 0).unwrap()
        );
    }

    #[test]
    fn exact_sunrise_counts_as_past() {
        let t = times((6, 45), (19, 10));
        assert_eq!(
            next_run_at(at(6, 45), &t, &utc_zone()),
            NaiveTime::from_hms_opt(6, 45, 0).unwrap()
        );
    }

    #[test]
    fn exact_sunset_counts_as_past() {
        let t = times((6, 45), (19, 10));
        assert_eq!(
            next_run_at(at(19, 10), &t, &utc_zone()),
            NaiveTime::from_hms_opt(6, 45, 0).unwrap()
        );
    }

    #[test]
    fn seconds_are_discarded_before_comparison() {
        let t = SunTimes {
            sunrise: Utc.with_ymd_and_hms(2025, 6, 21, 6, 45, 59).unwrap(),
            sunset: Utc.with_ymd_and_hms(2025, 6, 21, 19, 10, 30).unwrap(),
        };
        // 19:10:00 equals the truncated sunset, so sunset is already past.
        assert_eq!(
            next_run_at(at(19, 10), &t, &utc_zone()),
            NaiveTime::from_hms_opt(6, 45, 0).unwrap()
        );
    }

    #[test]
    fn record_ordering_is_not_assumed() {
        // Sunset persisted for today, sunrise already rolled to tomorrow:
        // the stored sunset instant precedes the stored sunrise instant.
        let t = SunTimes {
            sunrise: Utc.with_ymd_and_hms(2025, 6, 22, 6, 46, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2025, 6, 21, 19, 10, 0).unwrap(),
        };
        assert_eq!(
            next_run_at(at(12, 0), &t, &utc_zone()),
            NaiveTime::from_hms_opt(19, 10, 0).unwrap()
        );
    }

    #[test]
    fn iana_zone_shifts_time_of_day() {
        let zone = LocalZone::Iana(chrono_tz::Tz::Europe__Berlin);
        // 10:00 UTC on a summer date is 12:00 in Berlin (CEST).
        assert_eq!(
            zone.time_of_day(at(10, 0)),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
    }
}
