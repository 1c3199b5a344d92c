use crate::error::{other_error, AppResult};
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone,
    Utc, Weekday,
};
use chrono_tz::Tz;

/// Length of the calendar view window in days
pub const WEEK_DAYS: i64 = 7;

/// Start and end of the displayed calendar week, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl WeekWindow {
    /// ISO 8601 start boundary with seconds precision
    pub fn start_iso(&self) -> String {
        to_iso_seconds(&self.start)
    }

    /// ISO 8601 end boundary with seconds precision
    pub fn end_iso(&self) -> String {
        to_iso_seconds(&self.end)
    }
}

/// Local midnight of `date` in `tz`.
///
/// Zones that skip midnight on a DST change get the first instant of the day.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> AppResult<DateTime<Tz>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| other_error("Failed to create midnight"))?;

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => {
            // Walk forward to the end of the gap
            let shifted = midnight + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .ok_or_else(|| other_error("Invalid local midnight"))
        }
    }
}

/// Midnight today in `tz` as seen at `now`
pub fn midnight_today(tz: Tz, now: DateTime<Utc>) -> AppResult<DateTime<Tz>> {
    local_midnight(tz, now.with_timezone(&tz).date_naive())
}

/// Calendar week containing `today`, starting on Sunday.
///
/// A non-Sunday goes back by its ISO weekday number (Mon=1..Sat=6), which
/// always lands on the preceding Sunday. Sunday is its own week start.
pub fn week_window(today: &DateTime<Tz>) -> AppResult<WeekWindow> {
    let tz = today.timezone();
    let date = today.date_naive();

    let start_date = if date.weekday() != Weekday::Sun {
        date - Duration::days(i64::from(date.weekday().number_from_monday()))
    } else {
        date
    };
    let end_date = start_date + Duration::days(WEEK_DAYS);

    Ok(WeekWindow {
        start: local_midnight(tz, start_date)?,
        end: local_midnight(tz, end_date)?,
    })
}

/// Format a timestamp like `2024-03-10T00:00:00-06:00`
pub fn to_iso_seconds<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.fixed_offset().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse a date-time string as returned by Graph.
///
/// Graph sends local times with seven fractional digits and no offset, e.g.
/// `2024-03-12T15:00:00.0000000`. Values with an offset are accepted too and
/// keep their wall-clock time.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}
