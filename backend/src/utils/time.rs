use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Returns the current UTC time, aligned with the configured timezone.
pub fn now_utc(tz: &Tz) -> DateTime<Utc> {
    now_in_timezone(tz).with_timezone(&Utc)
}

/// Returns today's date in the configured timezone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    now_in_timezone(tz).date_naive()
}

/// UTC instants bounding the local calendar date: `[00:00, next day 00:00)`.
pub fn local_day_bounds(date: NaiveDate, tz: &Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start_of = |d: NaiveDate| {
        let midnight = d
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::InvalidInterval("invalid date".to_string()))?;
        tz.from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| AppError::InvalidInterval(format!("no local midnight on {}", d)))
    };

    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::InvalidInterval("date overflow".to_string()))?;

    Ok((start_of(date)?, start_of(next)?))
}
