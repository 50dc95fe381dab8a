use chrono::{DateTime, Duration, NaiveTime};

use crate::domain::value_objects::ReportingWeek;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Count adds per weekday of `week`, index 0 = Sunday .. 6 = Saturday.
///
/// Each timestamp is reduced to the start of its day in the week's offset;
/// the bucket is the whole number of days between that and the week start.
/// Timestamps outside the week are skipped.
pub fn bucket_by_weekday(week: &ReportingWeek, created_at: &[i64]) -> [u32; 7] {
    let start = week.start();
    let offset = *start.offset();
    let mut counts = [0u32; 7];

    for &ts in created_at {
        let Some(instant) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        let local = instant.with_timezone(&offset);
        let day_start = local.date_naive().and_time(NaiveTime::MIN)
            - Duration::seconds(offset.local_minus_utc() as i64);
        let day_start_ts = day_start.and_utc().timestamp();

        let index = (day_start_ts - start.timestamp()).div_euclid(SECONDS_PER_DAY);
        if (0..7).contains(&index) {
            counts[index as usize] += 1;
        }
    }

    counts
}
