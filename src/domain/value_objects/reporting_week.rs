use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, Utc};

/// A Sunday-00:00 to Sunday-00:00 reporting week in a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWeek {
    start: DateTime<FixedOffset>,
}

impl ReportingWeek {
    /// Week containing `instant`, with day boundaries taken in the instant's own offset
    pub fn containing(instant: DateTime<FixedOffset>) -> Self {
        let offset = *instant.offset();
        let date = instant.date_naive();
        let sunday = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
        Self {
            start: midnight(sunday, offset),
        }
    }

    /// Current week at server-local day granularity
    pub fn current_local() -> Self {
        let now = Local::now();
        let offset = *now.offset();
        Self::containing(now.with_timezone(&offset))
    }

    /// Parse a client-supplied week start.
    ///
    /// Accepts RFC 3339 instants and bare `YYYY-MM-DD` dates. When `offset` is
    /// given the instant is re-expressed in it before snapping to Sunday, so a
    /// client sending its local midnight as UTC still lands on its own week.
    pub fn parse(value: &str, offset: Option<FixedOffset>) -> Result<Self, ReportingWeekError> {
        let value = value.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            let instant = match offset {
                Some(tz) => instant.with_timezone(&tz),
                None => instant,
            };
            return Ok(Self::containing(instant));
        }

        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| ReportingWeekError::Invalid(value.to_string()))?;
        let tz = offset.unwrap_or_else(|| Utc.fix());
        Ok(Self::containing(midnight(date, tz)))
    }

    /// Build an offset from minutes east of UTC
    pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, ReportingWeekError> {
        FixedOffset::east_opt(minutes * 60).ok_or(ReportingWeekError::InvalidOffset(minutes))
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Exclusive end of the week
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.start + Duration::days(7)
    }

    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_ts(&self) -> i64 {
        self.end().timestamp()
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start_ts() && timestamp < self.end_ts()
    }
}

fn midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(utc, offset)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportingWeekError {
    #[error("Invalid week start: {0}")]
    Invalid(String),
    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),
}
