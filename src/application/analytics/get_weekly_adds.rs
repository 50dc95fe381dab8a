use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::application::analytics::AnalyticsQueryError;
use crate::application::Deadline;
use crate::domain::repositories::QueueRepository;
use crate::domain::services::bucket_by_weekday;
use crate::domain::value_objects::ReportingWeek;

pub struct GetWeeklyAddsInput {
    pub user_id: String,
    pub room_id: String,
    /// RFC 3339 instant or `YYYY-MM-DD`; current week when absent
    pub week_start: Option<String>,
    /// Client offset east of UTC, in minutes
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAdds {
    /// Adds per day, 0 = Sunday .. 6 = Saturday
    pub counts: [u32; 7],
    pub week_start: DateTime<FixedOffset>,
    /// Exclusive
    pub week_end: DateTime<FixedOffset>,
}

/// A user's adds in a room bucketed by weekday
pub struct GetWeeklyAdds<Q: QueueRepository> {
    queue_repo: Arc<Q>,
    deadline: Deadline,
}

impl<Q: QueueRepository> GetWeeklyAdds<Q> {
    pub fn new(queue_repo: Arc<Q>) -> Self {
        Self {
            queue_repo,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(&self, input: GetWeeklyAddsInput) -> Result<WeeklyAdds, AnalyticsQueryError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(&self, input: GetWeeklyAddsInput) -> Result<WeeklyAdds, AnalyticsQueryError> {
        let week = resolve_week(input.week_start.as_deref(), input.tz_offset_minutes)?;

        let created = self
            .queue_repo
            .find_add_times(&input.room_id, &input.user_id, week.start_ts(), week.end_ts())
            .await?;

        Ok(WeeklyAdds {
            counts: bucket_by_weekday(&week, &created),
            week_start: week.start(),
            week_end: week.end(),
        })
    }
}

fn resolve_week(
    week_start: Option<&str>,
    tz_offset_minutes: Option<i32>,
) -> Result<ReportingWeek, AnalyticsQueryError> {
    let offset = tz_offset_minutes
        .map(ReportingWeek::offset_from_minutes)
        .transpose()?;

    let week = match (week_start.filter(|s| !s.trim().is_empty()), offset) {
        (Some(raw), offset) => ReportingWeek::parse(raw, offset)?,
        (None, Some(offset)) => ReportingWeek::containing(Utc::now().with_timezone(&offset)),
        (None, None) => ReportingWeek::current_local(),
    };

    Ok(week)
}
