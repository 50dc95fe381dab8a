//! Best-effort analytics side effects.
//!
//! Runs after the primary mutation has committed. Every derived-row update
//! is its own task with its own failure boundary: failures are logged and
//! counted, never retried and never returned to the caller.

use std::sync::Arc;

use crate::application::analytics::{StatsAggregator, TrendingAggregator, VoteStatsUpdate};
use crate::application::Deadline;
use crate::domain::repositories::{AnalyticsRepository, RepositoryError};

/// Primary-path event that feeds the aggregators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    SongAdded {
        room_id: String,
        submitter_id: String,
        video_id: String,
    },
    VoteCast {
        room_id: String,
        voter_id: String,
        owner_id: String,
        video_id: String,
    },
    VoteRetracted {
        room_id: String,
        voter_id: String,
        owner_id: String,
        video_id: String,
    },
    Played {
        room_id: String,
        video_id: String,
    },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::SongAdded { .. } => "song_added",
            AnalyticsEvent::VoteCast { .. } => "vote_cast",
            AnalyticsEvent::VoteRetracted { .. } => "vote_retracted",
            AnalyticsEvent::Played { .. } => "played",
        }
    }
}

/// How many side-effect tasks applied and failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub applied: usize,
    pub failed: usize,
}

impl FanOutReport {
    fn record<T>(
        &mut self,
        event: &'static str,
        task: &'static str,
        result: Result<T, RepositoryError>,
    ) {
        match result {
            Ok(_) => self.applied += 1,
            Err(e) => {
                self.failed += 1;
                tracing::warn!("Analytics update {} failed on {}: {}", task, event, e);
            }
        }
    }

    /// A vote touches two stats rows; a deadline hit fails both
    fn record_vote(
        &mut self,
        event: &'static str,
        update: Result<VoteStatsUpdate, RepositoryError>,
    ) {
        match update {
            Ok(update) => {
                self.record(event, "stats.likes_given", update.voter);
                self.record(event, "stats.likes_got", update.owner);
            }
            Err(e) => {
                self.failed += 2;
                tracing::warn!(
                    "Analytics update stats.likes_given and stats.likes_got failed on {}: {}",
                    event,
                    e
                );
            }
        }
    }
}

/// Dispatches analytics events to the trending and stats aggregators
pub struct AnalyticsFanOut<A: AnalyticsRepository> {
    trending: TrendingAggregator<A>,
    stats: StatsAggregator<A>,
}

impl<A: AnalyticsRepository> Clone for AnalyticsFanOut<A> {
    fn clone(&self) -> Self {
        Self {
            trending: self.trending.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<A: AnalyticsRepository> AnalyticsFanOut<A> {
    pub fn new(analytics_repo: Arc<A>) -> Self {
        Self {
            trending: TrendingAggregator::new(analytics_repo.clone()),
            stats: StatsAggregator::new(analytics_repo),
        }
    }

    /// Apply every task of `event`. Each task is bounded by `deadline`.
    pub async fn dispatch(&self, event: &AnalyticsEvent, deadline: Deadline) -> FanOutReport {
        let name = event.name();
        let mut report = FanOutReport::default();

        match event {
            AnalyticsEvent::SongAdded {
                room_id,
                submitter_id,
                video_id,
            } => {
                let result = deadline
                    .run(self.stats.on_song_added(room_id, submitter_id))
                    .await;
                report.record(name, "stats.added", result);

                let result = deadline.run(self.trending.on_add(room_id, video_id)).await;
                report.record(name, "trending.add", result);
            }
            AnalyticsEvent::VoteCast {
                room_id,
                voter_id,
                owner_id,
                video_id,
            } => {
                let update = deadline
                    .run(async {
                        Ok::<_, RepositoryError>(
                            self.stats.on_vote_cast(room_id, voter_id, owner_id).await,
                        )
                    })
                    .await;
                report.record_vote(name, update);

                let result = deadline.run(self.trending.on_upvote(room_id, video_id)).await;
                report.record(name, "trending.upvote", result);
            }
            AnalyticsEvent::VoteRetracted {
                room_id,
                voter_id,
                owner_id,
                video_id,
            } => {
                let update = deadline
                    .run(async {
                        Ok::<_, RepositoryError>(
                            self.stats.on_vote_retracted(room_id, voter_id, owner_id).await,
                        )
                    })
                    .await;
                report.record_vote(name, update);

                let result = deadline
                    .run(self.trending.on_downvote(room_id, video_id))
                    .await;
                report.record(name, "trending.downvote", result);
            }
            AnalyticsEvent::Played { room_id, video_id } => {
                let result = deadline.run(self.trending.on_play(room_id, video_id)).await;
                report.record(name, "trending.play", result);
            }
        }

        if report.failed > 0 {
            tracing::warn!(
                "Analytics fan-out for {}: {} applied, {} failed",
                name,
                report.applied,
                report.failed
            );
        } else {
            tracing::debug!("Analytics fan-out for {}: {} applied", name, report.applied);
        }

        report
    }
}
