mod backfill;
mod error;
mod fan_out;
mod get_recommendation;
mod get_stats;
mod get_top_songs;
mod get_trending;
mod get_weekly_adds;
mod song_details;
mod stats_aggregator;
mod trending_aggregator;

pub use backfill::*;
pub use error::*;
pub use fan_out::*;
pub use get_recommendation::*;
pub use get_stats::*;
pub use get_top_songs::*;
pub use get_trending::*;
pub use get_weekly_adds::*;
pub use song_details::*;
pub use stats_aggregator::*;
pub use trending_aggregator::*;
