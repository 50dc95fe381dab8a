mod room_stats;
mod stream;
mod trending;
mod vote;

pub use room_stats::*;
pub use stream::*;
pub use trending::*;
pub use vote::*;
