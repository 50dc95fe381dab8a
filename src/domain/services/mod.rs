mod admission;
mod backfill;
mod recommendation;
mod stats;
mod trending;
mod weekly;

pub use admission::*;
pub use backfill::*;
pub use recommendation::*;
pub use stats::*;
pub use trending::*;
pub use weekly::*;
