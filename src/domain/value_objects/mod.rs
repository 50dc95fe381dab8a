mod admission_policy;
mod rejection_reason;
mod reporting_week;
mod video_id;

pub use admission_policy::*;
pub use rejection_reason::*;
pub use reporting_week::*;
pub use video_id::*;
