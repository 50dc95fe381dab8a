mod add_song;
mod advance_queue;
mod cast_vote;
mod list_queue;
mod remove_song;
mod retract_vote;

pub use add_song::*;
pub use advance_queue::*;
pub use cast_vote::*;
pub use list_queue::*;
pub use remove_song::*;
pub use retract_vote::*;
