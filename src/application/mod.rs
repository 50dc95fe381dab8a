pub mod analytics;
pub mod queue;

mod deadline;

pub use deadline::*;

#[cfg(test)]
mod test_support;
