pub mod history;
pub mod sinks;

pub use history::{AlertLog, ReadingHistoryStore};
pub use sinks::{AlertSink, ReadingSink};
