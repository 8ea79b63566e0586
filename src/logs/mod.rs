//! Device log parsing: line grammar, tag classification, incremental
//! streaming and the statistics computed from them.

pub mod classify;
pub mod line;
pub mod stats;
pub mod stream;

pub use classify::{classify, filter_lines, Classified};
pub use line::{extract_timestamp, Timestamp};
pub use stats::{count_interactions, AcceleratorCounts};
pub use stream::LogStreamer;
