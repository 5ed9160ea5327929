//! Gateway data model: keys, payloads, descriptors, and batch outcomes.

pub mod descriptor;
pub mod ids;
pub mod outcome;
pub mod payload;

pub use descriptor::AccessDescriptor;
pub use ids::ObjectKey;
pub use outcome::{BatchPartition, BatchReport, ItemOutcome};
pub use payload::PayloadItem;
