pub mod record;
pub mod store;

pub use record::CandidateTally;
pub use store::{JsonlStore, MemorySink, ReplicationSink, StoreError};
