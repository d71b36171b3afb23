// src/replication/record.rs

use serde::{Deserialize, Serialize};

/// One replicated vote-tally line as carried on the wire and written to the
/// backing store. Records are ephemeral: they exist between decode and the
/// store write, nothing retains them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateTally {
    pub name: String,
    pub key: String,
    pub election: String,
    pub votes: i32,
}
