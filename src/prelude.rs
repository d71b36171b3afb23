//! tallymesh public prelude (curated stable-intent exports).
//! Import with: `use tallymesh::prelude::*;`

pub use crate::config::{Config, DiscoveryConfig, StoreConfig};
pub use crate::network::{Command, PeerRegistry};
pub use crate::replication::{CandidateTally, JsonlStore, ReplicationSink};
pub use crate::{StartupError, TallyNode};
