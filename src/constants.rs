//! Central place for application-wide constants and default values.

/// Default application name (can be overridden in config)
pub const DEFAULT_APP_NAME: &str = "tallymesh";

/// Left padding used to align log lines with those that include emoji prefixes.
/// Keep this to a fixed width matching the emoji prefix you use elsewhere.
pub const ICON_PLACEHOLDER: &str = "   "; // Three spaces for alignment

/// Wire prefix announcing a node's own listening port.
pub const CONNECT_PREFIX: &str = "connect ";

/// Wire prefix carrying a JSON array of tally records. The spelling is
/// inherited from the original two-node demo and is load-bearing for wire
/// compatibility; do not "fix" it.
pub const REPLICATE_PREFIX: &str = "recieve data ";

/// Default inclusive discovery port range.
pub const DEFAULT_RANGE_START: u16 = 7000;
pub const DEFAULT_RANGE_END: u16 = 7001;

/// Delay between per-port dial attempts within a sweep.
pub const DEFAULT_DIAL_DELAY_MS: u64 = 100;

/// Upper bound on a single outbound dial.
pub const DEFAULT_DIAL_TIMEOUT_MS: u64 = 1000;

/// Default tally store location when no [store] section is configured.
pub const DEFAULT_STORE_URI: &str = "data/tallies.jsonl";

/// Application / crate version (populated from Cargo.toml via env! macro)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
