//! Shared defaults for the broker.

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default expiration sweep interval in seconds (0 disables the sweeper).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Dequeue wait used when the request does not specify a timeout.
pub const DEFAULT_DEQUEUE_TIMEOUT_SECS: u64 = 30;

/// Upper bound for a single dequeue wait.
pub const DEFAULT_MAX_DEQUEUE_TIMEOUT_SECS: u64 = 300;

/// Largest accepted `server.max_dequeue_timeout_secs` (one day).
pub const MAX_DEQUEUE_TIMEOUT_LIMIT_SECS: u64 = 86_400;

/// Slack added on top of the longest dequeue wait for the request timeout.
pub const REQUEST_TIMEOUT_GRACE_SECS: u64 = 5;

/// Elements returned per dequeue when the request does not say.
pub const DEFAULT_MAX_RESPONSE_ELEMENTS: usize = 1;

/// Default CSV field separator.
pub const DEFAULT_CSV_SEPARATOR: &str = ";";

/// Default CSV row separator.
pub const DEFAULT_CSV_LINE_SEPARATOR: &str = "\n";

/// Media type selecting the row-oriented response encoding.
pub const CSV_MEDIA_TYPE: &str = "application/csv";
