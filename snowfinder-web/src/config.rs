//! Service configuration.

use std::time::Duration;

/// Bounded waits for storage calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Ranking and resort listing queries.
    pub query_timeout: Duration,

    /// Single-resort peak lookup (resort plus its peak periods).
    pub lookup_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(10),
            lookup_timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceConfig {
    pub fn from_secs(query_secs: u64, lookup_secs: u64) -> Self {
        Self {
            query_timeout: Duration::from_secs(query_secs),
            lookup_timeout: Duration::from_secs(lookup_secs),
        }
    }
}
