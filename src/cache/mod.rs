//! Process-local cache for PageSpeed responses
//!
//! Nothing is persisted; the cache lives exactly as long as the orchestrator
//! that owns it.

pub mod key;
pub mod storage;

use std::time::Duration;

/// Cache TTL configuration per outcome
pub struct CacheTtl;

impl CacheTtl {
    // Audits of the same URL are stable for a few minutes
    pub const SUCCESS: Duration = Duration::from_secs(5 * 60); // 5 min

    // Failures are often transient quota hits; retry them sooner
    pub const FAILURE: Duration = Duration::from_secs(30); // 30 sec
}

// Re-export main types
pub use key::cache_key;
pub use storage::{CacheConfig, DEFAULT_MAX_ENTRIES, ResponseCache};
