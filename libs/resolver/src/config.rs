//! Resolver configuration.

/// Environment variable enabling concurrent per-type lookups.
pub const RESOLVE_CONCURRENT_ENV: &str = "TAGID_RESOLVE_CONCURRENT";

/// Environment variable enabling the identity cache.
pub const IDENTITY_CACHE_ENV: &str = "TAGID_IDENTITY_CACHE";

/// Environment variable holding the identity cache's entry limit.
pub const IDENTITY_CACHE_CAPACITY_ENV: &str = "TAGID_IDENTITY_CACHE_CAPACITY";

/// Default entry limit for the identity cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Batch resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Poll the per-type lookups of one resolve call concurrently.
    pub concurrent: bool,

    /// Keep fetched records in a per-resolver identity cache.
    pub identity_cache: bool,

    /// Maximum number of cached records. Least recently used entries are
    /// evicted past this.
    pub cache_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrent: false,
            identity_cache: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// A missing, unparsable or zero capacity keeps the default.
    pub fn from_env() -> Self {
        let cache_capacity = std::env::var(IDENTITY_CACHE_CAPACITY_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_CACHE_CAPACITY);

        Self {
            concurrent: env_flag(RESOLVE_CONCURRENT_ENV).unwrap_or(false),
            identity_cache: env_flag(IDENTITY_CACHE_ENV).unwrap_or(false),
            cache_capacity,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
