//! Server Configuration

use std::path::PathBuf;

use crate::cache::DEFAULT_MAX_ENTRIES;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub bind: String,

    /// Port number
    pub port: u16,

    /// Directory holding the distance table and similarity matrices
    pub data_dir: PathBuf,

    /// Number of runtime worker threads (0 = auto-detect)
    pub workers: usize,

    /// Memoize query responses
    pub cache_enabled: bool,

    /// Cached response lifetime in seconds
    pub cache_ttl_secs: u64,

    /// Expired-response cleaner interval in seconds
    pub cache_cleaner_interval: u64,

    /// Upper bound on cached responses
    pub cache_max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./datasets"),
            workers: 0,
            cache_enabled: true,
            cache_ttl_secs: 60,
            cache_cleaner_interval: 10,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set cache TTL; 0 disables the cache
    pub fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self.cache_enabled = ttl_secs > 0;
        self
    }

    pub fn with_cache_cleaner_interval(mut self, interval: u64) -> Self {
        self.cache_cleaner_interval = interval;
        self
    }

    pub fn with_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache_max_entries = max_entries;
        self
    }

    /// Resolved worker thread count
    pub fn worker_threads(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
