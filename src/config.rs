//! Configuration for raftkv-probe
//!
//! Centralized configuration with defaults matching the reference deployment.

/// Main configuration for a probe run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Base URL of the store's HTTP front end (`http://host[:port][/prefix]`)
    pub base_url: String,

    /// Path of the MsgPack write endpoint, relative to `base_url`
    pub write_path: String,

    /// Path of the read endpoint, relative to `base_url`
    pub read_path: String,

    // -------------------------------------------------------------------------
    // Consistency Configuration
    // -------------------------------------------------------------------------
    /// How to wait for a write to become visible before reading it back
    pub consistency: ConsistencyStrategy,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = transport default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = transport default)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = transport default)
    pub write_timeout_ms: u64,
}

/// Visibility wait strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyStrategy {
    /// Sleep once, then read once
    FixedDelay { ms: u64 },

    /// Read until the write is visible, doubling the delay between attempts
    /// up to `max_delay_ms`, and stop once `timeout_ms` has elapsed
    PollWithBackoff {
        initial_delay_ms: u64,
        max_delay_ms: u64,
        timeout_ms: u64,
    },
}

impl ConsistencyStrategy {
    /// Default settle time for a single replication round
    pub const DEFAULT_DELAY_MS: u64 = 300;
}

impl Default for ConsistencyStrategy {
    fn default() -> Self {
        ConsistencyStrategy::FixedDelay {
            ms: Self::DEFAULT_DELAY_MS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            write_path: "/insert-val".to_string(),
            read_path: "/get-val".to_string(),
            consistency: ConsistencyStrategy::default(),
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base URL of the store
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the write endpoint path
    pub fn write_path(mut self, path: impl Into<String>) -> Self {
        self.config.write_path = path.into();
        self
    }

    /// Set the read endpoint path
    pub fn read_path(mut self, path: impl Into<String>) -> Self {
        self.config.read_path = path.into();
        self
    }

    /// Set the visibility wait strategy
    pub fn consistency(mut self, strategy: ConsistencyStrategy) -> Self {
        self.config.consistency = strategy;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
