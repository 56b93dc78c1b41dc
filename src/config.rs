// src/config.rs
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;
use governor::Quota;

#[derive(Clone)]
pub struct Config {
    // Rate limiting configs
    pub heartbeat_period_secs: u64,
    pub heartbeat_burst_limit: u32,
    pub server_list_period_secs: u64,
    pub server_list_burst_limit: u32,

    // Registry behavior
    pub stale_threshold_secs: u64,
    pub store_timeout_ms: u64,
    pub cas_retries: u32,

    // Local test deployments substitute the loopback address into listings.
    pub localhost_test: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heartbeat_period_secs: 60,
            heartbeat_burst_limit: 100,
            server_list_period_secs: 5,
            server_list_burst_limit: 120,
            stale_threshold_secs: 300,
            store_timeout_ms: 2000,
            cas_retries: 3,
            localhost_test: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            heartbeat_period_secs: env::var("HEARTBEAT_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),

            heartbeat_burst_limit: env::var("HEARTBEAT_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),

            server_list_period_secs: env::var("SERVER_LIST_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            server_list_burst_limit: env::var("SERVER_LIST_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),

            stale_threshold_secs: env::var("STALE_THRESHOLD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),

            store_timeout_ms: env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),

            cas_retries: env::var("CAS_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            localhost_test: env::var("LOCALHOST_TEST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    pub fn heartbeat_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.heartbeat_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.heartbeat_burst_limit).unwrap())
    }

    pub fn server_list_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.server_list_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.server_list_burst_limit).unwrap())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
