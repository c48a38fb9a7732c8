//! Pool configuration: operating mode, capacity thresholds, and wait limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default task queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
/// Default worker-count ceiling for cached mode.
pub const DEFAULT_MAX_WORKERS: usize = 100;
/// Default bounded wait inside `submit`, in milliseconds.
pub const DEFAULT_SUBMIT_WAIT_MS: u64 = 1_000;
/// Default idle limit before a surplus cached-mode worker retires, in
/// milliseconds.
pub const DEFAULT_IDLE_LIMIT_MS: u64 = 10_000;

/// Worker population policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolMode {
    /// Worker count is constant from start to shutdown.
    Fixed,
    /// Worker count grows toward `max_workers` under backlog and shrinks
    /// back to the initial count as surplus workers idle out.
    Cached,
}

/// Pool configuration.
///
/// Values take effect at [`crate::ThreadPool::start`]; the controller
/// freezes them once running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Worker population policy.
    pub mode: PoolMode,
    /// Maximum queued tasks before a submission overflows.
    pub queue_capacity: usize,
    /// Upper bound on the worker count; effective in cached mode only.
    pub max_workers: usize,
    /// How long a submitter waits for queue space, in milliseconds.
    pub submit_wait_ms: u64,
    /// How long a surplus cached-mode worker may idle before retiring, in
    /// milliseconds.
    pub idle_limit_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: PoolMode::Fixed,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_workers: DEFAULT_MAX_WORKERS,
            submit_wait_ms: DEFAULT_SUBMIT_WAIT_MS,
            idle_limit_ms: DEFAULT_IDLE_LIMIT_MS,
        }
    }
}

impl PoolConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker population policy.
    #[must_use]
    pub const fn with_mode(mut self, mode: PoolMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the task queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the worker-count ceiling for cached mode.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the bounded wait inside `submit`.
    #[must_use]
    pub const fn with_submit_wait_ms(mut self, millis: u64) -> Self {
        self.submit_wait_ms = millis;
        self
    }

    /// Set the idle limit before a surplus cached-mode worker retires.
    #[must_use]
    pub const fn with_idle_limit_ms(mut self, millis: u64) -> Self {
        self.idle_limit_ms = millis;
        self
    }

    /// The bounded wait inside `submit` as a [`Duration`].
    #[must_use]
    pub const fn submit_wait(&self) -> Duration {
        Duration::from_millis(self.submit_wait_ms)
    }

    /// The cached-mode idle limit as a [`Duration`].
    #[must_use]
    pub const fn idle_limit(&self) -> Duration {
        Duration::from_millis(self.idle_limit_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.submit_wait_ms == 0 {
            return Err("submit_wait_ms must be greater than 0".into());
        }
        if self.idle_limit_ms == 0 {
            return Err("idle_limit_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns a message describing the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PoolConfig::new();
        assert_eq!(cfg.mode, PoolMode::Fixed);
        assert_eq!(cfg.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(cfg.max_workers, DEFAULT_MAX_WORKERS);
        assert_eq!(cfg.submit_wait(), Duration::from_secs(1));
        assert_eq!(cfg.idle_limit(), Duration::from_secs(10));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let cfg = PoolConfig::new()
            .with_mode(PoolMode::Cached)
            .with_queue_capacity(16)
            .with_max_workers(8)
            .with_submit_wait_ms(250)
            .with_idle_limit_ms(500);
        assert_eq!(cfg.mode, PoolMode::Cached);
        assert_eq!(cfg.queue_capacity, 16);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.submit_wait(), Duration::from_millis(250));
        assert_eq!(cfg.idle_limit(), Duration::from_millis(500));
    }

    #[test]
    fn test_validation_rejects_zeroes() {
        assert!(PoolConfig::new().with_queue_capacity(0).validate().is_err());
        assert!(PoolConfig::new().with_max_workers(0).validate().is_err());
        assert!(PoolConfig::new().with_submit_wait_ms(0).validate().is_err());
        assert!(PoolConfig::new().with_idle_limit_ms(0).validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let cfg = PoolConfig::new().with_mode(PoolMode::Cached).with_max_workers(8);
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = PoolConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.mode, PoolMode::Cached);
        assert_eq!(parsed.max_workers, 8);
    }

    #[test]
    fn test_from_json_str_rejects_invalid() {
        assert!(PoolConfig::from_json_str("not json").is_err());

        let zero_capacity = r#"{
            "mode": "fixed",
            "queue_capacity": 0,
            "max_workers": 100,
            "submit_wait_ms": 1000,
            "idle_limit_ms": 10000
        }"#;
        assert!(PoolConfig::from_json_str(zero_capacity).is_err());
    }

    #[test]
    fn test_mode_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&PoolMode::Cached).unwrap(), "\"cached\"");
        assert_eq!(serde_json::to_string(&PoolMode::Fixed).unwrap(), "\"fixed\"");
    }
}
