//! Configuration for the logging facade and its sinks.
//!
//! Options can be built in code through the `with_*` methods or read from a
//! JSON file. Every field is optional in the file; missing fields take the
//! defaults below.
//!
//! # Example config
//!
//! ```json
//! {
//!   "project_name": "order-gateway",
//!   "log_path": "/var/log/order-gateway",
//!   "log_level": "info",
//!   "max_size_mb": 100,
//!   "max_age_days": 7,
//!   "max_backups": 10,
//!   "stdout": "yes",
//!   "sink": "buffered",
//!   "buffer": { "queue_capacity": 5000, "flush_threshold": 1024, "tick_interval_ms": 1000 }
//! }
//! ```

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

pub const DEFAULT_LOG_PATH: &str = "logs";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_STACKTRACE_LEVEL: &str = "error";
pub const DEFAULT_PROJECT_NAME: &str = "mantis";
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
pub const DEFAULT_MAX_AGE_DAYS: u64 = 7;
pub const DEFAULT_MAX_BACKUPS: usize = 10;

pub const DEFAULT_QUEUE_CAPACITY: usize = 5000;
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1024;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// How the rotating file decides to roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Roll when the active file exceeds `max_size_mb`.
    #[default]
    Size,
    /// Start a new file every day.
    Daily,
    /// Start a new file every hour.
    Hourly,
}

/// Which byte-sink variant sits in front of the rotating file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkMode {
    /// Queue records and flush them from a background worker.
    #[default]
    Buffered,
    /// Write every record straight through on the caller's thread.
    Direct,
}

/// Tunables of the buffered writer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum number of records waiting in the queue before producers block.
    pub queue_capacity: usize,
    /// Flush as soon as the accumulation buffer grows beyond this many bytes.
    pub flush_threshold: usize,
    /// Period of the time-based flush.
    pub tick_interval_ms: u64,
    /// CPU core to pin the worker thread to.
    pub worker_cpu_core: Option<i32>,
}

impl BufferConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            worker_cpu_core: None,
        }
    }
}

/// Logging facade options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// Directory that holds the log files.
    pub log_path: PathBuf,
    /// Base file name (without `.log`). Falls back to the project name.
    pub log_name: Option<String>,
    /// Minimum level written (`debug`, `info`, `warn`, `error`, ...).
    pub log_level: String,
    /// Per-file size cap in megabytes (`0` disables size rolling).
    pub max_size_mb: u64,
    /// Days a rotated file is kept (`0` keeps them forever).
    pub max_age_days: u64,
    /// Number of rotated files kept.
    pub max_backups: usize,
    /// Records at or above this level carry a captured backtrace.
    pub stacktrace_level: String,
    /// Mirror records to stdout.
    #[serde(deserialize_with = "yes_or_bool")]
    pub stdout: bool,
    /// Attached to every record as the `project` field.
    pub project_name: String,
    pub rotation: RotationPolicy,
    pub sink: SinkMode,
    pub buffer: BufferConfig,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            log_name: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            max_backups: DEFAULT_MAX_BACKUPS,
            stacktrace_level: DEFAULT_STACKTRACE_LEVEL.to_string(),
            stdout: false,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            rotation: RotationPolicy::default(),
            sink: SinkMode::default(),
            buffer: BufferConfig::default(),
        }
    }
}

impl LogOptions {
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn with_log_name(mut self, name: impl Into<String>) -> Self {
        self.log_name = Some(name.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_max_size_mb(mut self, mb: u64) -> Self {
        self.max_size_mb = mb;
        self
    }

    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    pub fn with_max_backups(mut self, backups: usize) -> Self {
        self.max_backups = backups;
        self
    }

    pub fn with_stacktrace_level(mut self, level: impl Into<String>) -> Self {
        self.stacktrace_level = level.into();
        self
    }

    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_sink(mut self, sink: SinkMode) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    /// Returns the effective file name, defaulting to the project name.
    pub fn effective_log_name(&self) -> &str {
        self.log_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.project_name)
    }

    /// Reject option sets that cannot produce a working logger.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::EmptyProjectName);
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogPath);
        }
        if self.buffer.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.buffer.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

/// Accepts `true`/`false` as well as the `"yes"`/`"no"` strings older
/// configs use for the stdout toggle.
fn yes_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Toggle {
        Bool(bool),
        Text(String),
    }

    match Toggle::deserialize(deserializer)? {
        Toggle::Bool(b) => Ok(b),
        Toggle::Text(s) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(true),
            "no" | "false" | "off" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid stdout toggle: {other}"))),
        },
    }
}

/// Load and parse a JSON options file.
pub fn load_options(path: &std::path::Path) -> anyhow::Result<LogOptions> {
    let content = std::fs::read_to_string(path)?;
    let options: LogOptions = serde_json::from_str(&content)?;
    options.validate()?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let opts: LogOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, LogOptions::default());
        assert_eq!(opts.effective_log_name(), "mantis");
        assert_eq!(opts.buffer.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn stdout_accepts_yes_and_bool() {
        let a: LogOptions = serde_json::from_str(r#"{"stdout": "yes"}"#).unwrap();
        let b: LogOptions = serde_json::from_str(r#"{"stdout": true}"#).unwrap();
        let c: LogOptions = serde_json::from_str(r#"{"stdout": "no"}"#).unwrap();
        assert!(a.stdout);
        assert!(b.stdout);
        assert!(!c.stdout);
        assert!(serde_json::from_str::<LogOptions>(r#"{"stdout": "maybe"}"#).is_err());
    }

    #[test]
    fn full_config_parses() {
        let json = r#"{
            "project_name": "gw",
            "log_path": "/tmp/gw",
            "log_name": "gateway",
            "log_level": "warn",
            "rotation": "daily",
            "sink": "direct",
            "buffer": { "queue_capacity": 16, "tick_interval_ms": 50 }
        }"#;
        let opts: LogOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.effective_log_name(), "gateway");
        assert_eq!(opts.rotation, RotationPolicy::Daily);
        assert_eq!(opts.sink, SinkMode::Direct);
        assert_eq!(opts.buffer.queue_capacity, 16);
        assert_eq!(opts.buffer.flush_threshold, DEFAULT_FLUSH_THRESHOLD);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let opts = LogOptions::default()
            .with_project_name("zap")
            .with_log_path("tmp/log")
            .with_log_level("info")
            .with_stdout(true);
        assert_eq!(opts.project_name, "zap");
        assert_eq!(opts.log_path, PathBuf::from("tmp/log"));
        assert!(opts.stdout);
        assert_eq!(opts.effective_log_name(), "zap");
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let opts = LogOptions::default()
            .with_buffer(BufferConfig { queue_capacity: 0, ..BufferConfig::default() });
        assert_eq!(opts.validate(), Err(ConfigError::ZeroQueueCapacity));
        assert_eq!(LogOptions::default().with_project_name(" ").validate(), Err(ConfigError::EmptyProjectName));
        let no_tick = LogOptions::default()
            .with_buffer(BufferConfig { tick_interval_ms: 0, ..BufferConfig::default() });
        assert_eq!(no_tick.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn load_options_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, r#"{"project_name": "svc", "max_backups": 3}"#).unwrap();
        let opts = load_options(&path).unwrap();
        assert_eq!(opts.project_name, "svc");
        assert_eq!(opts.max_backups, 3);

        std::fs::write(&path, r#"{"log_path": ""}"#).unwrap();
        let err = load_options(&path).unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::EmptyLogPath));
    }
}
