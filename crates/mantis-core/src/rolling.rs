//! Rotating log file.
//!
//! Thin adapter over the file-rotation engines: `rolling-file` for size-based
//! rolling and `tracing-appender` for time-based rolling. The adapter only
//! adds retention by age, which neither engine provides. Everything here runs
//! on whichever thread owns the [`RollingFile`], which for the buffered sink
//! is its background worker.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant, SystemTime},
};

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::config::{LogOptions, RotationPolicy};

const PRUNE_INTERVAL: Duration = Duration::from_secs(3600);
const SECS_PER_DAY: u64 = 86_400;

/// Where and how a [`RollingFile`] writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingFileConfig {
    pub dir: PathBuf,
    pub name: String,
    pub max_size_mb: u64,
    pub max_age_days: u64,
    pub max_backups: usize,
    pub rotation: RotationPolicy,
}

impl From<&LogOptions> for RollingFileConfig {
    fn from(opts: &LogOptions) -> Self {
        Self {
            dir: opts.log_path.clone(),
            name: opts.effective_log_name().to_string(),
            max_size_mb: opts.max_size_mb,
            max_age_days: opts.max_age_days,
            max_backups: opts.max_backups,
            rotation: opts.rotation,
        }
    }
}

impl RollingFileConfig {
    /// Path of the active file under size rotation (`<dir>/<name>.log`).
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.name))
    }

    fn max_age(&self) -> Option<Duration> {
        (self.max_age_days > 0).then(|| Duration::from_secs(self.max_age_days * SECS_PER_DAY))
    }
}

/// A log file that rolls over by size or time and expires old backups.
pub struct RollingFile {
    inner: Box<dyn Write + Send>,
    config: RollingFileConfig,
    last_prune: Instant,
}

impl RollingFile {
    /// Create the log directory if needed and open the active file.
    pub fn open(config: RollingFileConfig) -> io::Result<Self> {
        fs::create_dir_all(&config.dir)?;

        // At least one backup, otherwise every rollover would discard the file.
        let backups = config.max_backups.max(1);
        let inner: Box<dyn Write + Send> = match config.rotation {
            RotationPolicy::Size => {
                let mut condition = RollingConditionBasic::new();
                if config.max_size_mb > 0 {
                    condition = condition.max_size(config.max_size_mb * 1024 * 1024);
                }
                Box::new(BasicRollingFileAppender::new(config.active_path(), condition, backups)?)
            }
            RotationPolicy::Daily | RotationPolicy::Hourly => {
                let rotation =
                    if config.rotation == RotationPolicy::Daily { Rotation::DAILY } else { Rotation::HOURLY };
                let appender = RollingFileAppender::builder()
                    .rotation(rotation)
                    .filename_prefix(&config.name)
                    .filename_suffix("log")
                    .max_log_files(backups + 1)
                    .build(&config.dir)
                    .map_err(io::Error::other)?;
                Box::new(appender)
            }
        };

        let file = Self { inner, config, last_prune: Instant::now() };
        file.prune_expired();
        Ok(file)
    }

    pub fn config(&self) -> &RollingFileConfig {
        &self.config
    }

    /// Remove rotated files of this log older than `max_age_days`.
    ///
    /// Best effort: unreadable entries are skipped. Returns the number of
    /// files removed.
    pub fn prune_expired(&self) -> usize {
        let Some(max_age) = self.config.max_age() else {
            return 0;
        };
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return 0;
        };
        let Ok(entries) = fs::read_dir(&self.config.dir) else {
            return 0;
        };

        let active = self.config.active_path();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path == active || !path.is_file() || !self.owns(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let expired = entry.metadata().and_then(|m| m.modified()).map(|t| t < cutoff).unwrap_or(false);
            if expired && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Whether `file_name` is one of the files this log rolls into.
    ///
    /// Size rolling produces `<name>.log.<n>`. Time rolling produces
    /// `<name>.<date>.log` with a date such as `2026-10-18` or `2026-10-18-13`.
    /// Files of other logs sharing the directory, e.g. `<name>.worker.log`,
    /// never match.
    fn owns(&self, file_name: &str) -> bool {
        let Some(rest) = file_name.strip_prefix(self.config.name.as_str()).and_then(|r| r.strip_prefix('.')) else {
            return false;
        };
        match self.config.rotation {
            RotationPolicy::Size => rest
                .strip_prefix("log.")
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
            RotationPolicy::Daily | RotationPolicy::Hourly => rest.strip_suffix(".log").is_some_and(|date| {
                date.starts_with(|c: char| c.is_ascii_digit())
                    && date.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'_')
            }),
        }
    }

    fn maybe_prune(&mut self) {
        if self.last_prune.elapsed() >= PRUNE_INTERVAL {
            self.last_prune = Instant::now();
            self.prune_expired();
        }
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.maybe_prune();
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
