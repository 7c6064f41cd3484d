//! # mantis-runner
//!
//! Small driver for the logging facade: builds a logger from a JSON options
//! file and/or command-line overrides, emits a traced startup record and then
//! one heartbeat record per interval until `--count` is reached or Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! mantis-runner --project zap --log-path tmp/log --log-level info --stdout \
//!     --trace-id 46b1506e7332f7c1:7f75737aa70629cc:3bb947500f42ad71:1
//! ```

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use mantis_core::config::load_options;
use mantis_log::{LogOptions, Logger, SinkMode, TraceId};

/// Mantis logging facade runner.
#[derive(Parser)]
#[command(name = "mantis-runner", about = "Mantis logging facade runner")]
struct Cli {
    /// Options file path (JSON). Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the rotating log files.
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Log level (debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Project name attached to every record.
    #[arg(short, long)]
    project: Option<String>,

    /// Mirror records to stdout. `--stdout false` overrides a config file
    /// that turns it on.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    stdout: Option<bool>,

    /// Sink variant in front of the rotating file.
    #[arg(long, value_enum)]
    sink: Option<SinkArg>,

    /// Trace identifier carried by every record.
    #[arg(long, default_value = "46b1506e7332f7c1:7f75737aa70629cc:3bb947500f42ad71:1")]
    trace_id: String,

    /// Number of heartbeat records (0 = until Ctrl+C).
    #[arg(long, default_value_t = 300)]
    count: u64,

    /// Milliseconds between heartbeat records.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkArg {
    Buffered,
    Direct,
}

impl From<SinkArg> for SinkMode {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Buffered => SinkMode::Buffered,
            SinkArg::Direct => SinkMode::Direct,
        }
    }
}

impl Cli {
    fn options(&self) -> Result<LogOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)?,
            None => LogOptions::default(),
        };
        if let Some(path) = &self.log_path {
            options = options.with_log_path(path);
        }
        if let Some(level) = &self.log_level {
            options = options.with_log_level(level);
        }
        if let Some(project) = &self.project {
            options = options.with_project_name(project);
        }
        if let Some(stdout) = self.stdout {
            options = options.with_stdout(stdout);
        }
        if let Some(sink) = self.sink {
            options = options.with_sink(sink.into());
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Build the logger
    let options = cli.options()?;
    let logger = Logger::new(&options)?;
    let trace = TraceId::new(cli.trace_id.as_str());

    logger.info(
        Some(&trace),
        format_args!(
            "mantis-runner starting: project={}, log_path={}, level={}",
            options.project_name,
            options.log_path.display(),
            options.log_level,
        ),
    );

    // 2. Heartbeats until done or interrupted
    let mut ticker = tokio::time::interval(Duration::from_millis(cli.interval_ms.max(1)));
    let mut emitted = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                emitted += 1;
                logger.info(Some(&trace), format_args!("heartbeat {emitted}"));
                if cli.count > 0 && emitted >= cli.count {
                    break;
                }
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    logger.error(Some(&trace), format_args!("ctrl-c handler failed: {e}"));
                }
                logger.warn(Some(&trace), "shutdown signal received");
                break;
            }
        }
    }

    // 3. Final flush
    let stats = logger.stats();
    tracing::dispatcher::with_default(logger.dispatch(), || {
        tracing::info!(
            project = logger.project(),
            trace_id = trace.as_str(),
            heartbeats = emitted,
            records = stats.records,
            flushes = stats.flushes,
            flush_failures = stats.flush_failures,
            "mantis-runner stopping"
        );
    });
    logger.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_stdout_on() -> (tempfile::TempDir, String) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.json");
        std::fs::write(&path, r#"{"stdout": true}"#).unwrap();
        let path = path.to_string_lossy().into_owned();
        (tmp, path)
    }

    #[test]
    fn stdout_flag_can_switch_config_value_off() {
        let (_tmp, path) = config_with_stdout_on();
        let cli = Cli::try_parse_from(["mantis-runner", "--config", path.as_str(), "--stdout", "false"]).unwrap();
        assert!(!cli.options().unwrap().stdout);
    }

    #[test]
    fn stdout_flag_alone_switches_it_on() {
        let cli = Cli::try_parse_from(["mantis-runner", "--stdout"]).unwrap();
        assert!(cli.options().unwrap().stdout);
    }

    #[test]
    fn missing_stdout_flag_keeps_config_value() {
        let (_tmp, path) = config_with_stdout_on();
        let cli = Cli::try_parse_from(["mantis-runner", "--config", path.as_str()]).unwrap();
        assert!(cli.options().unwrap().stdout);

        let cli = Cli::try_parse_from(["mantis-runner"]).unwrap();
        assert!(!cli.options().unwrap().stdout);
    }
}
