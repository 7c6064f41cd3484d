//! Level names accepted in configuration.

use tracing::Level;

/// Parse a configured level name, case-insensitively.
///
/// `tracing` has nothing above ERROR, so `panic`, `dpanic` and `fatal` map to
/// ERROR. Unknown names fall back to DEBUG so a typo never hides records.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "panic" | "dpanic" | "fatal" | "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "info" => Level::INFO,
        "trace" => Level::TRACE,
        _ => Level::DEBUG,
    }
}

/// True when `level` is at least as severe as `threshold`.
///
/// `tracing` orders levels by verbosity (ERROR is the smallest).
#[inline]
pub(crate) fn at_least(level: Level, threshold: Level) -> bool {
    level <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!(parse_level("fatal"), Level::ERROR);
        assert_eq!(parse_level("DPanic"), Level::ERROR);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("Warning"), Level::WARN);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level(" info "), Level::INFO);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("trace"), Level::TRACE);
    }

    #[test]
    fn unknown_falls_back_to_debug() {
        assert_eq!(parse_level("verbose"), Level::DEBUG);
        assert_eq!(parse_level(""), Level::DEBUG);
    }

    #[test]
    fn severity_comparison() {
        assert!(at_least(Level::ERROR, Level::ERROR));
        assert!(at_least(Level::ERROR, Level::WARN));
        assert!(!at_least(Level::WARN, Level::ERROR));
        assert!(!at_least(Level::DEBUG, Level::INFO));
    }
}
