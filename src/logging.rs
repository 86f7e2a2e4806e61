//! Minimal `log` backend writing to stderr.
//!
//! Lines look like `DEBUG [sched_sim::core::driver] message`. The level comes
//! from the caller, or from the `LOG` environment variable when the caller
//! passes `None`.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31,
            Level::Warn => 93,
            Level::Info => 34,
            Level::Debug => 32,
            Level::Trace => 90,
        };
        let _ = writeln!(
            std::io::stderr().lock(),
            "\u{1B}[{}m{:>5} [{}] {}\u{1B}[0m",
            color,
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// Parses `error|warn|info|debug|trace|off`, case-insensitively.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Installs the logger. A second call only adjusts the level.
pub fn init(level: Option<LevelFilter>) {
    let level = level
        .or_else(|| std::env::var("LOG").ok().as_deref().and_then(parse_level))
        .unwrap_or(LevelFilter::Warn);
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
