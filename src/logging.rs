//! Stdout logger behind the `log` facade.
//!
//! Lines carry process uptime and the emitting module, which is enough to
//! correlate the per-connection and per-game log streams without an
//! external subscriber:
//!
//! ```text
//!    12.041 INFO  flotilla::service matched alice vs bob into game game-x1
//! ```

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{self, LevelFilter, Metadata, Record};

static STARTED: OnceLock<Instant> = OnceLock::new();

struct UptimeLogger;

impl log::Log for UptimeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let uptime = STARTED.get_or_init(Instant::now).elapsed();
        println!(
            "{:>6}.{:03} {:<5} {} {}",
            uptime.as_secs(),
            uptime.subsec_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: UptimeLogger = UptimeLogger;

/// Initialize logging with a level taken from the `FLOTILLA_LOG` environment
/// variable. Defaults to `info` if the variable is not set or invalid.
pub fn init_logging() {
    init_logging_at(level_from_env());
}

/// Initialize logging at an explicit level, overriding `FLOTILLA_LOG`. The
/// server CLI routes its `--log-level` flag here.
pub fn init_logging_at(level: LevelFilter) {
    STARTED.get_or_init(Instant::now);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}

fn level_from_env() -> LevelFilter {
    env::var("FLOTILLA_LOG")
        .ok()
        .and_then(|lvl| LevelFilter::from_str(&lvl).ok())
        .unwrap_or(LevelFilter::Info)
}
