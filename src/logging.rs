//! Logger setup for the command-line tool.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use crate::schema::Verbosity;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Log level for a verbosity setting.
pub fn level_for(verbosity: Verbosity) -> log::LevelFilter {
    match verbosity {
        Verbosity::Silent => log::LevelFilter::Warn,
        Verbosity::Quiet => log::LevelFilter::Info,
        Verbosity::Verbose => log::LevelFilter::Debug,
    }
}

/// Initialize the logger with elapsed-time formatting.
///
/// Output format: `[HH:MM:SS] LEVEL: message`, written to stderr.
/// `RUST_LOG` is applied on top of the level chosen by `verbosity`.
pub fn init_logger(verbosity: Verbosity) {
    START_TIME.set(Instant::now()).ok();

    env_logger::Builder::new()
        .filter_level(level_for(verbosity))
        .parse_default_env()
        .format(|buf, record| {
            let elapsed = START_TIME
                .get()
                .map(Instant::elapsed)
                .unwrap_or_default();
            let hours = elapsed.as_secs() / 3600;
            let minutes = (elapsed.as_secs() % 3600) / 60;
            let seconds = elapsed.as_secs() % 60;

            writeln!(
                buf,
                "[{:02}:{:02}:{:02}] {}: {}",
                hours,
                minutes,
                seconds,
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
