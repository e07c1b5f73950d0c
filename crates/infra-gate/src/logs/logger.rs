//! Logger configuration and structured output formatting.
//!
//! Produces columned log lines with a local timestamp, a colored level
//! field, and the record target, keeping startup and request logs scannable
//! in a terminal while staying plain-text friendly for log shippers.

use chrono::Local;
use env_logger::Builder;
use log::Level;
use std::env;
use std::io::Write;

/// Visible width of the level column, so messages line up across levels.
const LEVEL_FIELD_WIDTH: usize = 5;

/// ANSI color for a level, matched to conventional severity colors.
fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m", // red
        Level::Warn => "\x1b[33m",  // yellow
        Level::Info => "\x1b[32m",  // green
        Level::Debug => "\x1b[36m", // cyan
        Level::Trace => "\x1b[35m", // magenta
    }
}

/// Installs the gate's logger on the `log` facade.
///
/// The filter defaults to `info` and is overridable through `RUST_LOG`.
/// Colors are suppressed when `NO_COLOR` is set or the variable convention
/// is otherwise requested by the environment.
///
/// Safe to call more than once; repeated initialization is ignored, which
/// keeps test binaries that share a process happy.
///
/// # Output Format
///
/// ```text
/// 2024-03-15 10:30:00.123 [INFO ] infra_gate::server: gate serving on 0.0.0.0:8080
/// ```
pub fn configure_logger() {
    let use_color = env::var_os("NO_COLOR").is_none();

    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(move |buf, record| {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let level = record.level();
        let padded = format!("{:<width$}", level.as_str(), width = LEVEL_FIELD_WIDTH);

        if use_color {
            writeln!(
                buf,
                "{timestamp} [{}{}\x1b[0m] {}: {}",
                level_color(level),
                padded,
                record.target(),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{timestamp} [{padded}] {}: {}",
                record.target(),
                record.args()
            )
        }
    });

    // try_init so a second call (tests, embedders) is a no-op instead of a
    // panic.
    let _ = builder.try_init();
}
