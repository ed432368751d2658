use std::io::Write as _;

use colored::Colorize;
use drill_core::style::ColorTheme;
use env_logger::Env;

/// Logs to stderr as `[LEVEL] message`. `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let level = record.level();
            writeln!(
                buf,
                "[{}] {}",
                level.as_str().color(level.color()).bold(),
                record.args()
            )
        })
        .init();
}
