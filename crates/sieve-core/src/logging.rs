//! Logging setup with indicatif integration
//!
//! Worker threads are named (`score-worker-N`), and their lines carry that
//! name so interleaved output stays attributable.

use indicatif::MultiProgress;

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn level_ansi(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    }
}

/// Render one log line as `[LEVEL] thread: message`.
///
/// Both the TTY bridge and the plain `env_logger` path go through here. The
/// main thread stays anonymous; scoring workers show their name.
fn format_line(record: &log::Record, color: bool) -> String {
    let label = level_label(record.level());
    let level = if color {
        format!("{}{label}\x1b[0m", level_ansi(record.level()))
    } else {
        label.to_string()
    };
    match std::thread::current().name() {
        Some(name) if name != "main" => format!("[{level}] {name}: {}", record.args()),
        _ => format!("[{level}] {}", record.args()),
    }
}

/// `log` backend for TTY runs: filters with `env_logger`, formats with
/// [`format_line`] and prints above the progress bars.
pub struct IndicatifLogger {
    filter: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(filter: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { filter, multi }
    }

    fn render(&self, record: &log::Record) -> Option<String> {
        self.filter
            .matches(record)
            .then(|| format_line(record, true))
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if let Some(line) = self.render(record) {
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {}
}

/// Initialize logging; `multi` selects the TTY path with progress bars.
///
/// `RUST_LOG` overrides the level picked from `quiet`/`debug`.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env = env_logger::Env::default().default_filter_or(default_level);

    if let Some(multi) = multi {
        let logger = env_logger::Builder::from_env(env).build();
        let max_level = logger.filter();

        if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok() {
            log::set_max_level(max_level);
        }
    } else {
        // Non-TTY: no ANSI colors
        let _ = env_logger::Builder::from_env(env)
            .format(|buf, record| writeln!(buf, "{}", format_line(record, false)))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test threads are named after the test; render from an unnamed one.
    fn unnamed<T: Send>(f: impl FnOnce() -> T + Send) -> T {
        std::thread::scope(|s| s.spawn(f).join().unwrap())
    }

    fn record_line(level: log::Level, color: bool) -> String {
        unnamed(|| {
            format_line(
                &log::Record::builder()
                    .args(format_args!("batch done"))
                    .level(level)
                    .build(),
                color,
            )
        })
    }

    #[test]
    fn plain_line_has_no_ansi() {
        assert_eq!(record_line(log::Level::Warn, false), "[WARN ] batch done");
    }

    #[test]
    fn color_line_resets_after_label() {
        assert_eq!(
            record_line(log::Level::Error, true),
            "[\x1b[31mERROR\x1b[0m] batch done"
        );
    }

    #[test]
    fn tty_logger_renders_through_format_line() {
        let filter = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .build();
        let logger = IndicatifLogger::new(filter, MultiProgress::new());
        let render = |level| {
            unnamed(|| {
                logger.render(
                    &log::Record::builder()
                        .args(format_args!("batch done"))
                        .level(level)
                        .build(),
                )
            })
        };
        assert_eq!(
            render(log::Level::Info).as_deref(),
            Some("[\x1b[32mINFO \x1b[0m] batch done")
        );
        assert!(render(log::Level::Debug).is_none());
    }

    #[test]
    fn format_line_includes_worker_name() {
        let line = std::thread::Builder::new()
            .name("score-worker-3".into())
            .spawn(|| {
                format_line(
                    &log::Record::builder()
                        .args(format_args!("Acme -> 21"))
                        .level(log::Level::Debug)
                        .build(),
                    false,
                )
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(line, "[DEBUG] score-worker-3: Acme -> 21");
    }

    #[test]
    fn init_logging_twice_does_not_panic() {
        init_logging(true, false, None);
        init_logging(false, true, None);
    }
}
