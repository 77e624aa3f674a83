//! Minimal stderr backend for the `log` facade.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_record(record));
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!(
        "[{} {}] {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Level used for a run: warnings by default, everything down to debug with `--debug`.
pub fn level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Install the stderr logger. Fails if a logger is already installed.
pub fn init(debug: bool) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level(debug));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn levels() {
        assert_eq!(level(false), LevelFilter::Warn);
        assert_eq!(level(true), LevelFilter::Debug);
    }

    #[test]
    fn record_format() {
        assert_eq!(
            format_record(
                &Record::builder()
                    .args(format_args!("divider 7 does not fit"))
                    .level(Level::Warn)
                    .target("korlessa::dsl::context")
                    .build()
            ),
            "[WARN korlessa::dsl::context] divider 7 does not fit"
        );
    }
}
