//! # Semihosting Logger
//!
//! Routes the `log` facade to the debugger console over ARM semihosting.
//! Every record is a blocking round-trip through the debugger, so the
//! scheduler only logs during bring-up, never from the tick handler.

use core::fmt::Write;

use cortex_m_semihosting::hio;
use log::{LevelFilter, Log, Metadata, Record};

struct SemihostingLogger;

static LOGGER: SemihostingLogger = SemihostingLogger;

impl Log for SemihostingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut stdout) = hio::hstdout() {
            let _ = writeln!(stdout, "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the semihosting logger. A second call is ignored.
///
/// Armv6-M has no compare-and-swap, so this uses the racy setters of `log`.
///
/// # Safety
/// Call from `main` before the scheduler starts, while nothing else can log.
pub unsafe fn init(level: LevelFilter) {
    if log::set_logger_racy(&LOGGER).is_ok() {
        log::set_max_level_racy(level);
    }
}
