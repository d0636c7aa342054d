//! # Logging
//!
//! A minimal `log::Log` implementation writing to port 0, installed
//! once from `kernel::init_kernel`. Grounded on `valibali-cluu`'s
//! `utils/debug/logger.rs`, which installs a similar UART-backed
//! logger via `log::set_logger`/`log::set_max_level`.
//!
//! The kernel logs state transitions worth a post-mortem look (task
//! creation, task exit, a semaphore wait-queue underflow guard firing)
//! at `Debug`/`Trace`. It never logs from `yield`, `P`, or `V` on the
//! hot path — doing so would perturb the cycle budget the cooperative
//! model depends on.

use core::fmt::Write;
use log::{Level, LevelFilter, Metadata, Record};

use crate::platform;
use crate::sync;

/// Writes formatted log records byte-by-byte to serial port 0.
struct UartLogger;

static LOGGER: UartLogger = UartLogger;

impl log::Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut out = PortWriter(0);
        let _ = writeln!(out, "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Adapts `platform::outbyte` to `core::fmt::Write` so `write!`/`writeln!`
/// can target a serial port directly.
struct PortWriter(usize);

impl Write for PortWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.as_bytes() {
            platform::outbyte(self.0, *byte);
        }
        Ok(())
    }
}

/// Install the logger and set the max level. Called exactly once from
/// `kernel::init_kernel`. A second call is a configuration error; per
/// `log`'s own API this returns `Err` rather than panicking, and the
/// kernel does not depend on a working logger to run, so the caller
/// only logs the failure through the already-installed logger (or
/// drops it, if this actually is the first call and something else
/// raced to install a logger first).
///
/// Wrapped in `sync::critical_section` because `log::set_logger` is a
/// one-time global install; it must not race an interrupt handler that
/// might itself try to log before this completes.
pub fn init(level: LevelFilter) {
    sync::critical_section(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    });
}
