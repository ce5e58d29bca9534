//! # Blocking boot console logger
//!
//! Forwards [log] records to a single [core::fmt::Write] sink, usually a polled UART which is
//! available before the DRAM. Every write happens inside a critical section, so a
//! [critical_section] implementation must be provided by the application.
//!
//! Enable the `spl` feature to compile all log output out of size-constrained builds.
use core::cell::RefCell;
use core::fmt::Write;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use log::{LevelFilter, Log, set_logger, set_max_level};

static LOGGER_INIT_DONE: AtomicBool = AtomicBool::new(false);

/// Output sink of the logger.
pub type Sink = &'static mut (dyn Write + Send);

pub struct BootConsoleLogger(Mutex<RefCell<Option<Sink>>>);

static BOOT_CONSOLE_LOGGER: BootConsoleLogger = BootConsoleLogger(Mutex::new(RefCell::new(None)));

/// Install the boot console logger. Subsequent calls are ignored.
pub fn init(sink: Sink, level: LevelFilter) {
    if LOGGER_INIT_DONE.swap(true, Ordering::Relaxed) {
        return;
    }
    critical_section::with(|cs| {
        BOOT_CONSOLE_LOGGER.0.borrow(cs).replace(Some(sink));
    });
    // Another logger was installed by the application.
    if set_logger(&BOOT_CONSOLE_LOGGER).is_err() {
        return;
    }
    set_max_level(level);
}

impl Log for BootConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        critical_section::with(|cs| {
            let mut sink = self.0.borrow(cs).borrow_mut();
            if let Some(sink) = sink.as_mut() {
                // Nothing sensible can be done if the console fails.
                let _ = write!(sink, "{} - {}\r\n", record.level(), record.args());
            }
        })
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_cell::StaticCell;

    static CAPTURED: Mutex<RefCell<([u8; 8192], usize)>> =
        Mutex::new(RefCell::new(([0; 8192], 0)));

    struct CaptureSink;

    impl Write for CaptureSink {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            critical_section::with(|cs| {
                let mut captured = CAPTURED.borrow(cs).borrow_mut();
                let (buf, len) = &mut *captured;
                let count = s.len().min(buf.len() - *len);
                buf[*len..*len + count].copy_from_slice(&s.as_bytes()[..count]);
                *len += count;
            });
            Ok(())
        }
    }

    static SINK: StaticCell<CaptureSink> = StaticCell::new();

    #[test]
    fn test_records_reach_sink() {
        init(SINK.init(CaptureSink), LevelFilter::Info);
        log::info!("boot console test {}", 42);
        critical_section::with(|cs| {
            let captured = CAPTURED.borrow(cs).borrow();
            let text = core::str::from_utf8(&captured.0[..captured.1]).unwrap();
            assert!(text.contains("INFO - boot console test 42\r\n"));
        });
    }
}
