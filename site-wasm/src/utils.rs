use wasm_bindgen::JsValue;

use crate::constants::MAX_LOG_LEVEL;

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

/// Forwards `log` records from the geometry core to the console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&JsValue::from_str(&line)),
            log::Level::Warn => web_sys::console::warn_1(&JsValue::from_str(&line)),
            _ => log(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Installs the console logger. Safe to call more than once.
pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LOG_LEVEL);
    }
}
