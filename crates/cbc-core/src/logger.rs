//! Logging hook passed into the pipeline.
//!
//! The converter never logs through a global directly; callers choose a
//! sink. Tests use [`NoopLogger`] or [`MemoryLogger`], the CLI uses [`LogFacade`].

use std::cell::RefCell;

use log::Level;

/// Sink for conversion diagnostics.
pub trait ConversionLogger {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl ConversionLogger for NoopLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Forwards to the `log` crate under the `cbc` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl ConversionLogger for LogFacade {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "cbc", level, "{message}");
    }
}

/// Keeps every message in memory, for callers that surface diagnostics
/// after the conversion returns.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: RefCell<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl ConversionLogger for MemoryLogger {
    fn log(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}
