//! Lets a [`Logger`] serve as the backend of the `log` facade.
//!
//! `log::trace!` records are reported at [`Level::Debug`]. Only the record's
//! message is written; target and module path are not part of the line.

use crate::console_logger::Logger;
use crate::level::Level;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        Logger::enabled(self, Level::from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = Level::from(record.level());
        if !Logger::enabled(self, level) {
            return;
        }
        // `log::Log` has no error channel.
        if let Err(e) = self.write_args(level, *record.args()) {
            tracing::debug!(error = %e, target = record.target(), "dropped log record");
        }
    }

    fn flush(&self) {
        if let Err(e) = Logger::flush(self) {
            tracing::debug!(error = %e, "failed to flush log handler");
        }
    }
}
