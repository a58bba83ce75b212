//! Leveled, timestamped console logging on top of the formatter.
//!
//! Every call produces exactly one line:
//!
//! ```text
//! <color>[<LABEL><YYYY-MM-DD HH:MM:SS>]<reset>\t<message>\n
//! ```
//!
//! The line is assembled in a per-thread buffer and handed to a
//! [`LineHandler`] in one piece, so a handler that writes it with a single
//! call never interleaves it with lines from other threads.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{ColorMode, LoggerConfig, ThresholdMode};
use crate::error::LogError;
use crate::fmt_arg::FmtArg;
use crate::formatter::render;
use crate::level::Level;
use crate::timestamp_cache::{append_cached_timestamp, Clock, SystemClock, TimeZone};

/// Escape that ends the colored tag.
pub const RESET: &str = "\x1b[0m";

/// Largest line buffer a thread keeps around between calls.
const MAX_RETAINED_LINE: usize = 64 * 1024;

/// Destination of finished log lines.
///
/// Implementations decide where lines go: a terminal, a file, memory. They
/// receive complete lines, newline included, and should write each one with
/// a single call to keep lines from different threads apart.
///
/// # Usage
///
/// ```
/// # use fmtlog::LineHandler;
/// # use std::io;
/// # use std::sync::atomic::{AtomicUsize, Ordering};
/// // Counts lines instead of printing them
/// struct CountingHandler(AtomicUsize);
///
/// impl LineHandler for CountingHandler {
///     fn handle_line(&self, _line: &[u8]) -> io::Result<()> {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     }
/// }
/// ```
pub trait LineHandler: Send + Sync {
    /// Writes one complete line.
    fn handle_line(&self, line: &[u8]) -> io::Result<()>;

    /// Whether the destination is an interactive terminal, for
    /// [`ColorMode::Detect`].
    fn is_terminal(&self) -> bool {
        false
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes lines to the process's standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutHandler;

impl LineHandler for StdoutHandler {
    fn handle_line(&self, line: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(line)
    }

    fn is_terminal(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// Writes lines to any `Write` implementation behind a lock.
///
/// ```
/// # use fmtlog::{Logger, LoggerConfig, WriterHandler};
/// let file = tempfile::tempfile().unwrap();
/// let logger = Logger::with_handler(LoggerConfig::default(), WriterHandler::new(file));
/// logger.info("written to a file").unwrap();
/// ```
#[derive(Debug)]
pub struct WriterHandler<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LineHandler for WriterHandler<W> {
    fn handle_line(&self, line: &[u8]) -> io::Result<()> {
        self.writer.lock().write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

/// Keeps lines in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandler {
    data: Arc<Mutex<Vec<u8>>>,
}

impl MemoryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.lock()).into_owned()
    }

    /// Written lines without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.data.lock().clear();
    }
}

impl LineHandler for MemoryHandler {
    fn handle_line(&self, line: &[u8]) -> io::Result<()> {
        self.data.lock().extend_from_slice(line);
        Ok(())
    }
}

thread_local! {
    static LINE_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Runs `f` with this thread's line buffer, emptied.
///
/// The buffer is moved out while `f` runs, so a handler that logs again from
/// inside `handle_line` gets a fresh buffer instead of a borrow conflict.
fn with_line_buffer<R>(f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
    let mut line = LINE_BUFFER.try_with(RefCell::take).unwrap_or_default();
    line.clear();
    let result = f(&mut line);
    if line.capacity() <= MAX_RETAINED_LINE {
        let _ = LINE_BUFFER.try_with(|cell| cell.replace(line));
    }
    result
}

/// A console logger.
///
/// Holds its own threshold, color and time settings; nothing is global.
/// Share one instance by reference (or install it with
/// [`global::install`](crate::global::install)) rather than creating one per
/// call site.
///
/// # Thread Safety
///
/// `Logger` is `Send + Sync`. The threshold is an atomic that any thread may
/// change at any time; concurrent changes resolve to whichever store lands
/// last. Per-line atomicity is provided by the handler.
///
/// # Examples
///
/// ```
/// # use fmtlog::{ColorMode, Level, Logger, LoggerConfig, MemoryHandler};
/// let lines = MemoryHandler::new();
/// let logger = Logger::with_handler(
///     LoggerConfig::default().with_color(ColorMode::Never),
///     lines.clone(),
/// );
///
/// logger.info("service started").unwrap();
/// logger.set_threshold(Level::Warn);
/// logger.log("untyped message").unwrap();
///
/// let out = lines.lines();
/// assert!(out[0].starts_with("[INFO ") && out[0].ends_with("]\tservice started"));
/// assert!(out[1].starts_with("[WARN "));
/// ```
pub struct Logger {
    threshold: AtomicU8,
    threshold_mode: ThresholdMode,
    time_zone: TimeZone,
    colorize: bool,
    handler: Box<dyn LineHandler>,
    clock: Box<dyn Clock>,
}

impl Logger {
    /// Creates a logger that writes to standard output.
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_handler(config, StdoutHandler)
    }

    pub fn with_handler(config: LoggerConfig, handler: impl LineHandler + 'static) -> Self {
        Self::with_parts(config, handler, SystemClock)
    }

    /// Creates a logger with an explicit handler and clock.
    ///
    /// [`ColorMode::Detect`] is resolved here, once, against the handler.
    pub fn with_parts(config: LoggerConfig, handler: impl LineHandler + 'static, clock: impl Clock + 'static) -> Self {
        let colorize = match config.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Detect => handler.is_terminal(),
        };
        Self {
            threshold: AtomicU8::new(config.threshold as u8),
            threshold_mode: config.threshold_mode,
            time_zone: config.time_zone,
            colorize,
            handler: Box::new(handler),
            clock: Box::new(clock),
        }
    }

    /// Current threshold. Read fresh on every call.
    pub fn threshold(&self) -> Level {
        Level::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    pub fn set_threshold(&self, level: Level) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }

    pub fn threshold_mode(&self) -> ThresholdMode {
        self.threshold_mode
    }

    /// Whether lines carry color escapes.
    pub fn colorized(&self) -> bool {
        self.colorize
    }

    /// Whether a line at `level` would be written.
    ///
    /// Always true unless the logger filters by threshold.
    pub fn enabled(&self, level: Level) -> bool {
        match self.threshold_mode {
            ThresholdMode::TagOnly => true,
            ThresholdMode::Filter => level >= self.threshold(),
        }
    }

    pub fn debug(&self, msg: &str) -> io::Result<()> {
        self.write(Level::Debug, msg)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.write(Level::Info, msg)
    }

    pub fn warn(&self, msg: &str) -> io::Result<()> {
        self.write(Level::Warn, msg)
    }

    pub fn error(&self, msg: &str) -> io::Result<()> {
        self.write(Level::Error, msg)
    }

    /// Logs `msg` tagged with the current threshold.
    pub fn log(&self, msg: &str) -> io::Result<()> {
        self.write(self.threshold(), msg)
    }

    /// Logs `msg` at `level`.
    ///
    /// # Errors
    ///
    /// Returns the handler's I/O error, if any. Lines dropped by the
    /// threshold filter are not an error.
    pub fn write(&self, level: Level, msg: &str) -> io::Result<()> {
        self.emit(level, |line| line.extend_from_slice(msg.as_bytes()))
    }

    /// Logs preformatted Rust arguments at `level`.
    pub fn write_args(&self, level: Level, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.emit(level, |line| {
            // Writing into a Vec cannot fail.
            let _ = line.write_fmt(args);
        })
    }

    pub fn flush(&self) -> io::Result<()> {
        self.handler.flush()
    }

    fn emit(&self, level: Level, body: impl FnOnce(&mut Vec<u8>)) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let secs = self.clock.now_secs();
        with_line_buffer(|line| {
            self.compose(line, level, secs, body);
            self.handler.handle_line(line)
        })
    }

    fn compose(&self, line: &mut Vec<u8>, level: Level, secs: i64, body: impl FnOnce(&mut Vec<u8>)) {
        if self.colorize {
            line.extend_from_slice(level.color().as_bytes());
        }
        line.push(b'[');
        line.extend_from_slice(level.label().as_bytes());
        append_cached_timestamp(line, secs, self.time_zone);
        line.push(b']');
        if self.colorize {
            line.extend_from_slice(RESET.as_bytes());
        }
        line.push(b'\t');
        body(line);
        line.push(b'\n');
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold())
            .field("threshold_mode", &self.threshold_mode)
            .field("time_zone", &self.time_zone)
            .field("colorize", &self.colorize)
            .finish_non_exhaustive()
    }
}

/// Renders a template and logs it; the target of the logging macros.
///
/// `None` tags the line with the logger's threshold. Rendering is skipped
/// entirely for lines the logger would drop.
#[doc(hidden)]
pub fn render_and_write(logger: &Logger, level: Option<Level>, template: &str, args: &[FmtArg<'_>]) -> Result<(), LogError> {
    let level = level.unwrap_or_else(|| logger.threshold());
    if !logger.enabled(level) {
        return Ok(());
    }
    let message = render(template, args)?;
    logger.write(level, &message)?;
    Ok(())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_render {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::__check_template!($fmt, $($arg),*);
        $crate::console_logger::render_and_write(
            &$logger,
            $level,
            $fmt,
            &[$($crate::AsFmtArg::as_fmt_arg(&$arg)),*],
        )
    }};
    ($logger:expr, $level:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::console_logger::render_and_write(
            &$logger,
            $level,
            $fmt,
            &[$($crate::AsFmtArg::as_fmt_arg(&$arg)),*],
        )
    };
}

/// Logs a printf-style message at the given level.
///
/// Returns `Result<(), LogError>`: a template that fails to render produces
/// no output and comes back as [`LogError::Format`](crate::LogError::Format).
///
/// ```
/// # use fmtlog::{log_at, Level, Logger, LoggerConfig, MemoryHandler};
/// let lines = MemoryHandler::new();
/// let logger = Logger::with_handler(LoggerConfig::default(), lines.clone());
/// log_at!(logger, Level::Warn, "disk %s at %d%%", "sda", 93).unwrap();
/// assert!(lines.contents().ends_with("\tdisk sda at 93%\n"));
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($rest:tt)+) => {
        $crate::__log_render!($logger, ::core::option::Option::Some($level), $($rest)+)
    };
}

/// Logs a printf-style message at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Debug, $($rest)+)
    };
}

/// Logs a printf-style message at [`Level::Info`](crate::Level::Info).
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Info, $($rest)+)
    };
}

/// Logs a printf-style message at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Warn, $($rest)+)
    };
}

/// Logs a printf-style message at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Error, $($rest)+)
    };
}

/// Logs a printf-style message tagged with the logger's current threshold.
#[macro_export]
macro_rules! log_default {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__log_render!($logger, ::core::option::Option::None, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp_cache::ManualClock;

    fn utc_logger(config: LoggerConfig) -> (Logger, MemoryHandler) {
        let lines = MemoryHandler::new();
        let logger = Logger::with_parts(
            config.with_time_zone(TimeZone::Utc),
            lines.clone(),
            ManualClock::new(1_700_000_000),
        );
        (logger, lines)
    }

    #[test]
    fn test_colored_line_layout() {
        let (logger, lines) = utc_logger(LoggerConfig::default());
        logger.info("hello").unwrap();
        assert_eq!(
            lines.contents(),
            "\x1b[36m[INFO 2023-11-14 22:13:20]\x1b[0m\thello\n"
        );
    }

    #[test]
    fn test_debug_has_no_color_but_resets() {
        let (logger, lines) = utc_logger(LoggerConfig::default());
        logger.debug("quiet").unwrap();
        assert_eq!(lines.contents(), "[DBG  2023-11-14 22:13:20]\x1b[0m\tquiet\n");
    }

    #[test]
    fn test_plain_line_layout() {
        let (logger, lines) = utc_logger(LoggerConfig::default().with_color(ColorMode::Never));
        logger.error("boom").unwrap();
        assert_eq!(lines.contents(), "[ERR  2023-11-14 22:13:20]\tboom\n");
    }

    #[test]
    fn test_detect_uses_handler() {
        let (logger, _) = utc_logger(LoggerConfig::default().with_color(ColorMode::Detect));
        assert!(!logger.colorized());
    }

    #[test]
    fn test_line_buffer_is_reused() {
        with_line_buffer(|line| line.extend_from_slice(&[b'x'; 100]));
        let capacity = LINE_BUFFER.with(|cell| cell.borrow().capacity());
        assert!(capacity >= 100);
        with_line_buffer(|line| assert!(line.is_empty()));
    }

    #[test]
    fn test_render_and_write_skips_filtered_render() {
        let (logger, lines) = utc_logger(
            LoggerConfig::default()
                .with_threshold(Level::Error)
                .with_threshold_mode(ThresholdMode::Filter),
        );
        // A broken template is never rendered when the line is filtered out.
        render_and_write(&logger, Some(Level::Info), "%d", &[]).unwrap();
        assert!(lines.contents().is_empty());
    }
}
