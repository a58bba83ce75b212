//! # fmtlog
//!
//! printf-style string formatting and a leveled console logger.
//!
//! ## Key Features
//!
//! * C `printf` templates (`%s`, `%d`, `%5.2f`, `%#x`, `%*d`, ...) rendered
//!   into a per-thread scratch buffer, with an exact-size heap fallback for
//!   long output
//! * Compile-time validation of literal templates and argument counts
//! * One colored, timestamped line per log call, written atomically
//! * Per-thread timestamp cache: the date is formatted at most once a second
//!
//! ## Main Components
//!
//! * [`render`], [`render_into`], [`measure`] and [`sprintf!`]: the formatter
//! * [`Logger`]: levels, threshold, color and the line layout
//! * [`LineHandler`]: where finished lines go (stdout, any writer, memory)
//! * [`global`]: optional process-wide instance wired to the `log` facade
//!
//! ## Quick Start
//!
//! ```
//! use fmtlog::{log_info, log_warn, sprintf, ColorMode, Logger, LoggerConfig, MemoryHandler};
//!
//! let text = sprintf!("%s has %d items", "cart", 3).unwrap();
//! assert_eq!(text, "cart has 3 items");
//!
//! let lines = MemoryHandler::new();
//! let logger = Logger::with_handler(LoggerConfig::default().with_color(ColorMode::Never), lines.clone());
//!
//! log_info!(logger, "listening on port %d", 8080).unwrap();
//! log_warn!(logger, "disk %s at %d%%", "sda", 93).unwrap();
//!
//! let out = lines.lines();
//! assert!(out[0].starts_with("[INFO ") && out[0].ends_with("\tlistening on port 8080"));
//! assert!(out[1].starts_with("[WARN ") && out[1].ends_with("\tdisk sda at 93%"));
//! ```

pub mod config;
pub mod console_logger;
pub mod error;
pub mod fmt_arg;
pub mod formatter;
pub mod global;
pub mod level;
mod log_bridge;
pub mod render;
pub mod template;
pub mod timestamp_cache;

pub use config::{ColorMode, LoggerConfig, ThresholdMode};
pub use console_logger::{LineHandler, Logger, MemoryHandler, StdoutHandler, WriterHandler};
pub use error::{FormatError, InstallError, LogError, ParseColorModeError, ParseLevelError};
pub use fmt_arg::{AsFmtArg, FmtArg};
pub use formatter::{measure, render, render_into, thread_heap_fallbacks, ScratchBuffer, SCRATCH_CAPACITY};
pub use level::Level;
pub use timestamp_cache::{Clock, ManualClock, SystemClock, TimeZone};
