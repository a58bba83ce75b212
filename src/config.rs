use std::env;
use std::str::FromStr;

use crate::error::ParseColorModeError;
use crate::level::Level;
use crate::timestamp_cache::TimeZone;

pub const ENV_LEVEL: &str = "FMTLOG_LEVEL";
pub const ENV_COLOR: &str = "FMTLOG_COLOR";
pub const ENV_FILTER: &str = "FMTLOG_FILTER";
pub const ENV_TZ: &str = "FMTLOG_TZ";

/// When to wrap the level tag in ANSI color escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Always,
    Never,
    /// Color only when the handler writes to a terminal.
    Detect,
}

impl FromStr for ColorMode {
    type Err = ParseColorModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            "detect" | "auto" => Ok(ColorMode::Detect),
            _ => Err(ParseColorModeError(s.to_string())),
        }
    }
}

/// What the logger's threshold level does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// The threshold is only the level untyped `log` calls are tagged with.
    /// Every line is emitted.
    #[default]
    TagOnly,
    /// Additionally drop lines whose level is below the threshold.
    Filter,
}

/// Settings a [`Logger`](crate::Logger) is built from.
///
/// The defaults reproduce a plain console logger: threshold `Debug`, color
/// always on, no filtering, local time.
///
/// ```
/// # use fmtlog::{ColorMode, Level, LoggerConfig, ThresholdMode};
/// let config = LoggerConfig::default()
///     .with_threshold(Level::Info)
///     .with_color(ColorMode::Never)
///     .with_threshold_mode(ThresholdMode::Filter);
/// assert_eq!(config.threshold, Level::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggerConfig {
    pub threshold: Level,
    pub color: ColorMode,
    pub threshold_mode: ThresholdMode,
    pub time_zone: TimeZone,
}

impl LoggerConfig {
    pub fn with_threshold(mut self, threshold: Level) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.threshold_mode = mode;
        self
    }

    pub fn with_time_zone(mut self, zone: TimeZone) -> Self {
        self.time_zone = zone;
        self
    }

    /// Defaults overridden by `FMTLOG_LEVEL`, `FMTLOG_COLOR`, `FMTLOG_FILTER`
    /// and `FMTLOG_TZ`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// Unrecognized values are reported through `tracing` and leave the
    /// default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_LEVEL) {
            match raw.parse() {
                Ok(level) => config.threshold = level,
                Err(e) => tracing::warn!(variable = ENV_LEVEL, "ignoring setting: {e}"),
            }
        }
        if let Some(raw) = lookup(ENV_COLOR) {
            match raw.parse() {
                Ok(color) => config.color = color,
                Err(e) => tracing::warn!(variable = ENV_COLOR, "ignoring setting: {e}"),
            }
        }
        if let Some(raw) = lookup(ENV_FILTER) {
            match parse_switch(&raw) {
                Some(true) => config.threshold_mode = ThresholdMode::Filter,
                Some(false) => config.threshold_mode = ThresholdMode::TagOnly,
                None => tracing::warn!(variable = ENV_FILTER, value = %raw, "ignoring setting: expected a boolean"),
            }
        }
        if let Some(raw) = lookup(ENV_TZ) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "local" => config.time_zone = TimeZone::Local,
                "utc" => config.time_zone = TimeZone::Utc,
                _ => tracing::warn!(variable = ENV_TZ, value = %raw, "ignoring setting: expected local or utc"),
            }
        }

        config
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
