use std::io;
use thiserror::Error;

/// Failure to render a printf-style template.
///
/// Raised by [`measure`](crate::measure), [`render_into`](crate::render_into)
/// and [`render`](crate::render) when the template is malformed or an argument
/// cannot be encoded by the conversion that consumes it. Nothing is emitted
/// when a render fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("conversion at byte {offset} needs argument #{index}, but only {supplied} were supplied")]
    MissingArgument {
        offset: usize,
        index: usize,
        supplied: usize,
    },
    #[error("argument #{index} is {found}, which `%{conversion}` cannot encode")]
    ArgumentMismatch {
        index: usize,
        conversion: char,
        found: &'static str,
    },
    #[error("unsupported conversion `%{conversion}` at byte {offset}")]
    UnsupportedConversion { offset: usize, conversion: char },
    #[error("conversion specifier at byte {offset} is cut off by the end of the template")]
    TruncatedSpecifier { offset: usize },
    #[error("width or precision at byte {offset} exceeds {max}", max = i32::MAX)]
    CountOverflow { offset: usize },
    #[error("argument #{index} ({value:#x}) is not a valid character")]
    InvalidChar { index: usize, value: u64 },
    #[error("second rendering pass produced {actual} bytes, expected {expected}")]
    Inconsistent { expected: usize, actual: usize },
}

/// Failure to emit a log line.
#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("failed to write log line: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level `{0}`")]
pub struct ParseLevelError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown color mode `{0}` (expected always, never or detect)")]
pub struct ParseColorModeError(pub String);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    #[error("a global logger is already installed")]
    AlreadyInstalled,
    #[error("another logger is already registered with the `log` facade")]
    FacadeTaken,
}
