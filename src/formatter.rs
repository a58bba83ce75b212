use std::cell::RefCell;

use crate::error::FormatError;
use crate::fmt_arg::FmtArg;
use crate::render::{render_to, Counter, SliceSink};

/// Capacity of each thread's scratch buffer in bytes.
pub const SCRATCH_CAPACITY: usize = 1024;

/// Fixed-capacity render buffer with heap fallback.
///
/// Output that fits is rendered straight into the buffer and copied out once
/// into the returned `String`. Longer output is measured by that same first
/// pass and rendered a second time into a heap buffer of exactly the right
/// size.
///
/// Every thread owns one `ScratchBuffer` for [`render`]; explicit instances
/// are useful when the caller wants to own the storage, or a different
/// capacity.
///
/// # Examples
///
/// ```
/// # use fmtlog::{FmtArg, ScratchBuffer};
/// let mut scratch = ScratchBuffer::<16>::new();
///
/// let short = scratch.render("%d%%", &[FmtArg::Int(50, 32)]).unwrap();
/// assert_eq!(short, "50%");
/// assert_eq!(scratch.heap_fallbacks(), 0);
///
/// let long = scratch.render("%s", &[FmtArg::Str("does not fit in sixteen bytes")]).unwrap();
/// assert_eq!(long, "does not fit in sixteen bytes");
/// assert_eq!(scratch.heap_fallbacks(), 1);
/// ```
pub struct ScratchBuffer<const CAP: usize = SCRATCH_CAPACITY> {
    bytes: [u8; CAP],
    heap_fallbacks: u64,
}

impl<const CAP: usize> ScratchBuffer<CAP> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; CAP],
            heap_fallbacks: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Number of renders on this buffer that did not fit and went to the heap.
    pub fn heap_fallbacks(&self) -> u64 {
        self.heap_fallbacks
    }

    /// Renders `template` with `args`, reusing this buffer when the output is
    /// strictly shorter than its capacity.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the template is malformed, an argument is
    /// missing or of the wrong kind, or the heap pass disagrees with the first
    /// pass about the output size.
    pub fn render(&mut self, template: &str, args: &[FmtArg<'_>]) -> Result<String, FormatError> {
        let required = render_into(&mut self.bytes, template, args)?;
        if required < CAP {
            return Ok(String::from_utf8_lossy(&self.bytes[..required]).into_owned());
        }

        self.heap_fallbacks += 1;
        tracing::trace!(required, capacity = CAP, "format output exceeds scratch buffer, rendering on the heap");
        render_on_heap(template, args, required)
    }
}

impl<const CAP: usize> Default for ScratchBuffer<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static SCRATCH: RefCell<ScratchBuffer> = const { RefCell::new(ScratchBuffer::new()) };
}

fn render_on_heap(template: &str, args: &[FmtArg<'_>], required: usize) -> Result<String, FormatError> {
    let mut heap = vec![0u8; required];
    let written = render_into(&mut heap, template, args)?;
    if written != required {
        return Err(FormatError::Inconsistent {
            expected: required,
            actual: written,
        });
    }
    match String::from_utf8(heap) {
        Ok(text) => Ok(text),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Exact number of bytes `template` renders to with `args`.
///
/// Runs the renderer against a counting sink, so nothing is allocated or
/// written.
///
/// ```
/// # use fmtlog::{measure, FmtArg};
/// assert_eq!(measure("%s has %d items", &[FmtArg::Str("cart"), FmtArg::Int(3, 32)]), Ok(16));
/// ```
pub fn measure(template: &str, args: &[FmtArg<'_>]) -> Result<usize, FormatError> {
    let mut counter = Counter::default();
    render_to(&mut counter, template, args)?;
    Ok(counter.len())
}

/// Renders into caller storage.
///
/// Writes at most `buf.len()` bytes and returns the size of the complete
/// output. A return value larger than `buf.len()` means the output was cut
/// short; the cut may fall inside a multi-byte character. No terminator is
/// written.
///
/// ```
/// # use fmtlog::{render_into, FmtArg};
/// let mut buf = [0u8; 8];
/// let needed = render_into(&mut buf, "%s has %d items", &[FmtArg::Str("cart"), FmtArg::Int(3, 32)]).unwrap();
/// assert_eq!(needed, 16);
/// assert_eq!(&buf, b"cart has");
/// ```
pub fn render_into(buf: &mut [u8], template: &str, args: &[FmtArg<'_>]) -> Result<usize, FormatError> {
    let mut sink = SliceSink::new(buf);
    render_to(&mut sink, template, args)?;
    Ok(sink.required())
}

/// Renders `template` with `args` using the calling thread's scratch buffer.
///
/// This is the main entry point; [`sprintf!`](crate::sprintf) wraps it with
/// argument normalization.
///
/// ```
/// # use fmtlog::{render, FmtArg};
/// let text = render("%s has %d items", &[FmtArg::Str("cart"), FmtArg::Int(3, 32)]).unwrap();
/// assert_eq!(text, "cart has 3 items");
/// ```
pub fn render(template: &str, args: &[FmtArg<'_>]) -> Result<String, FormatError> {
    let on_scratch = SCRATCH.try_with(|scratch| {
        scratch
            .try_borrow_mut()
            .ok()
            .map(|mut scratch| scratch.render(template, args))
    });
    match on_scratch {
        Ok(Some(result)) => result,
        // The thread is tearing down its locals, or the buffer is in use
        // further up the stack.
        _ => {
            let required = measure(template, args)?;
            render_on_heap(template, args, required)
        }
    }
}

/// Heap fallbacks taken so far by the calling thread's scratch buffer.
pub fn thread_heap_fallbacks() -> u64 {
    SCRATCH
        .try_with(|scratch| scratch.try_borrow().map(|s| s.heap_fallbacks()).unwrap_or(0))
        .unwrap_or(0)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __count_args {
    () => { 0usize };
    ($head:expr $(, $tail:expr)*) => { 1usize + $crate::__count_args!($($tail),*) };
}

/// Rejects malformed literal templates, and templates that need more
/// arguments than were passed, at compile time.
#[doc(hidden)]
#[macro_export]
macro_rules! __check_template {
    ($fmt:literal, $($arg:expr),*) => {
        const _: () = {
            assert!(
                $crate::template::validate_template($fmt),
                "malformed printf template"
            );
            match $crate::template::required_arguments($fmt) {
                Some(needed) => assert!(
                    needed <= $crate::__count_args!($($arg),*),
                    "printf template needs more arguments than were supplied"
                ),
                None => {}
            }
        };
    };
}

/// Renders a printf-style template into a `String`.
///
/// Each argument goes through [`AsFmtArg`](crate::AsFmtArg), so strings,
/// string views, numbers, chars and raw pointers can be mixed freely. Literal
/// templates are validated at compile time; other template expressions are
/// checked when rendered.
///
/// # Examples
///
/// ```
/// # use fmtlog::sprintf;
/// let owner = String::from("cart");
/// assert_eq!(sprintf!("%s has %d items", owner, 3).unwrap(), "cart has 3 items");
/// assert_eq!(sprintf!("%d%%", 50).unwrap(), "50%");
/// assert_eq!(sprintf!("%-6s|%6.2f|%#x", "id", 2.5, 255).unwrap(), "id    |  2.50|0xff");
///
/// let runtime_template = "%d and %d";
/// assert!(sprintf!(runtime_template, 1).is_err());
/// ```
#[macro_export]
macro_rules! sprintf {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::__check_template!($fmt, $($arg),*);
        $crate::render($fmt, &[$($crate::AsFmtArg::as_fmt_arg(&$arg)),*])
    }};
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::render($fmt, &[$($crate::AsFmtArg::as_fmt_arg(&$arg)),*])
    };
}
