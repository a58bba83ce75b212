//! Conversion engine behind the formatter.
//!
//! Everything here writes into a [`Sink`], which is either a [`Counter`]
//! (measuring pass) or a [`SliceSink`] over caller storage. No path through
//! this module allocates: integers are spelled into stack buffers, floats are
//! streamed out of `core::fmt` through small `fmt::Write` adapters, and the
//! width of a padded float is found by running it through a `Counter` first.

use std::fmt::{self, Write as _};

use crate::error::FormatError;
use crate::fmt_arg::FmtArg;
use crate::template::{Conversion, Count, FormatFlags, FormatSpec, LengthMod, Segment, Segments, MAX_COUNT};

/// Destination for rendered bytes.
pub trait Sink {
    fn put(&mut self, bytes: &[u8]);

    fn put_repeated(&mut self, byte: u8, count: usize) {
        const CHUNK: usize = 32;
        let chunk = [byte; CHUNK];
        let mut left = count;
        while left > 0 {
            let n = left.min(CHUNK);
            self.put(&chunk[..n]);
            left -= n;
        }
    }
}

/// Counts bytes without keeping them.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counter {
    len: usize,
}

impl Counter {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Sink for Counter {
    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }

    #[inline]
    fn put_repeated(&mut self, _byte: u8, count: usize) {
        self.len += count;
    }
}

/// Fills a fixed slice and keeps counting once it is full.
pub struct SliceSink<'b> {
    buf: &'b mut [u8],
    len: usize,
}

impl<'b> SliceSink<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Bytes the full output needs, which may exceed the slice length.
    pub fn required(&self) -> usize {
        self.len
    }
}

impl Sink for SliceSink<'_> {
    fn put(&mut self, bytes: &[u8]) {
        if self.len < self.buf.len() {
            let n = bytes.len().min(self.buf.len() - self.len);
            self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        }
        self.len += bytes.len();
    }
}

struct SinkWriter<'s, S: Sink + ?Sized>(&'s mut S);

impl<S: Sink + ?Sized> fmt::Write for SinkWriter<'_, S> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put(s.as_bytes());
        Ok(())
    }
}

/// Renders `template` with `args` into `sink`.
///
/// On error the sink may hold a partial rendering; callers discard it.
pub fn render_to<S: Sink>(sink: &mut S, template: &str, args: &[FmtArg<'_>]) -> Result<(), FormatError> {
    let mut cursor = ArgCursor { args, next: 0 };
    for segment in Segments::new(template) {
        match segment? {
            Segment::Literal(text) => sink.put(text.as_bytes()),
            Segment::Spec { offset, spec } => render_spec(sink, &spec, offset, &mut cursor)?,
        }
    }
    Ok(())
}

struct ArgCursor<'x, 'a> {
    args: &'x [FmtArg<'a>],
    next: usize,
}

impl<'a> ArgCursor<'_, 'a> {
    fn take(&mut self, offset: usize) -> Result<(usize, FmtArg<'a>), FormatError> {
        let index = self.next;
        let arg = self.args.get(index).copied().ok_or(FormatError::MissingArgument {
            offset,
            index,
            supplied: self.args.len(),
        })?;
        self.next += 1;
        Ok((index, arg))
    }

    /// Takes a `*` width or precision argument.
    fn take_count(&mut self, offset: usize) -> Result<i64, FormatError> {
        let (index, arg) = self.take(offset)?;
        match arg {
            FmtArg::Int(v, _) => Ok(v),
            FmtArg::Uint(v, _) => Ok(i64::try_from(v).unwrap_or(i64::MAX)),
            FmtArg::Char(c) => Ok(i64::from(u32::from(c))),
            other => Err(FormatError::ArgumentMismatch {
                index,
                conversion: '*',
                found: other.kind(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    flags: FormatFlags,
    width: usize,
}

impl Layout {
    /// Writes `prefix` and a body of `body_len` bytes padded out to the width.
    ///
    /// Zero padding goes between the prefix (sign, `0x`) and the body.
    fn pad<S: Sink + ?Sized>(self, sink: &mut S, prefix: &[u8], body_len: usize, zero_pad: bool, body: impl FnOnce(&mut S)) {
        let fill = self.width.saturating_sub(prefix.len() + body_len);
        if self.flags.left {
            sink.put(prefix);
            body(sink);
            sink.put_repeated(b' ', fill);
        } else if zero_pad {
            sink.put(prefix);
            sink.put_repeated(b'0', fill);
            body(sink);
        } else {
            sink.put_repeated(b' ', fill);
            sink.put(prefix);
            body(sink);
        }
    }

    fn sign(self, negative: bool) -> &'static [u8] {
        if negative {
            b"-"
        } else if self.flags.plus {
            b"+"
        } else if self.flags.space {
            b" "
        } else {
            b""
        }
    }
}

fn render_spec<S: Sink>(sink: &mut S, spec: &FormatSpec, offset: usize, args: &mut ArgCursor<'_, '_>) -> Result<(), FormatError> {
    if spec.conversion == Conversion::Percent {
        sink.put(b"%");
        return Ok(());
    }

    let mut flags = spec.flags;
    let width = match spec.width {
        Count::Implied => 0,
        Count::Fixed(n) => n,
        Count::FromArg => {
            let w = args.take_count(offset)?;
            if w < 0 {
                flags.left = true;
            }
            checked_count(w.unsigned_abs(), offset)?
        }
    };
    let precision = match spec.precision {
        Count::Implied => None,
        Count::Fixed(n) => Some(n),
        Count::FromArg => {
            let p = args.take_count(offset)?;
            if p < 0 {
                None
            } else {
                Some(checked_count(p.unsigned_abs(), offset)?)
            }
        }
    };

    let (index, arg) = args.take(offset)?;
    let layout = Layout { flags, width };
    let mismatch = || FormatError::ArgumentMismatch {
        index,
        conversion: char::from(spec.letter),
        found: arg.kind(),
    };

    match spec.conversion {
        Conversion::Signed => {
            let value = signed_value(arg, spec.length).ok_or_else(mismatch)?;
            let mut buf = DigitBuf::new();
            let digits = buf.spell(value.unsigned_abs(), 10, false);
            write_integer(sink, layout, precision, layout.sign(value < 0), digits);
        }
        Conversion::Unsigned => {
            let value = unsigned_value(arg, spec.length).ok_or_else(mismatch)?;
            let mut buf = DigitBuf::new();
            write_integer(sink, layout, precision, b"", buf.spell(value, 10, false));
        }
        Conversion::Octal => {
            let value = unsigned_value(arg, spec.length).ok_or_else(mismatch)?;
            let mut buf = DigitBuf::new();
            let digits = buf.spell(value, 8, false);
            // `#` guarantees the first printed digit is a zero.
            let shown_zero = match precision {
                Some(0) if value == 0 => false,
                Some(p) => p > digits.len() || value == 0,
                None => value == 0,
            };
            let prefix: &[u8] = if flags.alternate && !shown_zero { b"0" } else { b"" };
            write_integer(sink, layout, precision, prefix, digits);
        }
        Conversion::Hex { upper } => {
            let value = unsigned_value(arg, spec.length).ok_or_else(mismatch)?;
            let mut buf = DigitBuf::new();
            let prefix: &[u8] = match (flags.alternate && value != 0, upper) {
                (false, _) => b"",
                (true, false) => b"0x",
                (true, true) => b"0X",
            };
            write_integer(sink, layout, precision, prefix, buf.spell(value, 16, upper));
        }
        Conversion::Fixed { upper } => {
            let FmtArg::Float(value) = arg else { return Err(mismatch()) };
            write_float(sink, layout, precision, value, FloatStyle::Fixed, upper);
        }
        Conversion::Exponent { upper } => {
            let FmtArg::Float(value) = arg else { return Err(mismatch()) };
            write_float(sink, layout, precision, value, FloatStyle::Exponent, upper);
        }
        Conversion::General { upper } => {
            let FmtArg::Float(value) = arg else { return Err(mismatch()) };
            write_float(sink, layout, precision, value, FloatStyle::General, upper);
        }
        Conversion::Char => {
            let c = match arg {
                FmtArg::Char(c) => c,
                FmtArg::Int(..) | FmtArg::Uint(..) => char_code(arg, spec.length, index)?,
                _ => return Err(mismatch()),
            };
            let mut utf8 = [0u8; 4];
            let encoded = c.encode_utf8(&mut utf8).as_bytes();
            layout.pad(sink, b"", encoded.len(), false, |s| s.put(encoded));
        }
        Conversion::Str => {
            let FmtArg::Str(text) = arg else { return Err(mismatch()) };
            let shown = match precision {
                Some(p) => truncate_on_boundary(text, p),
                None => text,
            };
            layout.pad(sink, b"", shown.len(), false, |s| s.put(shown.as_bytes()));
        }
        Conversion::Pointer => {
            let FmtArg::Ptr(addr) = arg else { return Err(mismatch()) };
            if addr == 0 {
                layout.pad(sink, b"", 5, false, |s| s.put(b"(nil)"));
            } else {
                let mut buf = DigitBuf::new();
                let digits = buf.spell(addr as u64, 16, false);
                layout.pad(sink, b"0x", digits.len(), false, |s| s.put(digits));
            }
        }
        // Written above, before any argument was taken.
        Conversion::Percent => {}
    }
    Ok(())
}

fn checked_count(value: u64, offset: usize) -> Result<usize, FormatError> {
    if value > MAX_COUNT as u64 {
        return Err(FormatError::CountOverflow { offset });
    }
    Ok(value as usize)
}

/// Raw bits of an integer-like argument and the width it is promoted to.
///
/// Anything narrower than C's `int` is promoted to 32 bits first.
fn integer_bits(arg: FmtArg<'_>) -> Option<(u64, u32)> {
    let (raw, bits) = match arg {
        FmtArg::Int(v, bits) => (v as u64, bits),
        FmtArg::Uint(v, bits) => (v, bits),
        FmtArg::Char(c) => (u64::from(u32::from(c)), 32),
        _ => return None,
    };
    Some((raw, bits.max(32)))
}

fn signed_value(arg: FmtArg<'_>, length: LengthMod) -> Option<i64> {
    let (raw, bits) = integer_bits(arg)?;
    let bits = length.bits().unwrap_or(bits);
    if bits >= 64 {
        return Some(raw as i64);
    }
    let shift = 64 - bits;
    Some(((raw << shift) as i64) >> shift)
}

fn unsigned_value(arg: FmtArg<'_>, length: LengthMod) -> Option<u64> {
    let (raw, bits) = integer_bits(arg)?;
    let bits = length.bits().unwrap_or(bits);
    if bits >= 64 {
        return Some(raw);
    }
    Some(raw & ((1u64 << bits) - 1))
}

/// `%c` of an integer: the low byte, or a full code point with `l`.
///
/// A low byte above 0x7F is rejected: on its own it is not valid UTF-8, and
/// output is always a `str`.
fn char_code(arg: FmtArg<'_>, length: LengthMod, index: usize) -> Result<char, FormatError> {
    let (raw, _) = integer_bits(arg).ok_or(FormatError::InvalidChar { index, value: 0 })?;
    match length {
        LengthMod::Long | LengthMod::LongLong => u32::try_from(raw)
            .ok()
            .and_then(char::from_u32)
            .ok_or(FormatError::InvalidChar { index, value: raw }),
        _ => {
            let byte = raw as u8;
            if byte.is_ascii() {
                Ok(char::from(byte))
            } else {
                Err(FormatError::InvalidChar { index, value: raw })
            }
        }
    }
}

fn truncate_on_boundary(text: &str, max: usize) -> &str {
    if max >= text.len() {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

struct DigitBuf {
    bytes: [u8; 22],
}

impl DigitBuf {
    fn new() -> Self {
        Self { bytes: [0; 22] }
    }

    fn spell(&mut self, mut value: u64, radix: u64, upper: bool) -> &[u8] {
        const LOWER: &[u8; 16] = b"0123456789abcdef";
        const UPPER: &[u8; 16] = b"0123456789ABCDEF";
        let table = if upper { UPPER } else { LOWER };
        let mut start = self.bytes.len();
        loop {
            start -= 1;
            self.bytes[start] = table[(value % radix) as usize];
            value /= radix;
            if value == 0 {
                break;
            }
        }
        &self.bytes[start..]
    }
}

fn write_integer<S: Sink>(sink: &mut S, layout: Layout, precision: Option<usize>, prefix: &[u8], digits: &[u8]) {
    // An explicit zero precision prints nothing for a zero value.
    let digits: &[u8] = if precision == Some(0) && digits == b"0" { b"" } else { digits };
    let zeros = precision.map_or(0, |p| p.saturating_sub(digits.len()));
    let zero_pad = layout.flags.zero && precision.is_none();
    layout.pad(sink, prefix, zeros + digits.len(), zero_pad, |s| {
        s.put_repeated(b'0', zeros);
        s.put(digits);
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatStyle {
    Fixed,
    Exponent,
    General,
}

fn write_float<S: Sink>(sink: &mut S, layout: Layout, precision: Option<usize>, value: f64, style: FloatStyle, upper: bool) {
    let sign = layout.sign(value.is_sign_negative());
    let magnitude = value.abs();

    if !magnitude.is_finite() {
        let text: &[u8] = match (magnitude.is_nan(), upper) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        layout.pad(sink, sign, text.len(), false, |s| s.put(text));
        return;
    }

    let body = FloatBody {
        value: magnitude,
        precision: precision.unwrap_or(6),
        style,
        upper,
        alternate: layout.flags.alternate,
    };
    let mut counter = Counter::default();
    body.write(&mut counter);
    layout.pad(sink, sign, counter.len(), layout.flags.zero, |s| body.write(s));
}

/// Digits of a finite, non-negative float; the sign is handled by the caller.
struct FloatBody {
    value: f64,
    precision: usize,
    style: FloatStyle,
    upper: bool,
    alternate: bool,
}

impl FloatBody {
    fn write<S: Sink + ?Sized>(&self, sink: &mut S) {
        let mut out = SinkWriter(sink);
        match self.style {
            FloatStyle::Fixed => self.fixed(&mut out, self.precision),
            FloatStyle::Exponent => {
                let exp = self.mantissa(&mut out, self.precision);
                self.exponent(&mut out, exp);
            }
            FloatStyle::General => self.general(&mut out),
        }
    }

    fn fixed<W: fmt::Write>(&self, out: &mut W, precision: usize) {
        let _ = write!(out, "{:.*}", precision, self.value);
        if self.alternate && precision == 0 {
            let _ = out.write_char('.');
        }
    }

    /// Writes `d.ddd` and returns the decimal exponent.
    fn mantissa<W: fmt::Write>(&self, out: &mut W, precision: usize) -> i32 {
        let mut split = ExpSplit::new(&mut *out);
        let _ = write!(split, "{:.*e}", precision, self.value);
        let exp = split.exponent();
        if self.alternate && precision == 0 {
            let _ = out.write_char('.');
        }
        exp
    }

    fn exponent<W: fmt::Write>(&self, out: &mut W, exp: i32) {
        let marker = if self.upper { 'E' } else { 'e' };
        let sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "{marker}{sign}{:02}", exp.unsigned_abs());
    }

    fn general<W: fmt::Write>(&self, out: &mut W) {
        let p = self.precision.max(1);
        let exp = if self.value == 0.0 {
            0
        } else {
            let mut discard = Counter::default();
            let mut probe = ExpSplit::new(SinkWriter(&mut discard));
            let _ = write!(probe, "{:.*e}", p - 1, self.value);
            probe.exponent()
        };

        if exp >= -4 && i64::from(exp) < p as i64 {
            let precision = (p as i64 - 1 - i64::from(exp)) as usize;
            if self.alternate {
                self.fixed(out, precision);
            } else {
                let mut trim = TrimZeros::new(&mut *out);
                self.fixed(&mut trim, precision);
            }
        } else {
            let exp = if self.alternate {
                self.mantissa(out, p - 1)
            } else {
                let mut trim = TrimZeros::new(&mut *out);
                self.mantissa(&mut trim, p - 1)
            };
            self.exponent(out, exp);
        }
    }
}

/// Passes a `{:e}` rendering through up to the `e` and parses the exponent.
struct ExpSplit<W> {
    inner: W,
    in_exponent: bool,
    negative: bool,
    magnitude: i32,
}

impl<W: fmt::Write> ExpSplit<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            in_exponent: false,
            negative: false,
            magnitude: 0,
        }
    }

    fn exponent(&self) -> i32 {
        if self.negative {
            -self.magnitude
        } else {
            self.magnitude
        }
    }
}

impl<W: fmt::Write> fmt::Write for ExpSplit<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut rest = s;
        if !self.in_exponent {
            match rest.find('e') {
                Some(i) => {
                    self.inner.write_str(&rest[..i])?;
                    self.in_exponent = true;
                    rest = &rest[i + 1..];
                }
                None => return self.inner.write_str(rest),
            }
        }
        for b in rest.bytes() {
            match b {
                b'-' => self.negative = true,
                b'0'..=b'9' => self.magnitude = self.magnitude * 10 + i32::from(b - b'0'),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Drops trailing fractional zeros, and the point itself if nothing follows.
///
/// Zeros are held back until a non-zero digit proves they are not trailing;
/// whatever is still held when the adapter goes away is discarded.
struct TrimZeros<W> {
    inner: W,
    after_point: bool,
    pending_point: bool,
    pending_zeros: usize,
}

impl<W: fmt::Write> TrimZeros<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            after_point: false,
            pending_point: false,
            pending_zeros: 0,
        }
    }
}

impl<W: fmt::Write> fmt::Write for TrimZeros<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if !self.after_point {
                if c == '.' {
                    self.after_point = true;
                    self.pending_point = true;
                } else {
                    self.inner.write_char(c)?;
                }
            } else if c == '0' {
                self.pending_zeros += 1;
            } else {
                if self.pending_point {
                    self.inner.write_char('.')?;
                    self.pending_point = false;
                }
                for _ in 0..self.pending_zeros {
                    self.inner.write_char('0')?;
                }
                self.pending_zeros = 0;
                self.inner.write_char(c)?;
            }
        }
        Ok(())
    }
}
