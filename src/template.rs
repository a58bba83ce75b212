//! Parser for printf-style templates.
//!
//! A template is literal text interleaved with conversion specifiers of the
//! form `%[flags][width][.precision][length]conversion`. The specifier parser
//! is a `const fn` so the same code checks literal templates at compile time
//! (see [`validate_template`] and the [`sprintf!`](crate::sprintf) macro) and
//! drives rendering at run time.

use crate::error::FormatError;

/// Largest width or precision accepted, the limit of C's `int` result.
pub const MAX_COUNT: usize = i32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatFlags {
    /// `-`: pad on the right.
    pub left: bool,
    /// `+`: always print a sign for signed conversions.
    pub plus: bool,
    /// ` `: print a space in place of a `+` sign.
    pub space: bool,
    /// `#`: alternate form.
    pub alternate: bool,
    /// `0`: pad numbers with zeros after the sign.
    pub zero: bool,
}

impl FormatFlags {
    pub const NONE: Self = Self {
        left: false,
        plus: false,
        space: false,
        alternate: false,
        zero: false,
    };
}

/// Width or precision of a specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Implied,
    Fixed(usize),
    /// `*`: taken from the next argument.
    FromArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    Default,
    /// `hh`
    Char,
    /// `h`
    Short,
    /// `l`
    Long,
    /// `ll` or `q`
    LongLong,
    /// `j`
    IntMax,
    /// `z`
    Size,
    /// `t`
    PtrDiff,
    /// `L`
    LongDouble,
}

impl LengthMod {
    /// Integer width forced by the modifier, `None` to keep the argument's own.
    pub const fn bits(self) -> Option<u32> {
        match self {
            LengthMod::Default => None,
            LengthMod::Char => Some(8),
            LengthMod::Short => Some(16),
            LengthMod::Long
            | LengthMod::LongLong
            | LengthMod::IntMax
            | LengthMod::Size
            | LengthMod::PtrDiff
            | LengthMod::LongDouble => Some(64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `d`, `i`
    Signed,
    /// `u`
    Unsigned,
    /// `o`
    Octal,
    /// `x`, `X`
    Hex { upper: bool },
    /// `f`, `F`
    Fixed { upper: bool },
    /// `e`, `E`
    Exponent { upper: bool },
    /// `g`, `G`
    General { upper: bool },
    /// `c`
    Char,
    /// `s`
    Str,
    /// `p`
    Pointer,
    /// `%%`
    Percent,
}

/// One parsed conversion specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Count,
    pub precision: Count,
    pub length: LengthMod,
    pub conversion: Conversion,
    /// The conversion letter as written, for diagnostics.
    pub letter: u8,
}

impl FormatSpec {
    /// Number of arguments this specifier consumes, `*` counts included.
    pub const fn arguments(&self) -> usize {
        if matches!(self.conversion, Conversion::Percent) {
            return 0;
        }
        let mut n = 1;
        if matches!(self.width, Count::FromArg) {
            n += 1;
        }
        if matches!(self.precision, Count::FromArg) {
            n += 1;
        }
        n
    }
}

/// Why a specifier failed to parse; offsets are byte positions in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecError {
    Truncated { offset: usize },
    Unsupported { offset: usize, at: usize },
    Overflow { offset: usize },
}

impl SpecError {
    pub(crate) fn into_format_error(self, template: &str) -> FormatError {
        match self {
            SpecError::Truncated { offset } => FormatError::TruncatedSpecifier { offset },
            SpecError::Overflow { offset } => FormatError::CountOverflow { offset },
            SpecError::Unsupported { offset, at } => FormatError::UnsupportedConversion {
                offset,
                conversion: template[at..].chars().next().unwrap_or('\u{fffd}'),
            },
        }
    }
}

/// Parses a run of decimal digits starting at `i`.
///
/// Returns `None` for the value when there are no digits at all.
const fn parse_count(bytes: &[u8], mut i: usize, offset: usize) -> Result<(Option<usize>, usize), SpecError> {
    let start = i;
    let mut value: usize = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        let digit = (bytes[i] - b'0') as usize;
        if value > (MAX_COUNT - digit) / 10 {
            return Err(SpecError::Overflow { offset });
        }
        value = value * 10 + digit;
        i += 1;
    }
    if i == start {
        Ok((None, i))
    } else {
        Ok((Some(value), i))
    }
}

/// Parses the specifier whose `%` sits at `offset`.
///
/// Returns the spec and the index one past its conversion letter.
pub(crate) const fn parse_spec(bytes: &[u8], offset: usize) -> Result<(FormatSpec, usize), SpecError> {
    let len = bytes.len();
    let mut i = offset + 1;

    let mut flags = FormatFlags::NONE;
    while i < len {
        match bytes[i] {
            b'-' => flags.left = true,
            b'+' => flags.plus = true,
            b' ' => flags.space = true,
            b'#' => flags.alternate = true,
            b'0' => flags.zero = true,
            _ => break,
        }
        i += 1;
    }

    let mut width = Count::Implied;
    if i < len && bytes[i] == b'*' {
        width = Count::FromArg;
        i += 1;
    } else {
        match parse_count(bytes, i, offset) {
            Ok((Some(n), next)) => {
                width = Count::Fixed(n);
                i = next;
            }
            Ok((None, _)) => {}
            Err(e) => return Err(e),
        }
    }

    let mut precision = Count::Implied;
    if i < len && bytes[i] == b'.' {
        i += 1;
        if i < len && bytes[i] == b'*' {
            precision = Count::FromArg;
            i += 1;
        } else {
            match parse_count(bytes, i, offset) {
                Ok((n, next)) => {
                    precision = match n {
                        Some(n) => Count::Fixed(n),
                        None => Count::Fixed(0),
                    };
                    i = next;
                }
                Err(e) => return Err(e),
            }
        }
    }

    let mut length = LengthMod::Default;
    if i < len {
        let doubled = i + 1 < len && bytes[i + 1] == bytes[i];
        length = match bytes[i] {
            b'h' if doubled => LengthMod::Char,
            b'h' => LengthMod::Short,
            b'l' if doubled => LengthMod::LongLong,
            b'l' => LengthMod::Long,
            b'q' => LengthMod::LongLong,
            b'j' => LengthMod::IntMax,
            b'z' => LengthMod::Size,
            b't' => LengthMod::PtrDiff,
            b'L' => LengthMod::LongDouble,
            _ => LengthMod::Default,
        };
        i += match length {
            LengthMod::Default => 0,
            LengthMod::Char => 2,
            LengthMod::LongLong if bytes[i] == b'l' => 2,
            _ => 1,
        };
    }

    if i >= len {
        return Err(SpecError::Truncated { offset });
    }

    let letter = bytes[i];
    let conversion = match letter {
        b'd' | b'i' => Conversion::Signed,
        b'u' => Conversion::Unsigned,
        b'o' => Conversion::Octal,
        b'x' => Conversion::Hex { upper: false },
        b'X' => Conversion::Hex { upper: true },
        b'f' => Conversion::Fixed { upper: false },
        b'F' => Conversion::Fixed { upper: true },
        b'e' => Conversion::Exponent { upper: false },
        b'E' => Conversion::Exponent { upper: true },
        b'g' => Conversion::General { upper: false },
        b'G' => Conversion::General { upper: true },
        b'c' => Conversion::Char,
        b's' => Conversion::Str,
        b'p' => Conversion::Pointer,
        b'%' => Conversion::Percent,
        _ => return Err(SpecError::Unsupported { offset, at: i }),
    };

    Ok((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
            letter,
        },
        i + 1,
    ))
}

/// Checks a template for malformed or unsupported specifiers.
///
/// # Examples
///
/// ```
/// # use fmtlog::template::validate_template;
/// assert!(validate_template("%s has %d items"));
/// assert!(validate_template("%d%%"));
/// assert!(!validate_template("100%"));      // cut off
/// assert!(!validate_template("%n"));        // unsupported
/// ```
pub const fn validate_template(template: &str) -> bool {
    required_arguments(template).is_some()
}

/// Number of arguments a template consumes, or `None` if it is malformed.
///
/// ```
/// # use fmtlog::template::required_arguments;
/// assert_eq!(required_arguments("%s has %d items"), Some(2));
/// assert_eq!(required_arguments("%*.*f|%%"), Some(3));
/// assert_eq!(required_arguments("%q"), None);
/// ```
pub const fn required_arguments(template: &str) -> Option<usize> {
    let bytes = template.as_bytes();
    let mut i = 0;
    let mut count = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match parse_spec(bytes, i) {
                Ok((spec, next)) => {
                    count += spec.arguments();
                    i = next;
                }
                Err(_) => return None,
            }
        } else {
            i += 1;
        }
    }
    Some(count)
}

/// A piece of a template: literal text or a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Spec { offset: usize, spec: FormatSpec },
}

/// Iterator over the segments of a template.
///
/// Yields an error for the first malformed specifier and then stops.
pub struct Segments<'a> {
    template: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    pub fn new(template: &'a str) -> Self {
        Self { template, pos: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.template.get(self.pos..).filter(|r| !r.is_empty())?;
        match rest.find('%') {
            Some(0) => {
                let offset = self.pos;
                match parse_spec(self.template.as_bytes(), offset) {
                    Ok((spec, next)) => {
                        self.pos = next;
                        Some(Ok(Segment::Spec { offset, spec }))
                    }
                    Err(e) => {
                        self.pos = self.template.len();
                        Some(Err(e.into_format_error(self.template)))
                    }
                }
            }
            Some(n) => {
                self.pos += n;
                Some(Ok(Segment::Literal(&rest[..n])))
            }
            None => {
                self.pos = self.template.len();
                Some(Ok(Segment::Literal(rest)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(template: &str) -> FormatSpec {
        match parse_spec(template.as_bytes(), 0) {
            Ok((spec, end)) => {
                assert_eq!(end, template.len(), "spec should span the whole input");
                spec
            }
            Err(e) => panic!("failed to parse {template:?}: {e:?}"),
        }
    }

    #[test]
    fn test_parse_full_specifier() {
        let spec = single("%-+#08.3lld");
        assert!(spec.flags.left && spec.flags.plus && spec.flags.alternate && spec.flags.zero);
        assert!(!spec.flags.space);
        assert_eq!(spec.width, Count::Fixed(8));
        assert_eq!(spec.precision, Count::Fixed(3));
        assert_eq!(spec.length, LengthMod::LongLong);
        assert_eq!(spec.conversion, Conversion::Signed);
        assert_eq!(spec.letter, b'd');
    }

    #[test]
    fn test_parse_star_and_empty_precision() {
        let spec = single("%*.*f");
        assert_eq!(spec.width, Count::FromArg);
        assert_eq!(spec.precision, Count::FromArg);
        assert_eq!(spec.arguments(), 3);

        let spec = single("%.e");
        assert_eq!(spec.precision, Count::Fixed(0));
        assert_eq!(spec.conversion, Conversion::Exponent { upper: false });
    }

    #[test]
    fn test_parse_length_modifiers() {
        assert_eq!(single("%hhu").length, LengthMod::Char);
        assert_eq!(single("%hx").length, LengthMod::Short);
        assert_eq!(single("%ld").length, LengthMod::Long);
        assert_eq!(single("%qd").length, LengthMod::LongLong);
        assert_eq!(single("%zu").length, LengthMod::Size);
        assert_eq!(single("%Lf").length, LengthMod::LongDouble);
        assert_eq!(LengthMod::Char.bits(), Some(8));
        assert_eq!(LengthMod::Default.bits(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_spec(b"%5", 0),
            Err(SpecError::Truncated { offset: 0 })
        );
        assert_eq!(
            parse_spec(b"%5n", 0),
            Err(SpecError::Unsupported { offset: 0, at: 2 })
        );
        assert_eq!(
            parse_spec(b"%99999999999d", 0),
            Err(SpecError::Overflow { offset: 0 })
        );
    }

    #[test]
    fn test_compile_time_validation() {
        const OK: bool = validate_template("Test: %s value=%d");
        const BAD: bool = validate_template("Test: %s value=%");
        const COUNT: Option<usize> = required_arguments("%-*d %.*s %%");
        assert!(OK);
        assert!(!BAD);
        assert_eq!(COUNT, Some(4));
    }

    #[test]
    fn test_segments() {
        let segments: Vec<_> = Segments::new("%s has %d items")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1], Segment::Literal(" has "));
        assert_eq!(segments[3], Segment::Literal(" items"));
        match segments[2] {
            Segment::Spec { offset, spec } => {
                assert_eq!(offset, 7);
                assert_eq!(spec.conversion, Conversion::Signed);
            }
            other => panic!("expected a spec, got {other:?}"),
        }
    }

    #[test]
    fn test_segments_stop_after_error() {
        let mut segments = Segments::new("ok %y tail");
        assert_eq!(segments.next(), Some(Ok(Segment::Literal("ok "))));
        assert_eq!(
            segments.next(),
            Some(Err(FormatError::UnsupportedConversion {
                offset: 3,
                conversion: 'y'
            }))
        );
        assert_eq!(segments.next(), None);
    }

    #[test]
    fn test_unsupported_multibyte_conversion() {
        let err = Segments::new("%é").next().unwrap().unwrap_err();
        assert_eq!(
            err,
            FormatError::UnsupportedConversion {
                offset: 0,
                conversion: 'é'
            }
        );
    }
}
