use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

/// One normalized argument of a printf-style render.
///
/// Integers remember the bit width of the type they came from so that
/// `%x` of `-1i32` prints `ffffffff` while `%x` of `-1i64` prints sixteen
/// `f`s, matching what the C conversion routines do with their promoted
/// arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FmtArg<'a> {
    Int(i64, u32),
    Uint(u64, u32),
    Float(f64),
    Char(char),
    Str(&'a str),
    Ptr(usize),
}

impl FmtArg<'_> {
    /// Short human name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            FmtArg::Int(..) => "a signed integer",
            FmtArg::Uint(..) => "an unsigned integer",
            FmtArg::Float(_) => "a float",
            FmtArg::Char(_) => "a char",
            FmtArg::Str(_) => "a string",
            FmtArg::Ptr(_) => "a pointer",
        }
    }
}

/// Projects a value onto the argument model used by the renderer.
///
/// This is a borrow, never a conversion: string-like types hand out a view of
/// their own bytes and scalars are copied, so normalizing an argument list
/// never allocates.
pub trait AsFmtArg {
    fn as_fmt_arg(&self) -> FmtArg<'_>;
}

macro_rules! signed_args {
    ($($t:ty),*) => {$(
        impl AsFmtArg for $t {
            #[inline]
            fn as_fmt_arg(&self) -> FmtArg<'_> {
                FmtArg::Int(*self as i64, <$t>::BITS)
            }
        }
    )*};
}

macro_rules! unsigned_args {
    ($($t:ty),*) => {$(
        impl AsFmtArg for $t {
            #[inline]
            fn as_fmt_arg(&self) -> FmtArg<'_> {
                FmtArg::Uint(*self as u64, <$t>::BITS)
            }
        }
    )*};
}

signed_args!(i8, i16, i32, i64, isize);
unsigned_args!(u8, u16, u32, u64, usize);

// C promotes bool to int.
impl AsFmtArg for bool {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Int(*self as i64, 32)
    }
}

impl AsFmtArg for f32 {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Float(f64::from(*self))
    }
}

impl AsFmtArg for f64 {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Float(*self)
    }
}

impl AsFmtArg for char {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Char(*self)
    }
}

impl AsFmtArg for str {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Str(self)
    }
}

impl AsFmtArg for String {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Str(self.as_str())
    }
}

impl AsFmtArg for Cow<'_, str> {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Str(&**self)
    }
}

impl<T: ?Sized> AsFmtArg for *const T {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Ptr(self.cast::<()>() as usize)
    }
}

impl<T: ?Sized> AsFmtArg for *mut T {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        FmtArg::Ptr(self.cast::<()>() as usize)
    }
}

impl<'a> AsFmtArg for FmtArg<'a> {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        *self
    }
}

impl<T: AsFmtArg + ?Sized> AsFmtArg for &T {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        (**self).as_fmt_arg()
    }
}

impl<T: AsFmtArg + ?Sized> AsFmtArg for &mut T {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        (**self).as_fmt_arg()
    }
}

impl<T: AsFmtArg + ?Sized> AsFmtArg for Box<T> {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        (**self).as_fmt_arg()
    }
}

impl<T: AsFmtArg + ?Sized> AsFmtArg for Rc<T> {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        (**self).as_fmt_arg()
    }
}

impl<T: AsFmtArg + ?Sized> AsFmtArg for Arc<T> {
    #[inline]
    fn as_fmt_arg(&self) -> FmtArg<'_> {
        (**self).as_fmt_arg()
    }
}
