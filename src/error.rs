
//! Error type definitions.

use std::borrow::Cow;
use std::convert::TryFrom;
use std::error;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;

use crate::meta::attribute::Text;


/// A result that may contain an exr header error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains an exr header error.
pub type UnitResult = Result<()>;


/// An error that may happen while reading an exr header.
/// Distinguishes between the kinds of failure a tool may want to report differently.
#[derive(Debug)]
pub enum Error {

    /// The specified path does not exist.
    /// No file handle has been kept open.
    NotFound(PathBuf),

    /// The byte source ended before a value was read completely.
    UnexpectedEndOfStream,

    /// The header contains an attribute with a type name
    /// that this crate does not know how to decode.
    UnsupportedAttributeType(Text),

    /// The header is structurally broken,
    /// for example a size-prefixed list running past its declared size.
    Malformed(Cow<'static, str>),

    /// Any other failure of the underlying byte source.
    Io(IoError),
}


impl Error {

    /// Create an error of the variant `Malformed`.
    pub(crate) fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Malformed(message.into())
    }

    /// Whether this error was caused by a broken or truncated header,
    /// as opposed to a missing file or an unknown attribute type.
    pub fn is_damaged_header(&self) -> bool {
        matches!(self, Error::UnexpectedEndOfStream | Error::Malformed(_))
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::UnexpectedEndOfStream
        }
        else {
            Error::Io(error)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(path) => write!(formatter, "file not found: {}", path.display()),
            Error::UnexpectedEndOfStream => formatter.write_str("unexpected end of stream"),
            Error::UnsupportedAttributeType(kind) => write!(formatter, "unsupported attribute type `{}`", kind),
            Error::Malformed(message) => write!(formatter, "malformed header: {}", message),
            Error::Io(error) => error.fmt(formatter),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}


/// Return an error on negative sizes, instead of wrapping around.
#[inline]
pub(crate) fn i32_to_usize(value: i32, error_message: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::malformed(error_message))
}
