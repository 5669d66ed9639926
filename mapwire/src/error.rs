//! Protobuf encoding, decoding and registration errors.

use std::error::Error;
use std::fmt;

use crate::encoding::WireType;

/// A Protobuf message decoding error.
///
/// `DecodeError` indicates that the input buffer does not contain valid
/// Protobuf wire data. The error details should be considered 'best effort':
/// in general it is not possible to exactly pinpoint why data is malformed.
///
/// A failed decode may leave the target message partially populated. Discard
/// it rather than assume the previous contents were restored.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodeError {
    inner: Box<Inner>,
}

#[derive(Clone, PartialEq, Eq)]
struct Inner {
    /// A 'best effort' root cause description.
    kind: DecodeErrorKind,
    /// Logical path to where the error occurred.
    ///
    /// Internally, this is a stack with an entry per level of nesting.
    path: Vec<ErrorPathSegment>,
}

impl DecodeError {
    /// Get details about the decode error.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.inner.kind
    }

    /// Get the location where the error occurred as a logical path, starting
    /// from the innermost field.
    pub fn path(&self) -> &[ErrorPathSegment] {
        &self.inner.path
    }

    /// Records the message field which was being decoded when the error occurred.
    #[doc(hidden)]
    pub fn push(&mut self, message: &'static str, field: &'static str) {
        self.inner.path.push(ErrorPathSegment { message, field });
    }
}

/// A segment identifying a specific Protobuf message field by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorPathSegment {
    message: &'static str,
    field: &'static str,
}

impl ErrorPathSegment {
    /// Get the protobuf message name.
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Get the protobuf field name.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

/// The root cause of a [`DecodeError`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// Length delimiter exceeds maximum usize value
    LengthDelimiterTooLarge,
    /// Invalid varint
    InvalidVarint,
    /// Recursion limit reached
    RecursionLimitReached,
    /// Invalid wire type value
    InvalidWireType { value: u64 },
    /// Invalid key value
    InvalidKey { key: u64 },
    /// Invalid tag value: 0
    InvalidTag,
    /// Wire type does not match the field's declared kind
    UnexpectedWireType {
        actual: WireType,
        expected: WireType,
    },
    /// Buffer underflow
    BufferUnderflow,
    /// Delimited length exceeded
    DelimitedLengthExceeded,
    /// Unexpected end group tag
    UnexpectedEndGroupTag,
    /// Invalid string value: data is not UTF-8 encoded
    InvalidString,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::LengthDelimiterTooLarge => {
                f.write_str("length delimiter exceeds maximum usize value")
            }
            DecodeErrorKind::InvalidVarint => f.write_str("invalid varint"),
            DecodeErrorKind::RecursionLimitReached => f.write_str("recursion limit reached"),
            DecodeErrorKind::InvalidWireType { value } => {
                write!(f, "invalid wire type value: {}", value)
            }
            DecodeErrorKind::InvalidKey { key } => write!(f, "invalid key value: {}", key),
            DecodeErrorKind::InvalidTag => f.write_str("invalid tag value: 0"),
            DecodeErrorKind::UnexpectedWireType { actual, expected } => {
                write!(f, "invalid wire type: {:?} (expected {:?})", actual, expected)
            }
            DecodeErrorKind::BufferUnderflow => f.write_str("buffer underflow"),
            DecodeErrorKind::DelimitedLengthExceeded => f.write_str("delimited length exceeded"),
            DecodeErrorKind::UnexpectedEndGroupTag => f.write_str("unexpected end group tag"),
            DecodeErrorKind::InvalidString => {
                f.write_str("invalid string value: data is not UTF-8 encoded")
            }
        }
    }
}

impl Error for DecodeErrorKind {}

impl From<DecodeErrorKind> for DecodeError {
    #[cold]
    fn from(kind: DecodeErrorKind) -> Self {
        DecodeError {
            inner: Box::new(Inner {
                kind,
                path: Vec::new(),
            }),
        }
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeError")
            .field("kind", &self.inner.kind)
            .field("path", &self.inner.path)
            .finish()
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to decode Protobuf message: ")?;
        for segment in self.path() {
            write!(f, "{}.{}: ", segment.message(), segment.field())?;
        }
        self.inner.kind.fmt(f)
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner.kind)
    }
}

impl From<DecodeError> for std::io::Error {
    fn from(error: DecodeError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidData, error)
    }
}

/// A Protobuf message encoding error.
///
/// `EncodeError` always indicates that a message failed to encode because the
/// provided buffer had insufficient capacity. Message encoding is otherwise
/// infallible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodeError {
    required: usize,
    remaining: usize,
}

impl EncodeError {
    /// Creates a new `EncodeError`.
    pub(crate) fn new(required: usize, remaining: usize) -> EncodeError {
        EncodeError {
            required,
            remaining,
        }
    }

    /// Returns the required buffer capacity to encode the message.
    pub fn required_capacity(&self) -> usize {
        self.required
    }

    /// Returns the remaining length in the provided buffer at the time of encoding.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to encode Protobuf message; insufficient buffer capacity (required: {}, remaining: {})",
            self.required, self.remaining
        )
    }
}

impl Error for EncodeError {}

impl From<EncodeError> for std::io::Error {
    fn from(error: EncodeError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, error)
    }
}

/// A message descriptor failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DescriptorError {
    /// The message has no fully-qualified name.
    EmptyName,
    /// A field number lies outside `MIN_TAG..=MAX_TAG`.
    InvalidFieldNumber {
        message: &'static str,
        number: u32,
    },
    /// Two fields share a number.
    DuplicateFieldNumber {
        message: &'static str,
        number: u32,
    },
    /// Two fields share a name.
    DuplicateFieldName {
        message: &'static str,
        name: &'static str,
    },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::EmptyName => f.write_str("message descriptor has an empty name"),
            DescriptorError::InvalidFieldNumber { message, number } => {
                write!(f, "{}: invalid field number {}", message, number)
            }
            DescriptorError::DuplicateFieldNumber { message, number } => {
                write!(f, "{}: field number {} is used more than once", message, number)
            }
            DescriptorError::DuplicateFieldName { message, name } => {
                write!(f, "{}: field name {:?} is used more than once", message, name)
            }
        }
    }
}

impl Error for DescriptorError {}

/// An error raised while populating or publishing the type registry.
///
/// Registration happens once, during process initialization. Every variant
/// indicates a configuration mistake rather than bad input data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two message types were registered under the same fully-qualified name.
    DuplicateType { name: String },
    /// Two file descriptors were registered under the same file name.
    DuplicateFile { name: String },
    /// A type was registered against a file which is not registered.
    UnknownFile { type_name: String, file: String },
    /// A registered descriptor failed validation.
    InvalidDescriptor(DescriptorError),
    /// The process-wide registry has already been published.
    AlreadyInitialized,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateType { name } => {
                write!(f, "message type {:?} is already registered", name)
            }
            RegistryError::DuplicateFile { name } => {
                write!(f, "file descriptor {:?} is already registered", name)
            }
            RegistryError::UnknownFile { type_name, file } => write!(
                f,
                "message type {:?} refers to unregistered file {:?}",
                type_name, file
            ),
            RegistryError::InvalidDescriptor(error) => {
                write!(f, "invalid message descriptor: {}", error)
            }
            RegistryError::AlreadyInitialized => f.write_str("registry is already initialized"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegistryError::InvalidDescriptor(error) => Some(error),
            _ => None,
        }
    }
}

impl From<DescriptorError> for RegistryError {
    fn from(error: DescriptorError) -> Self {
        RegistryError::InvalidDescriptor(error)
    }
}
