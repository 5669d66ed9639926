#![doc = include_str!("../README.md")]

// Re-export the bytes crate for use within generated code.
pub use bytes;

mod error;
mod map_view;
mod message;
mod name;

pub mod codec;
pub mod descriptor;
#[doc(hidden)]
pub mod encoding;
pub mod registry;
pub mod text;
pub mod value;

pub use crate::codec::EncodeOptions;
pub use crate::encoding::{decode_length_delimiter, encode_length_delimiter, length_delimiter_len};
pub use crate::error::{
    DecodeError, DecodeErrorKind, DescriptorError, EncodeError, ErrorPathSegment, RegistryError,
};
pub use crate::map_view::MapView;
pub use crate::message::Message;
pub use crate::name::Name;

// See `encoding::DecodeContext` for more info.
// 100 is the default recursion limit in the C++ implementation.
#[cfg(not(feature = "no-recursion-limit"))]
const RECURSION_LIMIT: u32 = 100;
