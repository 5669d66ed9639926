//! Utility functions and types for encoding and decoding Protobuf wire data.
//!
//! These are the primitives the descriptor-driven codec is built from. They are
//! public so that hand-written `Message` implementations can use them too.

use bytes::{Buf, BufMut};

use crate::error::DecodeErrorKind;
use crate::value::{Value, ValueRef};
use crate::{DecodeError, EncodeError};

pub mod varint;
pub use varint::{decode_varint, encode_varint, encoded_len_varint};

pub mod wire_type;
pub use wire_type::{check_wire_type, WireType};

/// Additional information passed to every decode/merge function.
///
/// The context should be passed by value and can be freely cloned. When passing
/// to a function which is decoding a nested object, then use `enter_recursion`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "no-recursion-limit", derive(Default))]
pub struct DecodeContext {
    /// How many times we can recurse in the current decode stack before we hit
    /// the recursion limit.
    ///
    /// The recursion limit is defined by `RECURSION_LIMIT` and cannot be
    /// customized. It can be ignored by building with the `no-recursion-limit`
    /// feature.
    #[cfg(not(feature = "no-recursion-limit"))]
    recurse_count: u32,
}

#[cfg(not(feature = "no-recursion-limit"))]
impl Default for DecodeContext {
    #[inline]
    fn default() -> DecodeContext {
        DecodeContext {
            recurse_count: crate::RECURSION_LIMIT,
        }
    }
}

impl DecodeContext {
    /// Call this function before recursively decoding.
    ///
    /// There is no `exit` function since this function creates a new `DecodeContext`
    /// to be used at the next level of recursion. Continue to use the old context
    /// at the previous level of recursion.
    #[cfg(not(feature = "no-recursion-limit"))]
    #[inline]
    pub(crate) fn enter_recursion(&self) -> DecodeContext {
        DecodeContext {
            recurse_count: self.recurse_count.saturating_sub(1),
        }
    }

    #[cfg(feature = "no-recursion-limit")]
    #[inline]
    pub(crate) fn enter_recursion(&self) -> DecodeContext {
        DecodeContext {}
    }

    /// Returns `Err<DecodeError>` if the recursion limit has been reached.
    #[cfg(not(feature = "no-recursion-limit"))]
    #[inline]
    pub(crate) fn limit_reached(&self) -> Result<(), DecodeError> {
        if self.recurse_count == 0 {
            Err(DecodeErrorKind::RecursionLimitReached.into())
        } else {
            Ok(())
        }
    }

    #[cfg(feature = "no-recursion-limit")]
    #[inline]
    #[allow(clippy::unnecessary_wraps)] // needed in other features
    pub(crate) fn limit_reached(&self) -> Result<(), DecodeError> {
        Ok(())
    }
}

pub const MIN_TAG: u32 = 1;
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Encodes a Protobuf field key, which consists of a wire type designator and
/// the field tag.
#[inline]
pub fn encode_key(tag: u32, wire_type: WireType, buf: &mut impl BufMut) {
    debug_assert!((MIN_TAG..=MAX_TAG).contains(&tag));
    let key = (tag << 3) | wire_type as u32;
    encode_varint(u64::from(key), buf);
}

/// Decodes a Protobuf field key, which consists of a wire type designator and
/// the field tag.
#[inline(always)]
pub fn decode_key(buf: &mut impl Buf) -> Result<(u32, WireType), DecodeError> {
    let key = decode_varint(buf)?;
    if key > u64::from(u32::MAX) {
        return Err(DecodeErrorKind::InvalidKey { key }.into());
    }
    let wire_type = WireType::try_from(key & 0x07)?;
    let tag = key as u32 >> 3;

    if tag < MIN_TAG {
        return Err(DecodeErrorKind::InvalidTag.into());
    }

    Ok((tag, wire_type))
}

/// Returns the width of an encoded Protobuf field key with the given tag.
/// The returned width will be between 1 and 5 bytes (inclusive).
#[inline]
pub fn key_len(tag: u32) -> usize {
    encoded_len_varint(u64::from(tag << 3))
}

/// Helper function which abstracts reading a length delimiter prefix followed
/// by decoding values until the length of bytes is exhausted.
pub fn merge_loop<T, M, B>(
    value: &mut T,
    buf: &mut B,
    ctx: DecodeContext,
    mut merge: M,
) -> Result<(), DecodeError>
where
    M: FnMut(&mut T, &mut B, DecodeContext) -> Result<(), DecodeError>,
    B: Buf,
{
    let len = decode_varint(buf)?;
    let remaining = buf.remaining();
    if len > remaining as u64 {
        return Err(DecodeErrorKind::BufferUnderflow.into());
    }

    let limit = remaining - len as usize;
    while buf.remaining() > limit {
        merge(value, buf, ctx.clone())?;
    }

    if buf.remaining() != limit {
        return Err(DecodeErrorKind::DelimitedLengthExceeded.into());
    }
    Ok(())
}

/// Skips over a field the reader does not know about.
pub fn skip_field(
    wire_type: WireType,
    tag: u32,
    buf: &mut impl Buf,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    ctx.limit_reached()?;
    let len = match wire_type {
        WireType::Varint => decode_varint(buf).map(|_| 0)?,
        WireType::ThirtyTwoBit => 4,
        WireType::SixtyFourBit => 8,
        WireType::LengthDelimited => decode_varint(buf)?,
        WireType::StartGroup => loop {
            let (inner_tag, inner_wire_type) = decode_key(buf)?;
            match inner_wire_type {
                WireType::EndGroup => {
                    if inner_tag != tag {
                        return Err(DecodeErrorKind::UnexpectedEndGroupTag.into());
                    }
                    break 0;
                }
                _ => skip_field(inner_wire_type, inner_tag, buf, ctx.enter_recursion())?,
            }
        },
        WireType::EndGroup => return Err(DecodeErrorKind::UnexpectedEndGroupTag.into()),
    };

    if len > buf.remaining() as u64 {
        return Err(DecodeErrorKind::BufferUnderflow.into());
    }

    buf.advance(len as usize);
    Ok(())
}

/// Macro which emits a module containing a set of encoding functions for a
/// variable width numeric type.
macro_rules! varint {
    ($ty:ty,
     $proto_ty:ident) => (
        varint!($ty,
                $proto_ty,
                to_uint64(value) { *value as u64 },
                from_uint64(value) { value as $ty });
    );

    ($ty:ty,
     $proto_ty:ident,
     to_uint64($to_uint64_value:ident) $to_uint64:expr,
     from_uint64($from_uint64_value:ident) $from_uint64:expr) => (

         pub mod $proto_ty {
            use crate::encoding::*;

            pub fn encode(tag: u32, $to_uint64_value: &$ty, buf: &mut impl BufMut) {
                encode_key(tag, WireType::Varint, buf);
                encode_varint($to_uint64, buf);
            }

            pub fn merge(wire_type: WireType, value: &mut $ty, buf: &mut impl Buf, _ctx: DecodeContext) -> Result<(), DecodeError> {
                check_wire_type(WireType::Varint, wire_type)?;
                let $from_uint64_value = decode_varint(buf)?;
                *value = $from_uint64;
                Ok(())
            }

            #[inline]
            pub fn encoded_len(tag: u32, $to_uint64_value: &$ty) -> usize {
                key_len(tag) + encoded_len_varint($to_uint64)
            }

         }

    );
}
varint!(bool, bool,
        to_uint64(value) u64::from(*value),
        from_uint64(value) value != 0);
varint!(i32, int32);
varint!(i64, int64);
varint!(u32, uint32);
varint!(u64, uint64);

pub mod string {
    use super::*;

    pub fn encode(tag: u32, value: &str, buf: &mut impl BufMut) {
        encode_key(tag, WireType::LengthDelimited, buf);
        encode_varint(value.len() as u64, buf);
        buf.put_slice(value.as_bytes());
    }

    /// Replaces `value` with the decoded string.
    ///
    /// On any error `value` is left empty, so a string field never holds
    /// partially read or non-UTF-8 data.
    pub fn merge(
        wire_type: WireType,
        value: &mut String,
        buf: &mut impl Buf,
        _ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        value.clear();
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let len = decode_varint(buf)?;
        if len > buf.remaining() as u64 {
            return Err(DecodeErrorKind::BufferUnderflow.into());
        }

        let mut bytes = Vec::with_capacity(len as usize);
        bytes.put(buf.take(len as usize));
        match String::from_utf8(bytes) {
            Ok(decoded) => {
                *value = decoded;
                Ok(())
            }
            Err(_) => Err(DecodeErrorKind::InvalidString.into()),
        }
    }

    #[inline]
    pub fn encoded_len(tag: u32, value: &str) -> usize {
        key_len(tag) + encoded_len_varint(value.len() as u64) + value.len()
    }

}

/// Encoding functions dispatching on a dynamically typed scalar.
pub mod scalar {
    use super::*;

    pub fn encode(tag: u32, value: ValueRef<'_>, buf: &mut impl BufMut) {
        match value {
            ValueRef::String(value) => string::encode(tag, value, buf),
            ValueRef::Int32(value) => int32::encode(tag, &value, buf),
            ValueRef::Int64(value) => int64::encode(tag, &value, buf),
            ValueRef::Uint32(value) => uint32::encode(tag, &value, buf),
            ValueRef::Uint64(value) => uint64::encode(tag, &value, buf),
            ValueRef::Bool(value) => bool::encode(tag, &value, buf),
        }
    }

    /// Decodes into `value`, using its current variant as the expected kind.
    pub fn merge(
        wire_type: WireType,
        value: &mut Value,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        match value {
            Value::String(value) => string::merge(wire_type, value, buf, ctx),
            Value::Int32(value) => int32::merge(wire_type, value, buf, ctx),
            Value::Int64(value) => int64::merge(wire_type, value, buf, ctx),
            Value::Uint32(value) => uint32::merge(wire_type, value, buf, ctx),
            Value::Uint64(value) => uint64::merge(wire_type, value, buf, ctx),
            Value::Bool(value) => bool::merge(wire_type, value, buf, ctx),
        }
    }

    #[inline]
    pub fn encoded_len(tag: u32, value: ValueRef<'_>) -> usize {
        match value {
            ValueRef::String(value) => string::encoded_len(tag, value),
            ValueRef::Int32(value) => int32::encoded_len(tag, &value),
            ValueRef::Int64(value) => int64::encoded_len(tag, &value),
            ValueRef::Uint32(value) => uint32::encoded_len(tag, &value),
            ValueRef::Uint64(value) => uint64::encoded_len(tag, &value),
            ValueRef::Bool(value) => bool::encoded_len(tag, &value),
        }
    }
}

/// Map fields are encoded as one length-delimited entry per key/value pair,
/// each entry an implicit message with the key at tag 1 and the value at tag 2.
pub mod map {
    use super::*;
    use crate::descriptor::ScalarKind;

    const KEY_TAG: u32 = 1;
    const VALUE_TAG: u32 = 2;

    #[inline]
    fn entry_body_len(key: ValueRef<'_>, value: ValueRef<'_>) -> usize {
        scalar::encoded_len(KEY_TAG, key) + scalar::encoded_len(VALUE_TAG, value)
    }

    /// Writes one map entry. The key and value are always written, even when
    /// they hold their kind's zero value.
    pub fn encode_entry(tag: u32, key: ValueRef<'_>, value: ValueRef<'_>, buf: &mut impl BufMut) {
        encode_key(tag, WireType::LengthDelimited, buf);
        encode_varint(entry_body_len(key, value) as u64, buf);
        scalar::encode(KEY_TAG, key, buf);
        scalar::encode(VALUE_TAG, value, buf);
    }

    #[inline]
    pub fn entry_encoded_len(tag: u32, key: ValueRef<'_>, value: ValueRef<'_>) -> usize {
        let len = entry_body_len(key, value);
        key_len(tag) + encoded_len_varint(len as u64) + len
    }

    /// Reads one map entry. A missing key or value takes its kind's zero value;
    /// unknown tags inside the entry are skipped.
    pub fn merge_entry<B>(
        key_kind: ScalarKind,
        value_kind: ScalarKind,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(Value, Value), DecodeError>
    where
        B: Buf,
    {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        ctx.limit_reached()?;

        let mut entry = (key_kind.default_value(), value_kind.default_value());
        merge_loop(
            &mut entry,
            buf,
            ctx.enter_recursion(),
            |entry: &mut (Value, Value), buf: &mut B, ctx| {
                let (tag, wire_type) = decode_key(buf)?;
                match tag {
                    KEY_TAG => scalar::merge(wire_type, &mut entry.0, buf, ctx),
                    VALUE_TAG => scalar::merge(wire_type, &mut entry.1, buf, ctx),
                    _ => skip_field(wire_type, tag, buf, ctx),
                }
            },
        )?;
        Ok(entry)
    }
}

/// Encodes a length delimiter to the buffer.
///
/// See [`crate::Message::encode_length_delimited`] for more info.
///
/// An error will be returned if the buffer does not have sufficient capacity to encode the
/// delimiter.
pub fn encode_length_delimiter(length: usize, buf: &mut impl BufMut) -> Result<(), EncodeError> {
    let length = length as u64;
    let required = encoded_len_varint(length);
    let remaining = buf.remaining_mut();
    if required > remaining {
        return Err(EncodeError::new(required, remaining));
    }
    encode_varint(length, buf);
    Ok(())
}

/// Returns the encoded length of a length delimiter.
///
/// Applications may use this method to ensure sufficient buffer capacity before calling
/// `encode_length_delimiter`. The returned size will be between 1 and 10, inclusive.
pub fn length_delimiter_len(length: usize) -> usize {
    encoded_len_varint(length as u64)
}

/// Decodes a length delimiter from the buffer.
///
/// This method allows the length delimiter to be decoded independently of the message, when the
/// message is encoded with [`crate::Message::encode_length_delimited`].
pub fn decode_length_delimiter(mut buf: impl Buf) -> Result<usize, DecodeError> {
    let length = decode_varint(&mut buf)?;
    if length > usize::MAX as u64 {
        return Err(DecodeErrorKind::LengthDelimiterTooLarge.into());
    }
    Ok(length as usize)
}
