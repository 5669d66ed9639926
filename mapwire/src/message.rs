use std::fmt::Debug;

use bytes::{Buf, BufMut};

use crate::codec::{self, EncodeOptions};
use crate::descriptor::MessageDescriptor;
use crate::encoding::{decode_varint, encode_varint, encoded_len_varint, DecodeContext, WireType};
use crate::error::DecodeErrorKind;
use crate::value::{FieldMut, FieldRef};
use crate::{DecodeError, EncodeError};

/// A Protocol Buffers message.
///
/// Implementors describe their shape with a static [`MessageDescriptor`] and
/// hand out their fields by number. Encoding and decoding are provided by the
/// shared codec; a message type never contains wire-format logic of its own.
pub trait Message: Debug + Send + Sync {
    /// Returns the static description of this message type.
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// Returns shared access to the field with the given number.
    fn field(&self, number: u32) -> Option<FieldRef<'_>>;

    /// Returns exclusive access to the field with the given number.
    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>>;

    /// Clears the message, resetting all fields to their default.
    fn clear(&mut self);

    /// Resets the message to its zero value. Calling it again is a no-op.
    fn reset(&mut self) {
        self.clear()
    }

    /// Encodes the message to a buffer without checking capacity.
    ///
    /// Map entries are written in iteration order.
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        codec::encode(self, &EncodeOptions::default(), buf)
    }

    /// Decodes a field from a buffer, and merges it into `self`.
    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        codec::merge_field(self, tag, wire_type, buf, ctx)
    }

    /// Returns the encoded length of the message without a length delimiter.
    fn encoded_len(&self) -> usize {
        codec::encoded_len(self)
    }

    /// Encodes the message to a buffer.
    ///
    /// An error will be returned if the buffer does not have sufficient capacity.
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError>
    where
        Self: Sized,
    {
        self.encode_with(&EncodeOptions::default(), buf)
    }

    /// Encodes the message to a buffer using the given options.
    ///
    /// An error will be returned if the buffer does not have sufficient capacity.
    fn encode_with(
        &self,
        options: &EncodeOptions,
        buf: &mut impl BufMut,
    ) -> Result<(), EncodeError>
    where
        Self: Sized,
    {
        let required = self.encoded_len();
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::new(required, remaining));
        }

        codec::encode(self, options, buf);
        Ok(())
    }

    /// Encodes the message to a newly allocated buffer.
    fn encode_to_vec(&self) -> Vec<u8>
    where
        Self: Sized,
    {
        let mut buf = Vec::with_capacity(self.encoded_len());
        codec::encode(self, &EncodeOptions::default(), &mut buf);
        buf
    }

    /// Encodes the message with a length-delimiter to a buffer.
    ///
    /// An error will be returned if the buffer does not have sufficient capacity.
    fn encode_length_delimited(&self, buf: &mut impl BufMut) -> Result<(), EncodeError>
    where
        Self: Sized,
    {
        let len = self.encoded_len();
        let required = len + encoded_len_varint(len as u64);
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::new(required, remaining));
        }
        encode_varint(len as u64, buf);
        codec::encode(self, &EncodeOptions::default(), buf);
        Ok(())
    }

    /// Encodes the message with a length-delimiter to a newly allocated buffer.
    fn encode_length_delimited_to_vec(&self) -> Vec<u8>
    where
        Self: Sized,
    {
        let len = self.encoded_len();
        let mut buf = Vec::with_capacity(len + encoded_len_varint(len as u64));

        encode_varint(len as u64, &mut buf);
        codec::encode(self, &EncodeOptions::default(), &mut buf);
        buf
    }

    /// Decodes an instance of the message from a buffer.
    ///
    /// The entire buffer will be consumed.
    fn decode(mut buf: impl Buf) -> Result<Self, DecodeError>
    where
        Self: Default + Sized,
    {
        let mut message = Self::default();
        message.merge(&mut buf)?;
        Ok(message)
    }

    /// Decodes a length-delimited instance of the message from the buffer.
    fn decode_length_delimited(buf: impl Buf) -> Result<Self, DecodeError>
    where
        Self: Default + Sized,
    {
        let mut message = Self::default();
        message.merge_length_delimited(buf)?;
        Ok(message)
    }

    /// Decodes an instance of the message from a buffer, and merges it into `self`.
    ///
    /// The entire buffer will be consumed. On error `self` may hold the
    /// fields decoded before the failure.
    fn merge(&mut self, mut buf: impl Buf) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        codec::merge(self, &mut buf, DecodeContext::default())
    }

    /// Decodes a length-delimited instance of the message from buffer, and
    /// merges it into `self`.
    fn merge_length_delimited(&mut self, mut buf: impl Buf) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        let len = decode_varint(&mut buf)?;
        if len > buf.remaining() as u64 {
            return Err(DecodeErrorKind::BufferUnderflow.into());
        }
        codec::merge(self, &mut buf.take(len as usize), DecodeContext::default())
    }
}
