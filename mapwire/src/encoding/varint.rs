//! Base 128 varints: seven payload bits per byte, least significant group
//! first, high bit set on every byte but the last.

use bytes::{Buf, BufMut};

use crate::error::DecodeErrorKind;
use crate::DecodeError;

/// A `u64` never needs more than ten groups of seven bits.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends `value` to `buf`. `buf` must have room for up to
/// [`MAX_VARINT_LEN`] bytes.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8(value as u8 | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes [`encode_varint`] writes for `value`, from 1 to 10.
#[inline]
pub fn encoded_len_varint(value: u64) -> usize {
    // Significant bits, rounded up to whole groups of seven; zero still takes
    // one byte.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Reads one varint from the front of `buf`.
///
/// Fails with `InvalidVarint` when the buffer ends mid-varint, when the
/// varint runs past ten bytes, or when its value does not fit in a `u64`.
#[inline]
pub fn decode_varint(buf: &mut impl Buf) -> Result<u64, DecodeError> {
    let chunk = buf.chunk();
    match chunk.first() {
        None => Err(DecodeErrorKind::InvalidVarint.into()),
        Some(&byte) if byte < 0x80 => {
            buf.advance(1);
            Ok(u64::from(byte))
        }
        // The whole varint is in this chunk if a terminating byte is, or if
        // the chunk is long enough to hit the length limit.
        Some(_) if chunk.len() > MAX_VARINT_LEN || chunk[chunk.len() - 1] < 0x80 => {
            let (value, len) = decode_from_slice(chunk)?;
            buf.advance(len);
            Ok(value)
        }
        Some(_) => decode_bytewise(buf),
    }
}

/// Adds one seven bit group to `value`. Returns `Some` once the varint is
/// complete.
#[inline]
fn accumulate(value: &mut u64, group: usize, byte: u8) -> Option<Result<u64, DecodeError>> {
    *value |= u64::from(byte & 0x7F) << (group * 7);
    if byte & 0x80 != 0 {
        return None;
    }
    // Only the lowest bit of the tenth group fits in a u64.
    if group == MAX_VARINT_LEN - 1 && byte > 0x01 {
        return Some(Err(DecodeErrorKind::InvalidVarint.into()));
    }
    Some(Ok(*value))
}

fn decode_from_slice(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value = 0;
    for (group, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        if let Some(result) = accumulate(&mut value, group, byte) {
            return result.map(|value| (value, group + 1));
        }
    }
    Err(DecodeErrorKind::InvalidVarint.into())
}

/// Handles varints split across chunks of a non-contiguous buffer.
#[cold]
#[inline(never)]
fn decode_bytewise(buf: &mut impl Buf) -> Result<u64, DecodeError> {
    let mut value = 0;
    for group in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            break;
        }
        if let Some(result) = accumulate(&mut value, group, buf.get_u8()) {
            return result;
        }
    }
    Err(DecodeErrorKind::InvalidVarint.into())
}
