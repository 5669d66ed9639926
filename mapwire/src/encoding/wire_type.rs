use crate::error::DecodeErrorKind;
use crate::DecodeError;

/// The low three bits of a field key, telling a reader how to find the end
/// of the field's payload.
///
/// Discriminants are the values written on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    /// `int32`, `int64`, `uint32`, `uint64`, `bool` and enums.
    Varint = 0,
    SixtyFourBit = 1,
    /// Strings, bytes, embedded messages and map entries.
    LengthDelimited = 2,
    /// Deprecated proto2 groups; only ever skipped.
    StartGroup = 3,
    EndGroup = 4,
    ThirtyTwoBit = 5,
}

const WIRE_TYPES: [WireType; 6] = [
    WireType::Varint,
    WireType::SixtyFourBit,
    WireType::LengthDelimited,
    WireType::StartGroup,
    WireType::EndGroup,
    WireType::ThirtyTwoBit,
];

impl TryFrom<u64> for WireType {
    type Error = DecodeError;

    #[inline]
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| WIRE_TYPES.get(idx).copied())
            .ok_or_else(|| DecodeErrorKind::InvalidWireType { value }.into())
    }
}

/// Fails with `UnexpectedWireType` unless a field arrived as `expected`.
#[inline]
pub fn check_wire_type(expected: WireType, actual: WireType) -> Result<(), DecodeError> {
    if actual == expected {
        Ok(())
    } else {
        Err(DecodeErrorKind::UnexpectedWireType { actual, expected }.into())
    }
}
