//! Descriptor-driven message encoding and decoding.
//!
//! Every [`Message`] shares this one implementation. Fields are visited in
//! descriptor order through [`Message::field`] and [`Message::field_mut`], so a
//! message type only has to describe itself and hand out its fields.

use bytes::{Buf, BufMut};
use log::trace;

use crate::encoding::{decode_key, map, scalar, skip_field, DecodeContext, WireType};
use crate::value::{FieldMut, FieldRef, MapField, ValueRef};
use crate::{DecodeError, Message};

/// Options controlling how messages are encoded.
///
/// ```
/// use mapwire::EncodeOptions;
///
/// let mut options = EncodeOptions::new();
/// options.deterministic(true);
/// assert!(options.is_deterministic());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    deterministic: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        EncodeOptions::default()
    }

    /// Emit map entries in ascending key order.
    ///
    /// By default entries are written in the map's iteration order, so two
    /// logically equal `HashMap`s may encode to different bytes. With this
    /// option set, equal messages always encode identically.
    pub fn deterministic(&mut self, enabled: bool) -> &mut Self {
        self.deterministic = enabled;
        self
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }
}

/// Writes every populated field of `msg` to `buf`.
///
/// Scalars holding their zero value and empty maps produce no bytes.
pub fn encode<M, B>(msg: &M, options: &EncodeOptions, buf: &mut B)
where
    M: Message + ?Sized,
    B: BufMut,
{
    for field in msg.descriptor().fields {
        match msg.field(field.number) {
            Some(FieldRef::Scalar(value)) => {
                let value = value.get();
                if !value.is_default() {
                    scalar::encode(field.number, value, buf);
                }
            }
            Some(FieldRef::Map(values)) => encode_map(field.number, values, options, buf),
            None => {}
        }
    }
}

fn encode_map<B>(tag: u32, values: &dyn MapField, options: &EncodeOptions, buf: &mut B)
where
    B: BufMut,
{
    if options.deterministic {
        for (key, value) in sorted_entries(values) {
            map::encode_entry(tag, key, value, buf);
        }
    } else {
        for (key, value) in values.entries() {
            map::encode_entry(tag, key, value, buf);
        }
    }
}

/// Returns the entries of a map field ordered by key.
pub(crate) fn sorted_entries(values: &dyn MapField) -> Vec<(ValueRef<'_>, ValueRef<'_>)> {
    let mut entries: Vec<_> = values.entries().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Returns the number of bytes [`encode`] writes for `msg`. Entry order does
/// not affect the length, so this holds for every [`EncodeOptions`].
pub fn encoded_len<M>(msg: &M) -> usize
where
    M: Message + ?Sized,
{
    msg.descriptor()
        .fields
        .iter()
        .map(|field| match msg.field(field.number) {
            Some(FieldRef::Scalar(value)) => {
                let value = value.get();
                if value.is_default() {
                    0
                } else {
                    scalar::encoded_len(field.number, value)
                }
            }
            Some(FieldRef::Map(values)) => values
                .entries()
                .map(|(key, value)| map::entry_encoded_len(field.number, key, value))
                .sum(),
            None => 0,
        })
        .sum()
}

/// Decodes one field occurrence into `msg`.
///
/// Scalars take the last value seen. Each map entry is inserted on arrival,
/// replacing an earlier entry with the same key. Unknown field numbers are
/// skipped.
pub fn merge_field<M, B>(
    msg: &mut M,
    tag: u32,
    wire_type: WireType,
    buf: &mut B,
    ctx: DecodeContext,
) -> Result<(), DecodeError>
where
    M: Message + ?Sized,
    B: Buf,
{
    let descriptor = msg.descriptor();
    let field_name = descriptor.field(tag).map_or("", |field| field.name);

    let result = match msg.field_mut(tag) {
        Some(FieldMut::Scalar(slot)) => {
            let mut value = slot.kind().default_value();
            scalar::merge(wire_type, &mut value, buf, ctx).map(|()| {
                // The value was decoded as the slot's own kind.
                let _ = slot.set(value);
            })
        }
        Some(FieldMut::Map(values)) => {
            map::merge_entry(values.key_kind(), values.value_kind(), wire_type, buf, ctx).map(
                |(key, value)| {
                    let _ = values.insert(key, value);
                },
            )
        }
        None => {
            trace!(
                "{}: skipping unknown field {} ({:?})",
                descriptor.full_name,
                tag,
                wire_type
            );
            return skip_field(wire_type, tag, buf, ctx);
        }
    };

    result.map_err(|mut error| {
        error.push(descriptor.name(), field_name);
        error
    })
}

/// Decodes fields from `buf` into `msg` until the buffer is exhausted.
pub fn merge<M, B>(msg: &mut M, buf: &mut B, ctx: DecodeContext) -> Result<(), DecodeError>
where
    M: Message + ?Sized,
    B: Buf,
{
    while buf.has_remaining() {
        let (tag, wire_type) = decode_key(buf)?;
        merge_field(msg, tag, wire_type, buf, ctx.clone())?;
    }
    Ok(())
}
