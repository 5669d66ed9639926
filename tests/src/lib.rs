#![allow(clippy::unreadable_literal)]

use anyhow::{ensure, Context, Result};
use bytes::Buf;
use mapwire::{EncodeOptions, Message};

pub mod registry;

#[cfg(test)]
mod decode_error;
#[cfg(test)]
mod map_encoding;

/// Encodes `msg`, decodes the result into a fresh message and checks that the
/// two are equal and that the reported length was exact.
pub fn roundtrip<M>(msg: &M) -> Result<Vec<u8>>
where
    M: Message + Default + PartialEq,
{
    let buf = msg.encode_to_vec();
    ensure!(
        buf.len() == msg.encoded_len(),
        "encoded_len {} does not match encoded length {}",
        msg.encoded_len(),
        buf.len()
    );

    let decoded = M::decode(buf.as_slice()).context("failed to decode encoded message")?;
    ensure!(
        &decoded == msg,
        "roundtrip mismatch:\n original: {:?}\n decoded:  {:?}",
        msg,
        decoded
    );
    Ok(buf)
}

/// Encodes `msg` with entries sorted by key.
pub fn encode_deterministic<M>(msg: &M) -> Result<Vec<u8>>
where
    M: Message,
{
    let mut options = EncodeOptions::new();
    options.deterministic(true);
    let mut buf = Vec::with_capacity(msg.encoded_len());
    msg.encode_with(&options, &mut buf)?;
    Ok(buf)
}

/// Splits encoded message bytes into `(field number, payload)` pairs for
/// length-delimited fields, failing on any other wire type.
pub fn length_delimited_fields(mut buf: &[u8]) -> Result<Vec<(u32, Vec<u8>)>> {
    let mut fields = Vec::new();
    while buf.has_remaining() {
        let (tag, wire_type) = mapwire::encoding::decode_key(&mut buf)?;
        ensure!(
            wire_type == mapwire::encoding::WireType::LengthDelimited,
            "field {} has wire type {:?}",
            tag,
            wire_type
        );
        let len = mapwire::decode_length_delimiter(&mut buf)?;
        ensure!(len <= buf.remaining(), "field {} overruns the buffer", tag);
        fields.push((tag, buf[..len].to_vec()));
        buf.advance(len);
    }
    Ok(fields)
}

#[cfg(test)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
