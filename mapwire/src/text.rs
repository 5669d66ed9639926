//! Human-readable rendering of messages in the compact text format.
//!
//! The output is meant for logs and debugging only. Map entries are sorted by
//! key so the same message always renders the same way.

use std::fmt::Write;

use crate::codec::sorted_entries;
use crate::value::{FieldRef, ValueRef};
use crate::Message;

/// Renders the populated fields of `msg` on a single line, e.g.
/// `name:"a" properties:<key:"x" value:"1" >`.
pub fn to_compact_text<M>(msg: &M) -> String
where
    M: Message + ?Sized,
{
    let mut out = String::new();
    for field in msg.descriptor().fields {
        match msg.field(field.number) {
            Some(FieldRef::Scalar(value)) => {
                let value = value.get();
                if !value.is_default() {
                    separate(&mut out);
                    out.push_str(field.name);
                    out.push(':');
                    write_value(&mut out, value);
                }
            }
            Some(FieldRef::Map(values)) => {
                for (key, value) in sorted_entries(values) {
                    separate(&mut out);
                    out.push_str(field.name);
                    out.push_str(":<key:");
                    write_value(&mut out, key);
                    out.push_str(" value:");
                    write_value(&mut out, value);
                    out.push_str(" >");
                }
            }
            None => {}
        }
    }
    out
}

fn separate(out: &mut String) {
    if !out.is_empty() {
        out.push(' ');
    }
}

fn write_value(out: &mut String, value: ValueRef<'_>) {
    // Writing to a String cannot fail.
    let _ = match value {
        ValueRef::String(value) => {
            write_quoted(out, value);
            Ok(())
        }
        ValueRef::Int32(value) => write!(out, "{}", value),
        ValueRef::Int64(value) => write!(out, "{}", value),
        ValueRef::Uint32(value) => write!(out, "{}", value),
        ValueRef::Uint64(value) => write!(out, "{}", value),
        ValueRef::Bool(value) => write!(out, "{}", value),
    };
}

/// Quotes a string, escaping quotes, backslashes and control characters, and
/// writing every byte outside printable ASCII as a three digit octal escape.
fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    for &byte in value.as_bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out.push('"');
}
