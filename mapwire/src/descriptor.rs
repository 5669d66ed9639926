//! Static metadata describing the shape of message types.
//!
//! Generated code places one [`MessageDescriptor`] per message type in a
//! `static`. The generic codec in [`crate::codec`] walks it to encode and
//! decode any message without per-type wire logic.

use std::collections::HashSet;
use std::fmt;

use crate::encoding::{WireType, MAX_TAG, MIN_TAG};
use crate::error::DescriptorError;
use crate::value::Value;

/// The scalar types a field, map key or map value may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Bool,
}

impl ScalarKind {
    /// The wire type used to encode a value of this kind.
    pub const fn wire_type(self) -> WireType {
        match self {
            ScalarKind::String => WireType::LengthDelimited,
            _ => WireType::Varint,
        }
    }

    /// The type name as written in a `.proto` file.
    pub const fn proto_name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Bool => "bool",
        }
    }

    /// The zero value of this kind.
    pub fn default_value(self) -> Value {
        match self {
            ScalarKind::String => Value::String(String::new()),
            ScalarKind::Int32 => Value::Int32(0),
            ScalarKind::Int64 => Value::Int64(0),
            ScalarKind::Uint32 => Value::Uint32(0),
            ScalarKind::Uint64 => Value::Uint64(0),
            ScalarKind::Bool => Value::Bool(false),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proto_name())
    }
}

/// The logical type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// A `map<key, value>` field, encoded as repeated key/value entries.
    Map { key: ScalarKind, value: ScalarKind },
}

impl FieldKind {
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldKind::Scalar(kind) => kind.wire_type(),
            FieldKind::Map { .. } => WireType::LengthDelimited,
        }
    }
}

/// One field of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn scalar(number: u32, name: &'static str, kind: ScalarKind) -> FieldDescriptor {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Scalar(kind),
        }
    }

    pub const fn map(
        number: u32,
        name: &'static str,
        key: ScalarKind,
        value: ScalarKind,
    ) -> FieldDescriptor {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Map { key, value },
        }
    }

    pub const fn wire_type(&self) -> WireType {
        self.kind.wire_type()
    }
}

/// The shape of one message type: its fully-qualified name and its fields in
/// declaration order.
#[derive(Debug, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Dot-separated name including the package, e.g. `test.MapTest`.
    pub full_name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    pub const fn new(full_name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        MessageDescriptor { full_name, fields }
    }

    /// The message name without its package.
    pub fn name(&self) -> &'static str {
        match self.full_name.rfind('.') {
            Some(idx) => &self.full_name[idx + 1..],
            None => self.full_name,
        }
    }

    /// The package, or the empty string for messages outside any package.
    pub fn package(&self) -> &'static str {
        match self.full_name.rfind('.') {
            Some(idx) => &self.full_name[..idx],
            None => "",
        }
    }

    pub fn field(&self, number: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Checks that field numbers are in range and that numbers and names are
    /// unique within the message.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.full_name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        let mut numbers = HashSet::with_capacity(self.fields.len());
        let mut names = HashSet::with_capacity(self.fields.len());
        for field in self.fields {
            if !(MIN_TAG..=MAX_TAG).contains(&field.number) {
                return Err(DescriptorError::InvalidFieldNumber {
                    message: self.full_name,
                    number: field.number,
                });
            }
            if !numbers.insert(field.number) {
                return Err(DescriptorError::DuplicateFieldNumber {
                    message: self.full_name,
                    number: field.number,
                });
            }
            if !names.insert(field.name) {
                return Err(DescriptorError::DuplicateFieldName {
                    message: self.full_name,
                    name: field.name,
                });
            }
        }
        Ok(())
    }
}
