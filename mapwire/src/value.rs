//! Dynamically typed access to message fields.
//!
//! A message exposes each of its fields as a [`FieldRef`] or [`FieldMut`].
//! Scalars are read as [`ValueRef`] and written as [`Value`]; maps are reached
//! through the object-safe [`MapField`] trait, implemented for `HashMap` and
//! `BTreeMap` over any [`MapKey`]/[`Scalar`] pair.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::descriptor::ScalarKind;

/// An owned scalar value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> ScalarKind {
        self.as_value_ref().kind()
    }

    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::String(value) => ValueRef::String(value),
            Value::Int32(value) => ValueRef::Int32(*value),
            Value::Int64(value) => ValueRef::Int64(*value),
            Value::Uint32(value) => ValueRef::Uint32(*value),
            Value::Uint64(value) => ValueRef::Uint64(*value),
            Value::Bool(value) => ValueRef::Bool(*value),
        }
    }
}

/// A borrowed scalar value.
///
/// Values of the same kind order the same way as the underlying Rust type, so
/// map keys can be sorted through this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueRef<'a> {
    String(&'a str),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
}

impl<'a> ValueRef<'a> {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ValueRef::String(_) => ScalarKind::String,
            ValueRef::Int32(_) => ScalarKind::Int32,
            ValueRef::Int64(_) => ScalarKind::Int64,
            ValueRef::Uint32(_) => ScalarKind::Uint32,
            ValueRef::Uint64(_) => ScalarKind::Uint64,
            ValueRef::Bool(_) => ScalarKind::Bool,
        }
    }

    /// Whether this is the zero value of its kind.
    pub fn is_default(&self) -> bool {
        match *self {
            ValueRef::String(value) => value.is_empty(),
            ValueRef::Int32(value) => value == 0,
            ValueRef::Int64(value) => value == 0,
            ValueRef::Uint32(value) => value == 0,
            ValueRef::Uint64(value) => value == 0,
            ValueRef::Bool(value) => !value,
        }
    }

    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::String(value) => Value::String(value.to_owned()),
            ValueRef::Int32(value) => Value::Int32(value),
            ValueRef::Int64(value) => Value::Int64(value),
            ValueRef::Uint32(value) => Value::Uint32(value),
            ValueRef::Uint64(value) => Value::Uint64(value),
            ValueRef::Bool(value) => Value::Bool(value),
        }
    }
}

/// A Rust type which stores one scalar kind.
pub trait Scalar: Default + PartialEq + Sized + Send + Sync + 'static {
    const KIND: ScalarKind;

    fn as_value_ref(&self) -> ValueRef<'_>;

    /// Converts an owned value back, handing it back if its kind differs.
    fn from_value(value: Value) -> Result<Self, Value>;
}

/// A scalar type usable as a map key.
pub trait MapKey: Scalar + Eq + Hash + Ord {}

macro_rules! scalar {
    ($ty:ty, $variant:ident) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            #[inline]
            fn as_value_ref(&self) -> ValueRef<'_> {
                ValueRef::$variant(*self)
            }

            #[inline]
            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(value) => Ok(value),
                    other => Err(other),
                }
            }
        }

        impl MapKey for $ty {}
    };
}

scalar!(i32, Int32);
scalar!(i64, Int64);
scalar!(u32, Uint32);
scalar!(u64, Uint64);
scalar!(bool, Bool);

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    #[inline]
    fn as_value_ref(&self) -> ValueRef<'_> {
        ValueRef::String(self)
    }

    #[inline]
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(value) => Ok(value),
            other => Err(other),
        }
    }
}

impl MapKey for String {}

/// Read/write access to a scalar field.
pub trait ScalarField {
    fn kind(&self) -> ScalarKind;

    fn get(&self) -> ValueRef<'_>;

    /// Stores `value`, returning it back if its kind does not match the field.
    fn set(&mut self, value: Value) -> Result<(), Value>;

    fn clear(&mut self);
}

impl<T: Scalar> ScalarField for T {
    fn kind(&self) -> ScalarKind {
        T::KIND
    }

    fn get(&self) -> ValueRef<'_> {
        self.as_value_ref()
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        *self = T::from_value(value)?;
        Ok(())
    }

    fn clear(&mut self) {
        *self = T::default();
    }
}

/// Iterator over the entries of a [`MapField`].
pub type Entries<'a> = Box<dyn Iterator<Item = (ValueRef<'a>, ValueRef<'a>)> + 'a>;

/// Read/write access to a map field.
pub trait MapField {
    fn key_kind(&self) -> ScalarKind;

    fn value_kind(&self) -> ScalarKind;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the entries in the map's own order.
    fn entries(&self) -> Entries<'_>;

    /// Inserts an entry, replacing any previous value for the key. The pair is
    /// handed back if either kind does not match the map.
    fn insert(&mut self, key: Value, value: Value) -> Result<(), (Value, Value)>;

    fn clear(&mut self);
}

fn convert_entry<K, V>(key: Value, value: Value) -> Result<(K, V), (Value, Value)>
where
    K: Scalar,
    V: Scalar,
{
    if key.kind() != K::KIND || value.kind() != V::KIND {
        return Err((key, value));
    }
    let key = K::from_value(key).map_err(|key| (key, value.clone()))?;
    let value = V::from_value(value).map_err(|value| (key.as_value_ref().to_value(), value))?;
    Ok((key, value))
}

impl<K, V, S> MapField for HashMap<K, V, S>
where
    K: MapKey,
    V: Scalar,
    S: BuildHasher,
{
    fn key_kind(&self) -> ScalarKind {
        K::KIND
    }

    fn value_kind(&self) -> ScalarKind {
        V::KIND
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key.as_value_ref(), value.as_value_ref())),
        )
    }

    fn insert(&mut self, key: Value, value: Value) -> Result<(), (Value, Value)> {
        let (key, value) = convert_entry::<K, V>(key, value)?;
        HashMap::insert(self, key, value);
        Ok(())
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }
}

impl<K, V> MapField for BTreeMap<K, V>
where
    K: MapKey,
    V: Scalar,
{
    fn key_kind(&self) -> ScalarKind {
        K::KIND
    }

    fn value_kind(&self) -> ScalarKind {
        V::KIND
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key.as_value_ref(), value.as_value_ref())),
        )
    }

    fn insert(&mut self, key: Value, value: Value) -> Result<(), (Value, Value)> {
        let (key, value) = convert_entry::<K, V>(key, value)?;
        BTreeMap::insert(self, key, value);
        Ok(())
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }
}

/// Shared access to one field of a message.
pub enum FieldRef<'a> {
    Scalar(&'a dyn ScalarField),
    Map(&'a dyn MapField),
}

/// Exclusive access to one field of a message.
pub enum FieldMut<'a> {
    Scalar(&'a mut dyn ScalarField),
    Map(&'a mut dyn MapField),
}
