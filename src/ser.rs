//! Serde serializer producing an XML-RPC [`Value`].
//!
//! ## Mapping summary
//! - `bool` → `boolean`
//! - integers → `int` when they fit in 32 bits, otherwise an error
//! - `f32`, `f64` → `double` (finite values only)
//! - `char`, `&str`, `String` → `string`
//! - `&[u8]` via `serialize_bytes` (e.g. `serde_bytes`) → `base64`
//! - `None`, `()`, unit structs → `nil`; `Some(v)` → `v`
//! - sequences and tuples → `array`
//! - maps and structs → `struct`, members in field or iteration order
//! - unit variants → `string` holding the variant name
//! - other variants → one-member `struct` keyed by the variant name

use crate::error::{Error, Result};
use crate::value::{Member, Value, ValueType};
use serde::ser::{self, Serialize};

// ── Public entry points ────────────────────────────────────────────────────

/// Convert any serializable `value` into an XML-RPC [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(Serializer)
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// The value serializer. Stateless; every call builds a fresh [`Value`].
///
/// ```rust
/// use serde::Serialize;
/// use xmlrpc_serde::{Value, ser::Serializer};
///
/// assert_eq!(42u16.serialize(Serializer).unwrap(), Value::Int(42));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

fn int_from<T: TryInto<i32> + Into<i128> + Copy>(v: T) -> Result<Value> {
    v.try_into()
        .map(Value::Int)
        .map_err(|_| Error::IntegerOutOfRange(v.into()))
}

fn wrap_variant(variant: &'static str, value: Value) -> Value {
    Value::Struct(vec![Member::new(variant, value)])
}

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeArray;
    type SerializeTupleVariant = SerializeArrayVariant;
    type SerializeMap = SerializeStruct;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    // ── Primitives ─────────────────────────────────────────────────────────

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Int(v as i32))
    }
    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Int(v as i32))
    }
    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int(v))
    }
    fn serialize_i64(self, v: i64) -> Result<Value> {
        int_from(v)
    }
    fn serialize_i128(self, v: i128) -> Result<Value> {
        int_from(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Int(v as i32))
    }
    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Int(v as i32))
    }
    fn serialize_u32(self, v: u32) -> Result<Value> {
        int_from(v)
    }
    fn serialize_u64(self, v: u64) -> Result<Value> {
        int_from(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        ser::Serializer::serialize_f64(self, v as f64)
    }
    /// NaN and the infinities have no XML-RPC form.
    fn serialize_f64(self, v: f64) -> Result<Value> {
        if !v.is_finite() {
            return Err(Error::InvalidScalar {
                ty: ValueType::Double,
                text: v.to_string(),
            });
        }
        Ok(Value::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Base64(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Nil)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value> {
        if name == crate::DATETIME_TOKEN {
            // The marker wraps the timestamp text; retag it.
            match value.serialize(self)? {
                Value::String(text) | Value::DateTime(text) => Ok(Value::DateTime(
                    crate::datetime::normalize_lenient(&text).into_owned(),
                )),
                other => Err(Error::Message(format!(
                    "expected timestamp text, found {}",
                    other.value_type()
                ))),
            }
        } else {
            value.serialize(self)
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        Ok(wrap_variant(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeArray {
            values: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        ser::Serializer::serialize_seq(self, Some(len))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        ser::Serializer::serialize_seq(self, Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeArrayVariant {
            variant,
            values: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeStruct {
            members: Vec::with_capacity(len.unwrap_or(0)),
            next_name: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        ser::Serializer::serialize_map(self, Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            members: Vec::with_capacity(len),
        })
    }
}

// ── Compound serializers ───────────────────────────────────────────────────

pub struct SerializeArray {
    values: Vec<Value>,
}

pub struct SerializeArrayVariant {
    variant: &'static str,
    values: Vec<Value>,
}

pub struct SerializeStruct {
    members: Vec<Member>,
    next_name: Option<String>,
}

pub struct SerializeStructVariant {
    variant: &'static str,
    members: Vec<Member>,
}

macro_rules! forward_serialize_element {
    ($t:ty, $method:ident) => {
        impl $t for SerializeArray {
            type Ok = Value;
            type Error = Error;
            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                self.values.push(value.serialize(Serializer)?);
                Ok(())
            }
            fn end(self) -> Result<Value> {
                Ok(Value::Array(self.values))
            }
        }
    };
}

forward_serialize_element!(ser::SerializeSeq, serialize_element);
forward_serialize_element!(ser::SerializeTuple, serialize_element);
forward_serialize_element!(ser::SerializeTupleStruct, serialize_field);

impl ser::SerializeTupleVariant for SerializeArrayVariant {
    type Ok = Value;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.values.push(value.serialize(Serializer)?);
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(wrap_variant(self.variant, Value::Array(self.values)))
    }
}

/// Struct member names come from map keys; strings are used as-is and
/// integer keys are written in decimal.
fn member_name<T: Serialize + ?Sized>(key: &T) -> Result<String> {
    match key.serialize(Serializer)? {
        Value::String(s) => Ok(s),
        Value::Int(i) | Value::I4(i) => Ok(i.to_string()),
        _ => Err(Error::KeyMustBeString),
    }
}

impl ser::SerializeMap for SerializeStruct {
    type Ok = Value;
    type Error = Error;
    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.next_name = Some(member_name(key)?);
        Ok(())
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let name = self
            .next_name
            .take()
            .ok_or_else(|| Error::Message("map value serialized before its key".into()))?;
        self.members.push(Member {
            name,
            value: value.serialize(Serializer)?,
        });
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.members))
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.members.push(Member::new(key, value.serialize(Serializer)?));
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.members))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.members.push(Member::new(key, value.serialize(Serializer)?));
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(wrap_variant(self.variant, Value::Struct(self.members)))
    }
}
