//! Serde deserializer reading from an XML-RPC [`Value`].
//!
//! XML-RPC is self-describing, so every `deserialize_*` method dispatches on
//! the value's own tag. Struct members feed maps and structs in wire order;
//! when a name repeats, map types keep the last occurrence.

use crate::error::{Error, Result};
use crate::value::{Member, Value};
use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};

/// Deserialize a `T` out of `value`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(Deserializer::new(value))
}

/// The value deserializer. Consumes the [`Value`] it wraps.
pub struct Deserializer {
    value: Value,
}

impl Deserializer {
    pub fn new(value: Value) -> Self {
        Deserializer { value }
    }
}

// ── Main Deserializer impl ─────────────────────────────────────────────────

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::String(s) | Value::DateTime(s) => visitor.visit_string(s),
            Value::Int(i) | Value::I4(i) => visitor.visit_i32(i),
            Value::Double(d) => visitor.visit_f64(d),
            Value::Boolean(b) => visitor.visit_bool(b),
            Value::Base64(bytes) => visitor.visit_byte_buf(bytes),
            Value::Nil => visitor.visit_unit(),
            Value::Array(values) => visitor.visit_seq(SeqDeserializer::new(values)),
            Value::Struct(members) => visitor.visit_map(MapDeserializer::new(members)),
        }
    }

    /// `nil` → `None`; anything else is `Some`.
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Nil => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == crate::DATETIME_TOKEN {
            return match self.value {
                // Servers often send timestamps as plain strings.
                Value::DateTime(_) | Value::String(_) => visitor.visit_newtype_struct(self),
                other => Err(Error::Message(format!(
                    "expected dateTime.iso8601, found {}",
                    other.value_type()
                ))),
            };
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Struct(mut members) if members.len() == 1 => {
                let Member { name, value } = members.remove(0);
                visitor.visit_enum(EnumDeserializer {
                    variant: name,
                    value: Some(value),
                })
            }
            other => Err(Error::Message(format!(
                "expected an enum as a string or a one-member struct, found {}",
                other.value_type()
            ))),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Nil => visitor.visit_unit(),
            // `<value/>` decodes as an empty string.
            Value::String(s) if s.is_empty() => visitor.visit_unit(),
            other => Err(Error::TypeMismatch {
                expected: crate::ValueType::Nil,
                found: other.value_type(),
            }),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_unit(self, visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let _ = self;
        visitor.visit_unit()
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf seq tuple tuple_struct map struct identifier
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = Deserializer;

    fn into_deserializer(self) -> Deserializer {
        Deserializer::new(self)
    }
}

// ── SeqDeserializer ────────────────────────────────────────────────────────

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(values: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: values.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// ── MapDeserializer ────────────────────────────────────────────────────────

struct MapDeserializer {
    iter: std::vec::IntoIter<Member>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(members: Vec<Member>) -> Self {
        MapDeserializer {
            iter: members.into_iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some(Member { name, value }) => {
                self.value = Some(value);
                seed.deserialize(StringDeserializer::<Error>::new(name)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::Message("struct member value requested before its name".into()))?;
        seed.deserialize(Deserializer::new(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// ── EnumDeserializer ───────────────────────────────────────────────────────

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(StringDeserializer::<Error>::new(self.variant))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    /// Unit variant: written as a bare name, or a name holding `nil`
    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Nil) => Ok(()),
            Some(other) => Err(Error::TypeMismatch {
                expected: crate::ValueType::Nil,
                found: other.value_type(),
            }),
        }
    }

    /// Newtype variant: deserialize the inner value
    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        match self.value {
            Some(value) => seed.deserialize(Deserializer::new(value)),
            None => Err(Error::Message("newtype variant is missing its value".into())),
        }
    }

    /// Tuple variant: the member holds an array
    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.value {
            Some(Value::Array(values)) => visitor.visit_seq(SeqDeserializer::new(values)),
            _ => Err(Error::Message("tuple variant expects an array".into())),
        }
    }

    /// Struct variant: the member holds a struct
    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Some(Value::Struct(members)) => visitor.visit_map(MapDeserializer::new(members)),
            _ => Err(Error::Message("struct variant expects a struct".into())),
        }
    }
}
