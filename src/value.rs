//! The XML-RPC value model.
//!
//! A [`Value`] carries exactly one type tag and one payload. The tag set is
//! fixed by the protocol:
//!
//! | Wire tag           | Variant                | Payload |
//! |--------------------|------------------------|---------|
//! | `string` (or bare) | [`Value::String`]      | text |
//! | `int`              | [`Value::Int`]         | `i32` |
//! | `i4`               | [`Value::I4`]          | `i32` |
//! | `double`           | [`Value::Double`]      | `f64` |
//! | `boolean`          | [`Value::Boolean`]     | `bool` (`0`/`1` on the wire) |
//! | `dateTime.iso8601` | [`Value::DateTime`]    | canonical `YYYY-MM-DDTHH:MM:SS` text |
//! | `base64`           | [`Value::Base64`]      | raw bytes (base64 only on the wire) |
//! | `nil`              | [`Value::Nil`]         | none |
//! | `struct`           | [`Value::Struct`]      | ordered [`Member`]s |
//! | `array`            | [`Value::Array`]       | ordered values |
//!
//! `int` and `i4` are interchangeable for the protocol but are kept apart so a
//! value received as `i4` is written back as `i4`.

use crate::datetime;
use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use std::str::FromStr;

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    String,
    Int,
    I4,
    Double,
    Boolean,
    DateTime,
    Base64,
    Nil,
    Struct,
    Array,
}

impl ValueType {
    pub const ALL: [ValueType; 10] = [
        ValueType::String,
        ValueType::Int,
        ValueType::I4,
        ValueType::Double,
        ValueType::Boolean,
        ValueType::DateTime,
        ValueType::Base64,
        ValueType::Nil,
        ValueType::Struct,
        ValueType::Array,
    ];

    /// The element name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::I4 => "i4",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::DateTime => "dateTime.iso8601",
            ValueType::Base64 => "base64",
            ValueType::Nil => "nil",
            ValueType::Struct => "struct",
            ValueType::Array => "array",
        }
    }

    pub fn is_compound(self) -> bool {
        matches!(self, ValueType::Struct | ValueType::Array)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, ValueType::Int | ValueType::I4)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ValueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

/// One named entry of a struct. Names may repeat on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub value: Value,
}

impl Member {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Member {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i32),
    I4(i32),
    Double(f64),
    Boolean(bool),
    DateTime(String),
    Base64(Vec<u8>),
    Nil,
    Struct(Vec<Member>),
    Array(Vec<Value>),
}

impl Value {
    /// Build a value of type `ty` from `payload`, coercing the payload when
    /// it is a scalar of another type. Compound payloads must already be of
    /// the requested compound kind.
    pub fn typed(ty: ValueType, payload: impl Into<Value>) -> Result<Value> {
        payload.into().coerce(ty)
    }

    /// A `dateTime.iso8601` value. Missing separators are inserted; text
    /// outside the `YYYY(-)?MM(-)?DDTHH(:)?MM(:)?SS` pattern is rejected.
    pub fn date_time(text: &str) -> Result<Value> {
        datetime::normalize(text.trim())
            .map(Value::DateTime)
            .ok_or_else(|| Error::InvalidScalar {
                ty: ValueType::DateTime,
                text: text.to_string(),
            })
    }

    /// Read scalar wire text as type `ty`.
    ///
    /// Numbers and booleans are trimmed before parsing, booleans also accept
    /// `true`/`false`, and base64 may contain line breaks.
    pub fn parse(ty: ValueType, text: &str) -> Result<Value> {
        let invalid = || Error::InvalidScalar {
            ty,
            text: text.to_string(),
        };
        match ty {
            ValueType::String => Ok(Value::String(text.to_string())),
            ValueType::Int => text.trim().parse().map(Value::Int).map_err(|_| invalid()),
            ValueType::I4 => text.trim().parse().map(Value::I4).map_err(|_| invalid()),
            ValueType::Double => match text.trim().parse::<f64>() {
                Ok(d) if d.is_finite() => Ok(Value::Double(d)),
                _ => Err(invalid()),
            },
            ValueType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Ok(Value::Boolean(true)),
                "0" | "false" => Ok(Value::Boolean(false)),
                _ => Err(invalid()),
            },
            ValueType::DateTime => Value::date_time(text),
            ValueType::Base64 => {
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                STANDARD
                    .decode(compact)
                    .map(Value::Base64)
                    .map_err(|_| invalid())
            }
            ValueType::Nil if text.trim().is_empty() => Ok(Value::Nil),
            ValueType::Nil => Err(invalid()),
            ValueType::Struct | ValueType::Array => Err(Error::TypeMismatch {
                expected: ty,
                found: ValueType::String,
            }),
        }
    }

    /// Convert this value into type `ty`.
    ///
    /// Scalars convert among each other where the wire text allows it
    /// (a `string` holding `"42"` becomes `int` 42, an `int` becomes a
    /// `boolean` by comparing with zero). Compound kinds never convert.
    pub fn coerce(self, ty: ValueType) -> Result<Value> {
        let found = self.value_type();
        if found == ty {
            return Ok(self);
        }
        let mismatch = Error::TypeMismatch {
            expected: ty,
            found,
        };
        if ty.is_compound() || found.is_compound() || ty == ValueType::Nil {
            return Err(mismatch);
        }
        match (self, ty) {
            (Value::String(s), _) => Value::parse(ty, &s),
            (Value::Int(i) | Value::I4(i), ValueType::Int) => Ok(Value::Int(i)),
            (Value::Int(i) | Value::I4(i), ValueType::I4) => Ok(Value::I4(i)),
            (Value::Int(i) | Value::I4(i), ValueType::Double) => Ok(Value::Double(i as f64)),
            (Value::Int(i) | Value::I4(i), ValueType::Boolean) => Ok(Value::Boolean(i != 0)),
            (Value::Boolean(b), t) if t.is_integer() => Value::Int(b as i32).coerce(t),
            (Value::Double(d), t) if t.is_integer() => {
                if d.fract() == 0.0 && d >= i32::MIN as f64 && d <= i32::MAX as f64 {
                    Value::Int(d as i32).coerce(t)
                } else {
                    Err(mismatch)
                }
            }
            (Value::Boolean(b), ValueType::Double) => Ok(Value::Double(if b { 1.0 } else { 0.0 })),
            (Value::Base64(_) | Value::Nil, _) => Err(mismatch),
            (other, ValueType::String) => match other.to_wire_text() {
                Some(text) => Ok(Value::String(text)),
                None => Err(mismatch),
            },
            (other, t) => match other.to_wire_text() {
                Some(text) => Value::parse(t, &text),
                None => Err(mismatch),
            },
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Int(_) => ValueType::Int,
            Value::I4(_) => ValueType::I4,
            Value::Double(_) => ValueType::Double,
            Value::Boolean(_) => ValueType::Boolean,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Base64(_) => ValueType::Base64,
            Value::Nil => ValueType::Nil,
            Value::Struct(_) => ValueType::Struct,
            Value::Array(_) => ValueType::Array,
        }
    }

    /// The text content written inside the type element, or `None` for
    /// `nil` and compound values.
    pub fn to_wire_text(&self) -> Option<String> {
        match self {
            Value::String(s) | Value::DateTime(s) => Some(s.clone()),
            Value::Int(i) | Value::I4(i) => Some(i.to_string()),
            Value::Double(d) => Some(d.to_string()),
            Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Value::Base64(bytes) => Some(STANDARD.encode(bytes)),
            Value::Nil | Value::Struct(_) | Value::Array(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::DateTime(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload of an `int` or `i4` value.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) | Value::I4(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) | Value::I4(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Base64(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(s) => datetime::parse(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Member]> {
        match self {
            Value::Struct(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Look up a struct member. When the name repeats, the last one wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct()?
            .iter()
            .rev()
            .find(|m| m.name == name)
            .map(|m| &m.value)
    }
}

// ── Conversions ────────────────────────────────────────────────────────────

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Base64(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(datetime::format(&v))
    }
}

impl From<Vec<Member>> for Value {
    fn from(v: Vec<Member>) -> Self {
        Value::Struct(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

// ── serde::Serialize ───────────────────────────────────────────────────────

/// Lets pre-built values sit inside any serializable parameter. Through
/// [`crate::to_value`] every variant comes back unchanged except `i4`, which
/// serde has no way to tell apart from `int`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(i) | Value::I4(i) => serializer.serialize_i32(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::DateTime(s) => serializer.serialize_newtype_struct(crate::DATETIME_TOKEN, s),
            Value::Base64(bytes) => serializer.serialize_bytes(bytes),
            Value::Nil => serializer.serialize_unit(),
            Value::Struct(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for m in members {
                    map.serialize_entry(&m.name, &m.value)?;
                }
                map.end()
            }
            Value::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for v in values {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

// ── serde::Deserialize ─────────────────────────────────────────────────────

/// Payload-only view of any self-describing input. Read back out of a
/// [`Value`] this drops the `i4` and `dateTime.iso8601` tags, which come back
/// as `int` and `string`.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an XML-RPC value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        i32::try_from(v)
            .map(Value::Int)
            .map_err(|_| E::custom(Error::IntegerOutOfRange(v.into())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        i32::try_from(v)
            .map(Value::Int)
            .map_err(|_| E::custom(Error::IntegerOutOfRange(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Value, E> {
        Ok(Value::Base64(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Value, E> {
        Ok(Value::Base64(v))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Nil)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Nil)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(Value::Array(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, value)) = map.next_entry::<String, Value>()? {
            members.push(Member { name, value });
        }
        Ok(Value::Struct(members))
    }
}
