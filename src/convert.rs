//! Conversions between wire-shaped structs/arrays/faults and keyed or
//! ordered collections.
//!
//! All functions are pure. Inputs that should be a struct or an array but
//! are not fail with [`Error::TypeMismatch`].

use crate::de::from_value;
use crate::error::{Error, Result};
use crate::value::{Member, Value, ValueType};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// One struct member as `(name, type, payload)`.
pub type Row = (String, ValueType, Value);

/// Fault code reported when the server sent none, or sent zero.
pub const INVALID_FAULT_CODE: i32 = -1;

fn members(value: &Value) -> Result<&[Member]> {
    value.as_struct().ok_or(Error::TypeMismatch {
        expected: ValueType::Struct,
        found: value.value_type(),
    })
}

fn elements(value: &Value) -> Result<&[Value]> {
    value.as_array().ok_or(Error::TypeMismatch {
        expected: ValueType::Array,
        found: value.value_type(),
    })
}

/// Key a struct's member payloads by name. When a name repeats the later
/// member wins.
///
/// Payloads are read as `T` through [`from_value`]; with `T = Value` the
/// payloads stay untyped values (`i4` reads as `int`, timestamps as text).
pub fn struct_to_map<T: DeserializeOwned>(value: &Value) -> Result<BTreeMap<String, T>> {
    members(value)?
        .iter()
        .map(|m| Ok((m.name.clone(), from_value(m.value.clone())?)))
        .collect()
}

/// Flatten a struct into rows, keeping order, types and duplicates.
pub fn struct_to_rows(value: &Value) -> Result<Vec<Row>> {
    Ok(members(value)?
        .iter()
        .map(|m| (m.name.clone(), m.value.value_type(), m.value.clone()))
        .collect())
}

/// Inverse of [`struct_to_rows`]. Each payload is coerced to its row's type;
/// row order becomes member order.
pub fn rows_to_struct<I>(rows: I) -> Result<Value>
where
    I: IntoIterator<Item = Row>,
{
    rows.into_iter()
        .map(|(name, ty, value)| Ok(Member::new(name, value.coerce(ty)?)))
        .collect::<Result<Vec<_>>>()
        .map(Value::Struct)
}

/// Build a struct whose members all have type `ty`.
///
/// Members are emitted in ascending name order so the same map always
/// produces the same wire bytes.
pub fn map_to_struct<K, V, I>(ty: ValueType, map: I) -> Result<Value>
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    let sorted: BTreeMap<String, Value> = map
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    sorted
        .into_iter()
        .map(|(name, value)| Ok(Member::new(name, value.coerce(ty)?)))
        .collect::<Result<Vec<_>>>()
        .map(Value::Struct)
}

/// The element payloads of an array, in order, each read as `T`.
pub fn array_values<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>> {
    elements(value)?
        .iter()
        .map(|v| from_value(v.clone()))
        .collect()
}

/// Build an array whose elements all have type `ty`.
pub fn values_to_array<V, I>(ty: ValueType, values: I) -> Result<Value>
where
    V: Into<Value>,
    I: IntoIterator<Item = V>,
{
    values
        .into_iter()
        .map(|v| v.into().coerce(ty))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Extract `(faultCode, faultString)` from a fault struct.
///
/// A missing, unreadable or zero code is reported as [`INVALID_FAULT_CODE`]:
/// a fault must never look like success.
pub fn fault_code(fault: &Value) -> Result<(i32, Option<String>)> {
    let map = struct_to_map::<Value>(fault)?;
    let code = map
        .get("faultCode")
        .cloned()
        .and_then(|v| v.coerce(ValueType::Int).ok())
        .and_then(|v| v.as_i32())
        .unwrap_or(0);
    let message = map.get("faultString").and_then(Value::to_wire_text);
    if code == 0 {
        tracing::warn!(
            fault_string = message.as_deref().unwrap_or(""),
            "fault without a usable faultCode, reporting {INVALID_FAULT_CODE}"
        );
        return Ok((INVALID_FAULT_CODE, message));
    }
    Ok((code, message))
}

/// Build a fault struct: `faultCode` as `int`, `faultString` as `string`.
pub fn fault_from(code: i32, message: impl Into<String>) -> Value {
    Value::Struct(vec![
        Member::new("faultCode", Value::Int(code)),
        Member::new("faultString", Value::String(message.into())),
    ])
}
