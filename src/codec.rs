//! Method call and method response envelopes.
//!
//! Encoding turns the value model into an [`Element`] tree and hands it to
//! [`crate::xml`]. Decoding runs the other way in three steps:
//!
//! 1. raw parse into an element tree ([`crate::xml::parse`]);
//! 2. [`rewrite_bare_strings`]: a `<value>` holding only text becomes
//!    `<value><string>…</string></value>`;
//! 3. typed decoding, then [`normalize_dates`] over the resulting values.
//!
//! ```rust
//! use xmlrpc_serde::codec::{self, Format, MethodCall, MethodResponse};
//! use xmlrpc_serde::Value;
//!
//! let call = MethodCall::new("getQuote", vec![Value::from("IBM")]);
//! let bytes = codec::encode_call(&call, Format::default()).unwrap();
//! assert_eq!(codec::decode_call(&bytes).unwrap(), call);
//!
//! let body = b"<methodResponse><params><param><value>Hello, World!</value></param></params></methodResponse>";
//! assert_eq!(
//!     codec::decode_response(body).unwrap(),
//!     MethodResponse::Success(Value::String("Hello, World!".into())),
//! );
//! ```

use crate::datetime;
use crate::error::{Error, Result};
use crate::value::{Member, Value, ValueType};
use crate::xml::{self, Element};
use std::str::FromStr;

// ── Envelope types ─────────────────────────────────────────────────────────

/// `methodCall`: a method name and its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method_name: String,
    pub params: Vec<Value>,
}

impl MethodCall {
    pub fn new(method_name: impl Into<String>, params: Vec<Value>) -> Self {
        MethodCall {
            method_name: method_name.into(),
            params,
        }
    }
}

/// `methodResponse`: exactly one success value or exactly one fault struct.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Fault(Value),
}

/// Output layout for encoded envelopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Format {
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
}

impl Format {
    pub fn compact() -> Self {
        Format { indent: None }
    }

    pub fn indented(width: usize) -> Self {
        Format {
            indent: Some(width),
        }
    }
}

// ── Request parameters ─────────────────────────────────────────────────────

/// One call parameter, either a `(type, payload)` pair or a ready value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Coerced to the given type when the call is built.
    Typed(ValueType, Value),
    /// Used verbatim, e.g. a pre-built struct or array.
    Value(Value),
}

impl Param {
    pub fn typed(ty: ValueType, payload: impl Into<Value>) -> Self {
        Param::Typed(ty, payload.into())
    }

    /// Serialize any `T` into a verbatim parameter.
    pub fn serialize<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        crate::to_value(value).map(Param::Value)
    }

    pub fn into_value(self) -> Result<Value> {
        match self {
            Param::Typed(ty, payload) => payload.coerce(ty),
            Param::Value(value) => Ok(value),
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Value(value)
    }
}

impl<V: Into<Value>> From<(ValueType, V)> for Param {
    fn from((ty, payload): (ValueType, V)) -> Self {
        Param::Typed(ty, payload.into())
    }
}

/// Turn parameters into the ordered list of values sent on the wire.
pub fn build_params<I, P>(params: I) -> Result<Vec<Value>>
where
    I: IntoIterator<Item = P>,
    P: Into<Param>,
{
    params.into_iter().map(|p| p.into().into_value()).collect()
}

// ── Value ⇄ element ────────────────────────────────────────────────────────

/// `<value><tag>…</tag></value>` for `value`.
///
/// Fails for a `double` that is NaN or infinite: XML-RPC has no spelling
/// for those.
pub fn value_to_element(value: &Value) -> Result<Element> {
    Ok(Element::with_children("value", vec![typed_element(value)?]))
}

fn typed_element(value: &Value) -> Result<Element> {
    let tag = value.value_type().as_str();
    let element = match value {
        Value::Nil => Element::new(tag),
        Value::Struct(members) => Element::with_children(
            tag,
            members
                .iter()
                .map(|m| {
                    Ok(Element::with_children(
                        "member",
                        vec![Element::with_text("name", &m.name), value_to_element(&m.value)?],
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Array(values) => Element::with_children(
            tag,
            vec![Element::with_children(
                "data",
                values.iter().map(value_to_element).collect::<Result<Vec<_>>>()?,
            )],
        ),
        Value::DateTime(text) => Element::with_text(tag, datetime::normalize_lenient(text)),
        Value::Double(d) if !d.is_finite() => {
            return Err(Error::InvalidScalar {
                ty: ValueType::Double,
                text: d.to_string(),
            });
        }
        scalar => Element::with_text(tag, scalar.to_wire_text().unwrap_or_default()),
    };
    Ok(element)
}

/// Decode a `<value>` element. Bare strings must already have been
/// rewritten by [`rewrite_bare_strings`].
pub fn element_to_value(element: &Element) -> Result<Value> {
    if element.name != "value" {
        return Err(Error::InvalidValue(format!(
            "expected <value>, found <{}>",
            element.name
        )));
    }
    let [typed] = element.children.as_slice() else {
        return Err(Error::InvalidValue(format!(
            "<value> must hold exactly one type element, found {}",
            element.children.len()
        )));
    };
    let ty = ValueType::from_str(&typed.name)?;
    match ty {
        ValueType::Struct => typed
            .children_named("member")
            .map(member_from_element)
            .collect::<Result<Vec<_>>>()
            .map(Value::Struct),
        ValueType::Array => match typed.child("data") {
            Some(data) => data
                .children_named("value")
                .map(element_to_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            None => Ok(Value::Array(Vec::new())),
        },
        ValueType::Nil => Ok(Value::Nil),
        // Left as sent; `normalize_dates` canonicalizes what it can.
        ValueType::DateTime => Ok(Value::DateTime(typed.text.trim().to_string())),
        scalar => Value::parse(scalar, &typed.text),
    }
}

fn member_from_element(member: &Element) -> Result<Member> {
    let name = member
        .child("name")
        .ok_or_else(|| Error::InvalidValue("struct member without <name>".into()))?;
    let value = member
        .child("value")
        .ok_or_else(|| Error::InvalidValue(format!("struct member {:?} without <value>", name.text)))?;
    Ok(Member {
        name: name.text.clone(),
        value: element_to_value(value)?,
    })
}

// ── Post-decode passes ─────────────────────────────────────────────────────

/// Give every text-only `<value>` an explicit `<string>` child. A `<value>`
/// with child elements is left for the typed decoder.
pub fn rewrite_bare_strings(mut element: Element) -> Element {
    if element.name == "value" && element.children.is_empty() {
        let text = std::mem::take(&mut element.text);
        element.children.push(Element::with_text("string", text));
        return element;
    }
    element.children = element
        .children
        .into_iter()
        .map(rewrite_bare_strings)
        .collect();
    element
}

/// Canonicalize every `dateTime.iso8601` payload, at any depth. Timestamps
/// outside the recognised digit pattern are kept as received.
pub fn normalize_dates(value: Value) -> Value {
    match value {
        Value::DateTime(text) => Value::DateTime(datetime::normalize_lenient(&text).into_owned()),
        Value::Struct(members) => Value::Struct(
            members
                .into_iter()
                .map(|m| Member {
                    name: m.name,
                    value: normalize_dates(m.value),
                })
                .collect(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(normalize_dates).collect()),
        other => other,
    }
}

fn decode_value(element: &Element) -> Result<Value> {
    element_to_value(element).map(normalize_dates)
}

// ── Envelopes ──────────────────────────────────────────────────────────────

fn params_element(values: &[Value]) -> Result<Element> {
    Ok(Element::with_children(
        "params",
        values
            .iter()
            .map(|v| Ok(Element::with_children("param", vec![value_to_element(v)?])))
            .collect::<Result<Vec<_>>>()?,
    ))
}

/// Encode a `methodCall` document.
pub fn encode_call(call: &MethodCall, format: Format) -> Result<Vec<u8>> {
    if call.method_name.trim().is_empty() {
        return Err(Error::MalformedCall("empty method name".into()));
    }
    let root = Element::with_children(
        "methodCall",
        vec![
            Element::with_text("methodName", &call.method_name),
            params_element(&call.params)?,
        ],
    );
    xml::write(&root, format.indent)
}

/// Decode a `methodCall` document.
pub fn decode_call(input: &[u8]) -> Result<MethodCall> {
    let root = rewrite_bare_strings(xml::parse(input)?);
    if root.name != "methodCall" {
        return Err(Error::MalformedCall(format!(
            "root element is <{}>",
            root.name
        )));
    }
    let method_name = root
        .child("methodName")
        .map(|e| e.text.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::MalformedCall("missing <methodName>".into()))?;
    let params = match root.child("params") {
        Some(params) => params
            .children_named("param")
            .map(|param| {
                param
                    .child("value")
                    .ok_or_else(|| Error::MalformedCall("<param> without <value>".into()))
                    .and_then(decode_value)
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    Ok(MethodCall {
        method_name,
        params,
    })
}

/// Encode a `methodResponse` document.
pub fn encode_response(response: &MethodResponse, format: Format) -> Result<Vec<u8>> {
    let body = match response {
        MethodResponse::Success(value) => params_element(std::slice::from_ref(value))?,
        MethodResponse::Fault(fault) => {
            if fault.as_struct().is_none() {
                return Err(Error::TypeMismatch {
                    expected: ValueType::Struct,
                    found: fault.value_type(),
                });
            }
            Element::with_children("fault", vec![value_to_element(fault)?])
        }
    };
    xml::write(
        &Element::with_children("methodResponse", vec![body]),
        format.indent,
    )
}

/// Decode a `methodResponse` document.
///
/// An empty body is [`Error::EmptyResponse`]. A document that does not hold
/// exactly one `<params>` with one `<param>`, or exactly one `<fault>`, is
/// [`Error::MalformedResponse`].
pub fn decode_response(input: &[u8]) -> Result<MethodResponse> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::EmptyResponse);
    }
    let malformed = |msg: &str| Error::MalformedResponse(msg.to_string());

    let root = rewrite_bare_strings(xml::parse(input)?);
    if root.name != "methodResponse" {
        return Err(Error::MalformedResponse(format!(
            "root element is <{}>",
            root.name
        )));
    }

    let params = root.children_named("params").collect::<Vec<_>>();
    let faults = root.children_named("fault").collect::<Vec<_>>();
    match (params.as_slice(), faults.as_slice()) {
        ([], []) => Err(malformed("neither <params> nor <fault>")),
        ([_], [_]) => Err(malformed("both <params> and <fault>")),
        ([], [fault]) => {
            let value = fault
                .child("value")
                .ok_or_else(|| malformed("<fault> without <value>"))?;
            let value = decode_value(value)?;
            if value.as_struct().is_none() {
                return Err(malformed("fault value is not a struct"));
            }
            Ok(MethodResponse::Fault(value))
        }
        ([params], []) => {
            let mut iter = params.children_named("param");
            let (Some(param), None) = (iter.next(), iter.next()) else {
                return Err(malformed("expected exactly one <param>"));
            };
            let value = param
                .child("value")
                .ok_or_else(|| malformed("<param> without <value>"))?;
            decode_value(value).map(MethodResponse::Success)
        }
        _ => Err(malformed("repeated <params> or <fault>")),
    }
}
