use crate::value::ValueType;
use serde::{de, ser};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, encoding, sending or decoding an
/// XML-RPC call.
///
/// Server faults and non-success HTTP statuses are not errors: they are
/// reported as a [`crate::client::Outcome`] of an otherwise completed call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A custom error message from serde
    #[error("{0}")]
    Message(String),

    /// The client was built without a destination URL
    #[error("no destination configured for the XML-RPC client")]
    MissingDestination,

    /// The destination could not be parsed as a URL
    #[error("invalid destination {0:?}")]
    InvalidDestination(String),

    /// The document is not well-formed XML
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The response body was empty
    #[error("empty response body")]
    EmptyResponse,

    /// The response parsed as XML but is not a valid method response
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The method call envelope is not valid
    #[error("malformed method call: {0}")]
    MalformedCall(String),

    /// A `value` element does not hold exactly one well-formed typed payload
    #[error("invalid value element: {0}")]
    InvalidValue(String),

    /// A `value` element used a type tag outside the XML-RPC type set
    #[error("unknown value type <{0}>")]
    UnknownType(String),

    /// Scalar text could not be read as the declared type
    #[error("cannot read {text:?} as {ty}")]
    InvalidScalar { ty: ValueType, text: String },

    /// A value cannot be converted into the requested type
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: ValueType, found: ValueType },

    /// An integer does not fit the 32-bit XML-RPC `int`
    #[error("integer {0} does not fit a 32-bit XML-RPC int")]
    IntegerOutOfRange(i128),

    /// Struct member names must be strings
    #[error("struct member names must be strings")]
    KeyMustBeString,

    /// An I/O error occurred during writing
    #[error("I/O error: {0}")]
    Io(String),

    /// The HTTP transport could not be set up or could not issue the request
    #[error("HTTP transport error: {0}")]
    Http(String),
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
