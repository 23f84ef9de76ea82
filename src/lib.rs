//! # xmlrpc-serde
//!
//! An XML-RPC client: a typed value model, a serde bridge into and out of
//! that model, the `methodCall`/`methodResponse` codec and a blocking call
//! lifecycle over HTTP.
//!
//! ## Overview
//!
//! XML-RPC encodes a call as an XML document holding a method name and an
//! ordered list of typed values, and answers with either one value or one
//! fault struct (`faultCode`, `faultString`). This crate keeps the protocol
//! types visible ([`Value`], [`ValueType`], [`Member`]) and leaves XML syntax
//! to `quick-xml` and HTTP to `reqwest`.
//!
//! ## Serde type mapping
//!
//! | Rust / serde type        | XML-RPC type |
//! |--------------------------|--------------|
//! | `bool`                   | `boolean` |
//! | integers fitting `i32`   | `int` |
//! | `f32`, `f64`             | `double` |
//! | `char`, `&str`, `String` | `string` |
//! | bytes (`serde_bytes`)    | `base64` |
//! | `NaiveDateTime` via [`iso8601`] | `dateTime.iso8601` |
//! | `None`, `()`             | `nil` |
//! | `Vec<T>`, tuples         | `array` |
//! | structs, maps            | `struct` |
//! | unit enum variant        | `string` (variant name) |
//! | other enum variants      | one-member `struct` |
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xmlrpc_serde::codec::{self, MethodResponse};
//! use xmlrpc_serde::{from_value, to_value};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Quote {
//!     symbol: String,
//!     price: f64,
//!     volume: i32,
//! }
//!
//! let quote = Quote { symbol: "IBM".into(), price: 81.5, volume: 1200 };
//!
//! // A server answer carrying the quote as an XML-RPC struct
//! let response = MethodResponse::Success(to_value(&quote).unwrap());
//! let body = codec::encode_response(&response, codec::Format::default()).unwrap();
//!
//! // Decode it back on the client side
//! let MethodResponse::Success(value) = codec::decode_response(&body).unwrap() else {
//!     panic!("expected a success response");
//! };
//! let decoded: Quote = from_value(value).unwrap();
//! assert_eq!(quote, decoded);
//! ```

pub mod client;
pub mod codec;
pub mod convert;
pub mod datetime;
pub mod de;
pub mod error;
pub mod iso8601;
pub mod ser;
pub mod transport;
pub mod value;
pub mod xml;

pub use client::{
    CallError, CallResponse, CallResult, CallTrace, Client, ClientBuilder, ClientConfig, Outcome,
};
pub use codec::{MethodCall, MethodResponse, Param};
pub use de::{Deserializer, from_value};
pub use error::{Error, Result};
pub use ser::{Serializer, to_value};
pub use value::{Member, Value, ValueType};

pub use serde::{Deserialize, Serialize};

/// Newtype name marking a `dateTime.iso8601` payload inside serde.
pub(crate) const DATETIME_TOKEN: &str = "$xmlrpc_serde::DateTime";
