//! The XML-RPC client and its per-call lifecycle.
//!
//! Each [`Client::call`] goes through `Formatting → Transmitting →
//! Decoding`, timing every step into a [`CallTrace`] that is handed back with
//! the result. Nothing about a call outlives it, so one client can be shared
//! freely.
//!
//! ```rust
//! use xmlrpc_serde::client::{Client, Outcome};
//! use xmlrpc_serde::transport::{HttpResponse, Transport};
//! use xmlrpc_serde::{Value, ValueType};
//!
//! struct Canned;
//!
//! impl Transport for Canned {
//!     fn post(&self, _: &url::Url, _: &[(String, String)], _: Vec<u8>) -> xmlrpc_serde::Result<HttpResponse> {
//!         let body = "<methodResponse><params><param><value><double>81.5</double></value></param></params></methodResponse>";
//!         Ok(HttpResponse::new(200, "OK", body))
//!     }
//! }
//!
//! let client = Client::builder()
//!     .destination("http://quotes.example.com/RPC2")
//!     .build_with_transport(Canned)
//!     .unwrap();
//!
//! let response = client.call("getQuote", [(ValueType::String, "IBM")]).unwrap();
//! assert_eq!(response.status(), 0);
//! assert_eq!(response.outcome, Outcome::Success(Value::Double(81.5)));
//! ```

use crate::codec::{self, Format, MethodCall, MethodResponse, Param};
use crate::convert;
use crate::error::{Error, Result};
use crate::transport::{HttpResponse, Transport};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

// ── Configuration ──────────────────────────────────────────────────────────

/// Client settings, loadable from any serde format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint every call is POSTed to. Required.
    pub destination: Option<String>,
    /// Extra request headers. `Content-Type: text/xml` is added when absent.
    pub headers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    /// Request timeout, enforced by the HTTP transport.
    pub timeout_secs: Option<f64>,
    /// `(from, to)`: replace `from` with `to` in method names given to
    /// [`Client::method`] and to `rpc_methods!` wrappers.
    pub method_substitution: Option<(char, char)>,
    /// Pretty-print requests with this many spaces per level.
    pub indent: Option<usize>,
}

const CONTENT_TYPE: &str = "Content-Type";
const DEFAULT_CONTENT_TYPE: &str = "text/xml";
/// Status reported when the transport produced no HTTP response.
const NO_RESPONSE_STATUS: u16 = 500;

/// Builder for [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        ClientBuilder::default()
    }

    pub fn from_config(config: ClientConfig) -> Self {
        ClientBuilder { config }
    }

    pub fn destination(mut self, url: impl Into<String>) -> Self {
        self.config.destination = Some(url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = Some(timeout.as_secs_f64());
        self
    }

    /// Map `from` to `to` in accessor-style method names, e.g. `'_'` to `'.'`
    /// so `system_listMethods` calls `system.listMethods`.
    pub fn substitute(mut self, from: char, to: char) -> Self {
        self.config.method_substitution = Some((from, to));
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.config.indent = format.indent;
        self
    }

    fn parse_destination(&self) -> Result<Url> {
        let raw = self
            .config
            .destination
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(Error::MissingDestination)?;
        Url::parse(raw).map_err(|_| Error::InvalidDestination(raw.to_string()))
    }

    /// Build a client that sends through `transport`.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let destination = self.parse_destination()?;
        let config = self.config;

        let mut headers: Vec<(String, String)> = config.headers.into_iter().collect();
        if !headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE))
        {
            headers.push((CONTENT_TYPE.to_string(), DEFAULT_CONTENT_TYPE.to_string()));
        }

        Ok(Client {
            destination,
            headers,
            substitution: config.method_substitution,
            format: Format {
                indent: config.indent,
            },
            transport,
        })
    }

    /// Build a client on the `reqwest` transport.
    #[cfg(feature = "http")]
    pub fn build(self) -> Result<Client<crate::transport::HttpTransport>> {
        // Checked before the HTTP stack is touched.
        self.parse_destination()?;
        let timeout = self
            .config
            .timeout_secs
            .map(Duration::try_from_secs_f64)
            .transpose()
            .map_err(|e| Error::Http(format!("invalid timeout: {e}")))?;
        let transport =
            crate::transport::HttpTransport::new(self.config.user_agent.as_deref(), timeout)?;
        self.build_with_transport(transport)
    }
}

// ── Results ────────────────────────────────────────────────────────────────

/// How a completed call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server returned a value.
    Success(Value),
    /// The server returned a fault. `code` is never zero.
    Fault { code: i32, message: Option<String> },
    /// The HTTP exchange failed; nothing was decoded.
    Transport { status: u16, message: String },
}

/// Timing and payloads of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallTrace {
    pub request: Vec<u8>,
    pub response: HttpResponse,
    pub start_time: DateTime<Utc>,
    /// Building and encoding the request.
    pub format_elapsed: Duration,
    /// The HTTP round trip.
    pub network_elapsed: Duration,
    /// Decoding the response; zero when no decode was attempted.
    pub decode_elapsed: Duration,
    pub total_elapsed: Duration,
}

impl fmt::Display for CallTrace {
    /// One line per step; the alternate form (`{:#}`) appends both bodies.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start:    {}", self.start_time.to_rfc3339())?;
        writeln!(f, "request:  {} bytes", self.request.len())?;
        writeln!(
            f,
            "response: {}, {} bytes",
            self.response.status_line(),
            self.response.body.len()
        )?;
        writeln!(f, "format:   {:.6}s", self.format_elapsed.as_secs_f64())?;
        writeln!(f, "network:  {:.6}s", self.network_elapsed.as_secs_f64())?;
        writeln!(f, "decode:   {:.6}s", self.decode_elapsed.as_secs_f64())?;
        writeln!(f, "total:    {:.6}s", self.total_elapsed.as_secs_f64())?;
        if f.alternate() {
            writeln!(f, "--- request")?;
            writeln!(f, "{}", String::from_utf8_lossy(&self.request))?;
            writeln!(f, "--- response")?;
            writeln!(f, "{}", String::from_utf8_lossy(&self.response.body))?;
        }
        Ok(())
    }
}

/// The outcome of a call together with its trace.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResponse {
    pub outcome: Outcome,
    pub trace: CallTrace,
}

impl CallResponse {
    /// `0` on success, the fault code for faults, the HTTP status for
    /// transport failures.
    pub fn status(&self) -> i32 {
        match &self.outcome {
            Outcome::Success(_) => 0,
            Outcome::Fault { code, .. } => *code,
            Outcome::Transport { status, .. } => i32::from(*status),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// The fault or transport message, if the call did not succeed.
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Fault { message, .. } => message.as_deref(),
            Outcome::Transport { message, .. } => Some(message),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self.outcome {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The success value, or the outcome that ended the call otherwise.
    pub fn into_result(self) -> std::result::Result<Value, Outcome> {
        match self.outcome {
            Outcome::Success(value) => Ok(value),
            other => Err(other),
        }
    }
}

/// A call that ended without a usable response.
///
/// `trace` is present once the request has been encoded, so the bodies that
/// failed to decode can still be inspected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct CallError {
    pub error: Error,
    pub trace: Option<CallTrace>,
}

/// What [`Client::call`] returns.
pub type CallResult = std::result::Result<CallResponse, CallError>;

impl From<Error> for CallError {
    fn from(error: Error) -> Self {
        CallError { error, trace: None }
    }
}

impl From<CallError> for Error {
    fn from(e: CallError) -> Self {
        e.error
    }
}

// ── Client ─────────────────────────────────────────────────────────────────

/// An XML-RPC client bound to one destination.
#[derive(Debug, Clone)]
pub struct Client<T> {
    destination: Url,
    headers: Vec<(String, String)>,
    substitution: Option<(char, char)>,
    format: Format,
    transport: T,
}

impl Client<()> {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> Client<T> {
    pub fn destination(&self) -> &Url {
        &self.destination
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Apply the configured character substitution to `name`.
    pub fn wire_method_name(&self, name: &str) -> String {
        match self.substitution {
            Some((from, to)) => name.replace(from, &to.to_string()),
            None => name.to_string(),
        }
    }

    /// A handle for calling `name`, after character substitution.
    pub fn method(&self, name: &str) -> MethodCaller<'_, T> {
        MethodCaller {
            client: self,
            method_name: self.wire_method_name(name),
        }
    }

    /// Call `method` with `params`, verbatim.
    ///
    /// Faults and failed HTTP statuses are returned as an [`Outcome`]; a
    /// transport that gives up without a response counts as status `500`.
    /// `Err` means the request could not be built or the response could not
    /// be read, including an empty body.
    pub fn call<I, P>(&self, method: &str, params: I) -> CallResult
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        let started = Instant::now();
        let start_time = Utc::now();
        tracing::debug!(method, destination = %self.destination, "xml-rpc call");

        // Formatting
        let call = MethodCall::new(method, codec::build_params(params)?);
        let request = codec::encode_call(&call, self.format)?;
        let format_elapsed = started.elapsed();
        tracing::trace!(method, bytes = request.len(), "request encoded");

        // Transmitting
        let response = self
            .transport
            .post(&self.destination, &self.headers, request.clone())
            .unwrap_or_else(|e| {
                tracing::debug!(method, error = %e, "transport gave up without a response");
                HttpResponse::new(NO_RESPONSE_STATUS, e.to_string(), Vec::new())
            });
        let network_elapsed = started.elapsed().saturating_sub(format_elapsed);

        let mut trace = CallTrace {
            request,
            response,
            start_time,
            format_elapsed,
            network_elapsed,
            decode_elapsed: Duration::ZERO,
            total_elapsed: Duration::ZERO,
        };

        if !trace.response.is_success() {
            let status = trace.response.status;
            let message = trace.response.status_line();
            tracing::debug!(method, status, status_line = %message, "xml-rpc transport failure");
            trace.total_elapsed = started.elapsed();
            return Ok(CallResponse {
                outcome: Outcome::Transport { status, message },
                trace,
            });
        }

        // Decoding
        let decode_started = Instant::now();
        let outcome = codec::decode_response(&trace.response.body).and_then(|decoded| {
            Ok(match decoded {
                MethodResponse::Success(value) => Outcome::Success(value),
                MethodResponse::Fault(fault) => {
                    let (code, message) = convert::fault_code(&fault)?;
                    Outcome::Fault { code, message }
                }
            })
        });
        trace.decode_elapsed = decode_started.elapsed();
        trace.total_elapsed = started.elapsed();

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::debug!(
                    method,
                    %error,
                    body = %String::from_utf8_lossy(&trace.response.body),
                    "undecodable xml-rpc response"
                );
                return Err(CallError {
                    error,
                    trace: Some(trace),
                });
            }
        };

        let response = CallResponse { outcome, trace };
        tracing::debug!(
            method,
            status = response.status(),
            elapsed_ms = response.trace.total_elapsed.as_millis() as u64,
            "xml-rpc call finished"
        );
        Ok(response)
    }

    /// Entry point for `rpc_methods!` wrappers: an explicit `wire_name` is
    /// used as-is, otherwise `accessor` goes through substitution.
    #[doc(hidden)]
    pub fn call_accessor<I, P>(
        &self,
        accessor: &str,
        wire_name: Option<&str>,
        params: I,
    ) -> CallResult
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        match wire_name {
            Some(name) => self.call(name, params),
            None => self.method(accessor).call(params),
        }
    }
}

/// A method bound to a client, see [`Client::method`].
#[derive(Debug)]
pub struct MethodCaller<'a, T> {
    client: &'a Client<T>,
    method_name: String,
}

impl<T: Transport> MethodCaller<'_, T> {
    /// The name sent on the wire.
    pub fn name(&self) -> &str {
        &self.method_name
    }

    pub fn call<I, P>(&self, params: I) -> CallResult
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        self.client.call(&self.method_name, params)
    }
}

// ── Named wrappers ─────────────────────────────────────────────────────────

/// Declare a trait with one wrapper function per RPC method, implemented
/// for every [`Client`].
///
/// A bare function name is sent through the client's character
/// substitution; `fn name = "wire.name";` sends the given name verbatim.
///
/// ```rust
/// use xmlrpc_serde::rpc_methods;
///
/// rpc_methods! {
///     /// Methods of the quote service.
///     pub trait QuoteService {
///         fn get_quote = "getQuote";
///         #[allow(non_snake_case)]
///         fn system_listMethods;
///     }
/// }
/// ```
#[macro_export]
macro_rules! rpc_methods {
    (@wire) => { ::core::option::Option::None };
    (@wire $wire:literal) => { ::core::option::Option::Some($wire) };
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident {
            $(
                $(#[$fmeta:meta])*
                fn $fn_name:ident $(= $wire:literal)?;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name {
            $(
                $(#[$fmeta])*
                fn $fn_name<I, P>(&self, params: I) -> $crate::client::CallResult
                where
                    I: ::core::iter::IntoIterator<Item = P>,
                    P: ::core::convert::Into<$crate::codec::Param>;
            )*
        }

        impl<T: $crate::transport::Transport> $name for $crate::client::Client<T> {
            $(
                #[allow(non_snake_case)]
                fn $fn_name<I, P>(&self, params: I) -> $crate::client::CallResult
                where
                    I: ::core::iter::IntoIterator<Item = P>,
                    P: ::core::convert::Into<$crate::codec::Param>,
                {
                    self.call_accessor(
                        ::core::stringify!($fn_name),
                        $crate::rpc_methods!(@wire $($wire)?),
                        params,
                    )
                }
            )*
        }
    };
}
