//! HTTP transport.
//!
//! The client only needs one operation: POST a body with some headers and
//! get back a status line and a body. [`Transport`] captures that so calls
//! can run over any HTTP stack, or over an in-memory stub in tests.

use crate::error::Result;
use url::Url;

/// What came back from one POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase (`"OK"`, `"Internal Server Error"`, or an error text
    /// for failures that never reached the server).
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `"500 Internal Server Error"`
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends one request and waits for the answer. Timeouts are the
/// transport's business. The client reports an `Err` from `post` as a
/// failed call with status `500` and the error text as reason.
pub trait Transport {
    fn post(&self, url: &Url, headers: &[(String, String)], body: Vec<u8>) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, url: &Url, headers: &[(String, String)], body: Vec<u8>) -> Result<HttpResponse> {
        (**self).post(url, headers, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post(&self, url: &Url, headers: &[(String, String)], body: Vec<u8>) -> Result<HttpResponse> {
        (**self).post(url, headers, body)
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::{HttpResponse, Transport};
    use crate::error::{Error, Result};
    use std::time::Duration;
    use url::Url;

    /// Status reported when the request never produced an HTTP response.
    const NO_RESPONSE_STATUS: u16 = 500;

    /// Blocking transport on top of `reqwest`.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::blocking::Client,
    }

    impl HttpTransport {
        pub fn new(user_agent: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
            let mut builder = reqwest::blocking::Client::builder();
            if let Some(agent) = user_agent {
                builder = builder.user_agent(agent.to_string());
            }
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder.build().map_err(|e| Error::Http(e.to_string()))?;
            Ok(HttpTransport { client })
        }

        pub fn from_client(client: reqwest::blocking::Client) -> Self {
            HttpTransport { client }
        }
    }

    impl Transport for HttpTransport {
        /// Connection failures and timeouts come back as a synthetic `500`
        /// carrying the error text, so they surface like any other failed
        /// status instead of aborting the call.
        fn post(
            &self,
            url: &Url,
            headers: &[(String, String)],
            body: Vec<u8>,
        ) -> Result<HttpResponse> {
            let mut request = self.client.post(url.clone()).body(body);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let response = match request.send() {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(%url, error = %e, "request failed before a response arrived");
                    return Ok(HttpResponse::new(NO_RESPONSE_STATUS, e.to_string(), Vec::new()));
                }
            };

            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let reason = status.canonical_reason().unwrap_or_default().to_string();
            let body = match response.bytes() {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    return Ok(HttpResponse::new(NO_RESPONSE_STATUS, e.to_string(), Vec::new()));
                }
            };

            Ok(HttpResponse {
                status: status.as_u16(),
                reason,
                headers,
                body,
            })
        }
    }
}
