//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and decodes `HttpResponse` values; the actual
//! network call happens behind the `Transport` trait, which the caller
//! supplies. Nothing in the core opens a socket.
//!
//! All fields use owned types (`String`, `Vec`) so a request can be moved
//! into any transport without lifetime concerns.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL without a query string. Query pairs stay
/// separate so the transport encodes them exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Caller-supplied metadata threaded through to the transport untouched.
    pub context: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of the named query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Executes an `HttpRequest` against the network.
///
/// Implementations must return non-2xx responses as `Ok`; only failures to
/// obtain a response at all (DNS, connect, cancellation) are `Err`.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost/notes".to_string(),
            query: vec![("start".to_string(), "0".to_string())],
            headers: vec![("User-Agent".to_string(), "test".to_string())],
            context: BTreeMap::new(),
            body: None,
        }
    }

    #[test]
    fn closure_is_a_transport() {
        let transport = |req: HttpRequest| {
            Ok::<_, TransportError>(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: req.path,
            })
        };
        let resp = transport.execute(request()).unwrap();
        assert_eq!(resp.body, "http://localhost/notes");
    }

    #[test]
    fn header_lookup_ignores_case() {
        assert_eq!(request().header_value("user-agent"), Some("test"));
        assert_eq!(request().query_value("start"), Some("0"));
        assert_eq!(request().query_value("limit"), None);
    }

    #[test]
    fn success_range_is_inclusive() {
        for (status, ok) in [(199, false), (200, true), (204, true), (299, true), (300, false)] {
            let resp = HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            };
            assert_eq!(resp.is_success(), ok, "status {status}");
        }
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
