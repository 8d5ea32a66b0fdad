//! The decorated request handed to middleware and handlers.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;

/// An inbound HTTP request, wrapped once by the request adapter.
///
/// Wraps the raw request's parts together with the fully collected body,
/// the matched path parameters, and the peer address. It adds nothing
/// else: accessors over what the wire already carried, plus routing
/// metadata. One `Request` exists per inbound request and it is dropped
/// when the response has been produced.
pub struct Request {
    parts: http::request::Parts,
    body: Bytes,
    params: HashMap<String, String>,
    remote_addr: SocketAddr,
}

impl Request {
    pub(crate) fn new(
        parts: http::request::Parts,
        body: Bytes,
        params: HashMap<String, String>,
        remote_addr: SocketAddr,
    ) -> Self {
        Self { parts, body, params, remote_addr }
    }

    pub fn method(&self) -> &http::Method {
        &self.parts.method
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    pub fn headers(&self) -> &http::HeaderMap {
        &self.parts.headers
    }

    /// Header lookup by name. Returns `None` for missing headers and for
    /// values that are not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The request body, already read off the wire in full.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The peer address of the connection this request arrived on.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri(uri)
            .header("x-tag", "alpha")
            .body(())
            .unwrap()
            .into_parts();
        let params = HashMap::from([("id".to_owned(), "42".to_owned())]);
        Request::new(parts, Bytes::from_static(b"hello"), params, "127.0.0.1:9999".parse().unwrap())
    }

    #[test]
    fn accessors_expose_the_wrapped_request() {
        let req = request("/users/42?verbose=1");
        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query(), Some("verbose=1"));
        assert_eq!(req.body(), b"hello");
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("missing"), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request("/");
        assert_eq!(req.header("X-Tag"), Some("alpha"));
        assert_eq!(req.header("x-tag"), Some("alpha"));
        assert_eq!(req.header("x-other"), None);
    }
}
