//! Per-request context: the incoming request plus a buffered response.
//!
//! Handlers never build a response value and return it. They write into the
//! [`Context`] they are given, the same way a `ResponseWriter` works, and the
//! caller finalizes it with [`Context::into_response`] once the chain returns.
//! That is what lets a middleware write a prefix, call the next handler, and
//! have both outputs land in one body.

use std::fmt;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Extensions, HeaderMap, Method, StatusCode};
use http_body_util::Full;

use crate::error::Error;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Request view and response sink for one invocation of a handler chain.
///
/// Owned by the caller for the duration of a single call. Never shared
/// between invocations.
pub struct Context {
    request: http::Request<Bytes>,
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Context {
    pub fn new(request: http::Request<Bytes>) -> Self {
        Self {
            request,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    // ── Request side ──────────────────────────────────────────────────────────

    pub fn request(&self) -> &http::Request<Bytes> { &self.request }
    pub fn method(&self) -> &Method { self.request.method() }
    pub fn path(&self) -> &str { self.request.uri().path() }
    pub fn body(&self) -> &[u8] { self.request.body() }

    /// Case-insensitive request header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name)?.to_str().ok()
    }

    /// Typed per-request values set by middleware (e.g. the request id).
    pub fn extensions(&self) -> &Extensions { self.request.extensions() }
    pub fn extensions_mut(&mut self) -> &mut Extensions { self.request.extensions_mut() }

    // ── Response side ─────────────────────────────────────────────────────────

    pub fn status(&self) -> StatusCode { self.status }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn response_headers(&self) -> &HeaderMap { &self.headers }

    /// Sets a response header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::Header(format!("bad name `{name}`")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::Header(format!("bad value for `{name}`")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Appends raw bytes to the response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn write_string(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Everything written to the response body so far.
    pub fn written(&self) -> &[u8] { &self.body }

    /// Replaces the response with `status` and a plain-text body.
    pub fn text(&mut self, status: StatusCode, body: &str) {
        self.replace(status, TEXT_PLAIN, body.as_bytes());
    }

    /// Replaces the response with `status` and a JSON body.
    ///
    /// Takes bytes straight from the serialiser; nothing here inspects them.
    pub fn json(&mut self, status: StatusCode, body: &[u8]) {
        self.replace(status, APPLICATION_JSON, body);
    }

    /// Drops everything written so far and restores `200 OK` with no headers.
    pub fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
    }

    fn replace(&mut self, status: StatusCode, content_type: &'static str, body: &[u8]) {
        self.status = status;
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.body.clear();
        self.body.extend_from_slice(body);
    }

    /// Finalizes the buffered response.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// An empty `GET /` request. Handy for driving a chain without a host.
impl Default for Context {
    fn default() -> Self {
        Self::new(http::Request::new(Bytes::new()))
    }
}

/// `write!(ctx, "...")` appends to the response body.
impl fmt::Write for Context {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}
