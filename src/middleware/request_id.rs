//! Request ID propagation.
//!
//! Every request gets an identifier that ties its log lines together and is
//! echoed back to the client in a response header.
//!
//! ## Sources
//!
//! 1. **Incoming header** — used only when [`RequestId::trust_incoming`] is
//!    enabled and the value looks sane (non-empty, at most 128 visible ASCII
//!    characters). Turn this on behind a proxy that already assigns ids.
//! 2. **UUID v7** — generated otherwise. Time-ordered, so ids sort by arrival.
//!
//! Handlers further down the chain read the id from the context extensions:
//!
//! ```rust
//! use braid::{Context, Error};
//! use braid::middleware::RequestIdValue;
//!
//! fn handler(ctx: &mut Context) -> Result<(), Error> {
//!     let id = ctx.extensions().get::<RequestIdValue>().map(|v| v.to_string());
//!     ctx.write_string(id.as_deref().unwrap_or("-"));
//!     Ok(())
//! }
//! ```

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::handler::{Handle, Middleware};

/// Default header read from the request and written to the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INCOMING_LEN: usize = 128;

/// The id assigned to the current request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestIdValue(String);

impl RequestIdValue {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RequestIdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assigns a [`RequestIdValue`] to each request and echoes it back.
///
/// ```rust
/// use braid::middleware::RequestId;
///
/// let request_id = RequestId::new()
///     .header("x-correlation-id")
///     .trust_incoming(true);
/// ```
#[derive(Clone, Debug)]
pub struct RequestId {
    header: String,
    trust_incoming: bool,
}

impl RequestId {
    pub fn new() -> Self {
        Self { header: REQUEST_ID_HEADER.to_owned(), trust_incoming: false }
    }

    /// Header to read from and write to. Defaults to `x-request-id`.
    ///
    /// An invalid name surfaces as [`Error::Header`](crate::Error::Header)
    /// when the response header is written.
    pub fn header(mut self, name: &str) -> Self {
        self.header = name.to_ascii_lowercase();
        self
    }

    /// Reuse the caller's id instead of generating one. Off by default.
    pub fn trust_incoming(mut self, trust: bool) -> Self {
        self.trust_incoming = trust;
        self
    }
}

impl Default for RequestId {
    fn default() -> Self { Self::new() }
}

fn acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_INCOMING_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

impl From<RequestId> for Middleware {
    fn from(config: RequestId) -> Self {
        Middleware::new(move |next: Handle| {
            let config = config.clone();
            Handle::new(move |ctx| {
                let incoming = config
                    .trust_incoming
                    .then(|| ctx.header(&config.header))
                    .flatten()
                    .filter(|id| acceptable(id))
                    .map(str::to_owned);

                let id = match incoming {
                    Some(id) => id,
                    None => {
                        let id = Uuid::now_v7().to_string();
                        debug!(request_id = %id, "assigned request id");
                        id
                    }
                };

                ctx.extensions_mut().insert(RequestIdValue(id.clone()));
                next.call(ctx)?;
                ctx.set_header(&config.header, &id)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{chain, Context, Error};

    fn request_with(header: &str, value: &str) -> Context {
        Context::new(
            http::Request::builder()
                .uri("/orders")
                .header(header, value)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    fn echo_id() -> Handle {
        Handle::new(|ctx| {
            let id = ctx.extensions().get::<RequestIdValue>().cloned();
            ctx.write_string(id.as_ref().map_or("-", RequestIdValue::as_str));
            Ok(())
        })
    }

    #[test]
    fn generates_id_when_missing() {
        let handle = chain(echo_id(), [Middleware::from(RequestId::new())]);
        let mut ctx = Context::default();
        handle.call(&mut ctx).unwrap();

        let header = ctx.response_headers()[REQUEST_ID_HEADER].to_str().unwrap().to_owned();
        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(ctx.written(), header.as_bytes());
    }

    #[test]
    fn ignores_incoming_id_by_default() {
        let handle = chain(echo_id(), [Middleware::from(RequestId::new())]);
        let mut ctx = request_with(REQUEST_ID_HEADER, "from-client");
        handle.call(&mut ctx).unwrap();

        assert_ne!(ctx.response_headers()[REQUEST_ID_HEADER], "from-client");
    }

    #[test]
    fn reuses_trusted_incoming_id_under_custom_header() {
        let config = RequestId::new().header("X-Correlation-Id").trust_incoming(true);
        let handle = chain(echo_id(), [Middleware::from(config)]);
        let mut ctx = request_with("x-correlation-id", "abc-123");
        handle.call(&mut ctx).unwrap();

        assert_eq!(ctx.written(), b"abc-123");
        assert_eq!(ctx.response_headers()["x-correlation-id"], "abc-123");
    }

    #[test]
    fn replaces_unacceptable_incoming_id() {
        let config = RequestId::new().trust_incoming(true);
        let handle = chain(echo_id(), [Middleware::from(config)]);
        let too_long = "x".repeat(MAX_INCOMING_LEN + 1);

        for incoming in ["", "has space", too_long.as_str()] {
            let mut ctx = request_with(REQUEST_ID_HEADER, incoming);
            handle.call(&mut ctx).unwrap();

            let header = ctx.response_headers()[REQUEST_ID_HEADER].to_str().unwrap();
            assert!(Uuid::parse_str(header).is_ok(), "kept {incoming:?}");
        }
    }

    #[test]
    fn errors_pass_through_without_header() {
        let handle = chain(
            Handle::new(|_| Err(Error::bad_request("bad"))),
            [Middleware::from(RequestId::new())],
        );
        let mut ctx = Context::default();
        let err = handle.call(&mut ctx).unwrap_err();

        assert_eq!(err.to_string(), "bad");
        assert!(ctx.response_headers().get(REQUEST_ID_HEADER).is_none());
    }
}
