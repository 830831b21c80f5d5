//! Handlers, middleware, and the chain composer.
//!
//! # How handlers are stored
//!
//! A chain mixes handlers of *different* concrete types: every closure has its
//! own type, and each middleware wraps the previous handler in yet another
//! one. To hold them behind a single type we erase them into a trait object:
//!
//! ```text
//! |ctx: &mut Context| { … }                 ← user writes this
//!        ↓ Handle::new(f)  /  f.into_handle()
//! Handle(Arc<dyn Fn(&mut Context) -> …>)    ← one heap allocation, once
//!        ↓ middleware.wrap(handle)
//! Handle(Arc<closure capturing `next`>)     ← each layer owns the next one
//!        ↓ handle.call(&mut ctx)  per request
//! ```
//!
//! The per-request cost is one virtual call per layer. Cloning a [`Handle`]
//! is one atomic increment.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use tracing::{debug, error};

use crate::context::Context;
use crate::error::Error;

type HandleFn = dyn Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static;
type MiddlewareFn = dyn Fn(Handle) -> Handle + Send + Sync + 'static;

// ── Handle ────────────────────────────────────────────────────────────────────

/// A type-erased request handler.
///
/// Immutable once built and `Send + Sync`: one composed `Handle` can serve
/// any number of threads at once, provided each call gets its own
/// [`Context`].
#[derive(Clone)]
pub struct Handle(Arc<HandleFn>);

impl Handle {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs the handler. Errors are returned exactly as the handler produced
    /// them.
    pub fn call(&self, ctx: &mut Context) -> Result<(), Error> {
        (self.0)(ctx)
    }

    /// Runs the handler against `request` and finalizes the response.
    ///
    /// This is the seam a host's dispatch path calls. It never fails: an
    /// `Err` from the chain discards whatever was written and is rendered as
    /// its status code with the error message as a plain-text body.
    pub fn respond(&self, request: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let mut ctx = Context::new(request);

        if let Err(e) = self.call(&mut ctx) {
            let status = e.status_code();
            if status.is_server_error() {
                error!(path = ctx.path(), %status, "handler failed: {e}");
            } else {
                debug!(path = ctx.path(), %status, "handler rejected request: {e}");
            }
            ctx.reset();
            ctx.text(status, &e.to_string());
        }

        ctx.into_response()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handle(..)")
    }
}

// ── Handler conversion ────────────────────────────────────────────────────────

/// Anything that can terminate a chain.
///
/// Satisfied automatically by every function or closure with the signature
///
/// ```text
/// fn name(ctx: &mut Context) -> Result<(), Error>
/// ```
///
/// and by [`Handle`] itself, so an already composed chain can be the
/// terminal of another. The trait is sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    fn into_handle(self) -> Handle;
}

mod private {
    pub trait Sealed {}
}

impl<F> private::Sealed for F where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static
{
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
{
    fn into_handle(self) -> Handle {
        Handle::new(self)
    }
}

impl private::Sealed for Handle {}

impl Handler for Handle {
    fn into_handle(self) -> Handle { self }
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// A handler decorator: takes the next handler in the chain, returns a
/// handler that may call it.
///
/// Not calling `next` short-circuits everything after this layer.
///
/// ```rust
/// use braid::{Handle, Middleware};
///
/// let prefix = Middleware::new(|next: Handle| {
///     Handle::new(move |ctx| {
///         ctx.write_string("> ");
///         next.call(ctx)
///     })
/// });
/// ```
#[derive(Clone)]
pub struct Middleware(Arc<MiddlewareFn>);

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handle) -> Handle + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wraps `next` in this middleware.
    pub fn wrap(&self, next: Handle) -> Handle {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware(..)")
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// Composes `handler` with `middlewares` into a single [`Handle`].
///
/// At call time the middlewares run in the order given, then the handler.
/// The first middleware is the outermost layer, so it is wrapped last.
/// With no middlewares the handler is returned as is.
///
/// ```rust
/// use braid::{chain, Context, Error, Handle, Middleware};
///
/// fn hello(ctx: &mut Context) -> Result<(), Error> {
///     ctx.write_string("hello");
///     Ok(())
/// }
///
/// fn echo(s: &'static str) -> Middleware {
///     Middleware::new(move |next: Handle| {
///         Handle::new(move |ctx| {
///             ctx.write_string(s);
///             next.call(ctx)
///         })
///     })
/// }
///
/// let handle = chain(hello, [echo("m1 "), echo("m2 ")]);
///
/// let mut ctx = Context::default();
/// handle.call(&mut ctx).unwrap();
/// assert_eq!(ctx.written(), b"m1 m2 hello");
/// ```
pub fn chain<H, I>(handler: H, middlewares: I) -> Handle
where
    H: Handler,
    I: IntoIterator<Item = Middleware>,
    I::IntoIter: DoubleEndedIterator,
{
    middlewares
        .into_iter()
        .rev()
        .fold(handler.into_handle(), |next, middleware| middleware.wrap(next))
}
