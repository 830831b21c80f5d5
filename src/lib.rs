//! # braid
//!
//! Handler and middleware chaining for HTTP services.
//!
//! ## The contract
//!
//! A [`Handle`] processes one request by writing into a [`Context`]. A
//! [`Middleware`] takes the next handle and returns a new one that may call
//! it. [`chain`] folds a terminal handler and an ordered list of middleware
//! into a single handle: the first middleware runs first, the terminal runs
//! last, and any middleware can stop the chain by not calling `next`.
//!
//! What braid does not do: routing, reading requests off a socket, or
//! managing connections. The host owns those and hands braid an
//! `http::Request<Bytes>` through [`Handle::respond`].
//!
//! ## Quick start
//!
//! ```rust
//! use braid::{chain, Context, Error, Handle, Middleware};
//! use braid::middleware::{Recover, Trace};
//!
//! fn hello(ctx: &mut Context) -> Result<(), Error> {
//!     ctx.write_string("hello");
//!     Ok(())
//! }
//!
//! let banner = Middleware::new(|next: Handle| {
//!     Handle::new(move |ctx| {
//!         ctx.write_string("> ");
//!         next.call(ctx)
//!     })
//! });
//!
//! let app = chain(hello, [
//!     Middleware::from(Recover::new()),
//!     Middleware::from(Trace::new()),
//!     banner,
//! ]);
//!
//! let mut ctx = Context::default();
//! app.call(&mut ctx).unwrap();
//! assert_eq!(ctx.written(), b"> hello");
//! ```

mod context;
mod error;
mod handler;

pub mod middleware;

pub use context::Context;
pub use error::Error;
pub use handler::{Handle, Handler, Middleware, chain};
