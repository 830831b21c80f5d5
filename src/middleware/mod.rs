//! Built-in middleware.
//!
//! Middleware is the right place for cross-cutting concerns. Each built-in is
//! a small config value that converts into a [`Middleware`](crate::Middleware):
//!
//! - [`Trace`] — per-request span with method, path, status, latency
//! - [`Recover`] — panic anywhere below it becomes a `500`
//! - [`RequestId`] — propagate or generate an `x-request-id`
//!
//! ```rust
//! use braid::{chain, Context, Error, Middleware};
//! use braid::middleware::{Recover, RequestId, Trace};
//!
//! fn index(ctx: &mut Context) -> Result<(), Error> {
//!     ctx.write_string("hello");
//!     Ok(())
//! }
//!
//! let app = chain(index, [
//!     Middleware::from(Recover::new()),
//!     Middleware::from(Trace::new()),
//!     Middleware::from(RequestId::new()),
//! ]);
//! ```

mod recover;
mod request_id;
mod trace;

pub use recover::Recover;
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdValue};
pub use trace::Trace;
