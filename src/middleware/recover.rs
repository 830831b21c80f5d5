//! Panic recovery.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;
use tracing::error;

use crate::error::Error;
use crate::handler::{Handle, Middleware};

/// Turns a panic anywhere further down the chain into a `500`.
///
/// Whatever the panicking handler had written is discarded. Place it first
/// so it covers every other layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl Recover {
    pub fn new() -> Self { Self }
}

impl From<Recover> for Middleware {
    fn from(_: Recover) -> Self {
        Middleware::new(|next: Handle| {
            Handle::new(move |ctx| {
                match panic::catch_unwind(AssertUnwindSafe(|| next.call(ctx))) {
                    Ok(result) => result,
                    Err(payload) => {
                        error!(path = ctx.path(), "handler panicked: {}", panic_message(&*payload));
                        ctx.reset();
                        Err(Error::status(StatusCode::INTERNAL_SERVER_ERROR, "internal server error"))
                    }
                }
            })
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chain, Context};

    #[test]
    fn panic_becomes_internal_server_error() {
        let handle = chain(
            Handle::new(|ctx| {
                ctx.write_string("about to fail");
                panic!("kaboom");
            }),
            [Middleware::from(Recover::new())],
        );

        let mut ctx = Context::default();
        let err = handle.call(&mut ctx).unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(ctx.written().is_empty());
    }

    #[test]
    fn ordinary_outcomes_pass_through() {
        let ok = chain(
            Handle::new(|ctx| {
                ctx.write_string("fine");
                Ok(())
            }),
            [Middleware::from(Recover::new())],
        );
        let mut ctx = Context::default();
        ok.call(&mut ctx).unwrap();
        assert_eq!(ctx.written(), b"fine");

        let failing = chain(
            Handle::new(|_| Err(Error::bad_request("no body"))),
            [Middleware::from(Recover::new())],
        );
        let err = failing.call(&mut Context::default()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn extracts_panic_messages() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
