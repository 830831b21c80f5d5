//! Minimal braid example: a terminal handler behind the built-in middleware.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example chain

use bytes::Bytes;
use braid::middleware::{Recover, RequestId, Trace};
use braid::{chain, Context, Error, Handle, Middleware};
use http::StatusCode;

fn main() {
    tracing_subscriber::fmt::init();

    let app = chain(greet, [
        Middleware::from(Recover::new()),
        Middleware::from(Trace::new()),
        Middleware::from(RequestId::new().trust_incoming(true)),
        require_name(),
    ]);

    for uri in ["/greet?name=alice", "/greet"] {
        let request = http::Request::builder()
            .uri(uri)
            .header("x-request-id", "demo-1")
            .body(Bytes::new())
            .expect("valid request");

        let response = app.respond(request);
        println!("{uri} -> {} {:?}", response.status(), response.headers());
    }
}

// Rejects requests without a `name` query parameter before they reach the
// handler.
fn require_name() -> Middleware {
    Middleware::new(|next: Handle| {
        Handle::new(move |ctx| {
            if name(ctx).is_none() {
                return Err(Error::bad_request("missing `name`"));
            }
            next.call(ctx)
        })
    })
}

fn greet(ctx: &mut Context) -> Result<(), Error> {
    let name = name(ctx).unwrap_or("stranger").to_owned();
    ctx.text(StatusCode::OK, &format!("hello, {name}"));
    Ok(())
}

fn name(ctx: &Context) -> Option<&str> {
    ctx.request()
        .uri()
        .query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("name="))
}
