//! Per-request tracing span with method, path, status, and latency.

use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};

use crate::handler::{Handle, Middleware};

/// Opens a `request` span around the rest of the chain and logs one event
/// when it returns.
///
/// Outcomes are never altered: output and errors pass through as produced.
///
/// ```rust
/// use std::time::Duration;
/// use braid::middleware::Trace;
///
/// let trace = Trace::new().slow_after(Duration::from_millis(250));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Trace {
    slow_after: Option<Duration>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests taking at least `threshold` are logged at `warn` instead of
    /// `info`.
    pub fn slow_after(mut self, threshold: Duration) -> Self {
        self.slow_after = Some(threshold);
        self
    }
}

impl From<Trace> for Middleware {
    fn from(trace: Trace) -> Self {
        let slow_after = trace.slow_after;

        Middleware::new(move |next: Handle| {
            Handle::new(move |ctx| {
                let span = info_span!("request", method = %ctx.method(), path = ctx.path());
                let _guard = span.enter();

                let started = Instant::now();
                let result = next.call(ctx);
                let elapsed = started.elapsed();
                let latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(()) if slow_after.is_some_and(|t| elapsed >= t) => {
                        warn!(status = ctx.status().as_u16(), latency_ms, "slow request");
                    }
                    Ok(()) => {
                        info!(status = ctx.status().as_u16(), latency_ms, "request completed");
                    }
                    Err(e) => {
                        warn!(status = e.status_code().as_u16(), latency_ms, "request failed: {e}");
                    }
                }

                result
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use http::StatusCode;

    use super::*;
    use crate::{chain, Context, Error};

    fn init_logs() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    /// Runs one request through `trace` and returns what it logged.
    fn logged(trace: Trace) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let handle = chain(
            Handle::new(|ctx| {
                ctx.write_string("ok");
                Ok(())
            }),
            [Middleware::from(trace)],
        );
        tracing::subscriber::with_default(subscriber, || {
            handle.call(&mut Context::default()).unwrap();
        });

        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn logs_completion_with_status_and_latency() {
        let out = logged(Trace::new());
        assert!(out.contains("INFO"), "{out}");
        assert!(out.contains("request completed"), "{out}");
        assert!(out.contains("status=200"), "{out}");
        assert!(out.contains("latency_ms="), "{out}");
        assert!(out.contains("path=\"/\""), "{out}");
        assert!(!out.contains("slow request"), "{out}");
    }

    #[test]
    fn logs_slow_requests_at_warn() {
        let out = logged(Trace::new().slow_after(Duration::ZERO));
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("slow request"), "{out}");
        assert!(out.contains("status=200"), "{out}");
        assert!(!out.contains("request completed"), "{out}");
    }

    #[test]
    fn passes_output_through() {
        init_logs();
        let handle = chain(
            Handle::new(|ctx| {
                ctx.set_status(StatusCode::CREATED);
                ctx.write_string("made");
                Ok(())
            }),
            [Middleware::from(Trace::new())],
        );

        let mut ctx = Context::default();
        handle.call(&mut ctx).unwrap();
        assert_eq!(ctx.status(), StatusCode::CREATED);
        assert_eq!(ctx.written(), b"made");
    }

    #[test]
    fn passes_errors_through_unchanged() {
        init_logs();
        let handle = chain(
            Handle::new(|_| Err(Error::not_found())),
            [Middleware::from(Trace::new().slow_after(Duration::ZERO))],
        );

        let err = handle.call(&mut Context::default()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "not found");
    }
}
