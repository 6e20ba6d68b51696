//! Request spans for the HTTP server.
//!
//! Every request runs inside a root span carrying the default HTTP fields, the
//! time the request took, and the username of the caller once their
//! credentials have been verified. Anonymous requests leave `username` empty.

use std::time::{Duration, Instant};

use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    HttpMessage, HttpRequest,
};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpan, RootSpanBuilder};

/// Requests taking longer than this are logged at `warn`.
const SLOW_REQUEST: Duration = Duration::from_secs(5);

/// Root span field holding the authenticated username.
const USERNAME: &str = "username";

/// `DefaultRootSpanBuilder` plus the caller and request timings.
pub struct SnippetsRootSpanBuilder;

/// When the request reached the server.
struct Received(Instant);

/// The root span of `req`, if the request is being traced.
#[must_use]
pub fn root_span(req: &HttpRequest) -> Option<RootSpan> {
    req.extensions().get::<RootSpan>().cloned()
}

/// Record the authenticated `username` on a request's root span.
pub fn record_username(root_span: Option<&RootSpan>, username: &str) {
    if let Some(span) = root_span {
        span.record(USERNAME, username);
    }
}

impl RootSpanBuilder for SnippetsRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> tracing::Span {
        // The extensions borrow must end before `root_span!` borrows `request`.
        request.extensions_mut().insert(Received(Instant::now()));
        tracing_actix_web::root_span!(
            request,
            username = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    }

    fn on_request_end<B: actix_web::body::MessageBody>(
        span: tracing::Span,
        outcome: &Result<ServiceResponse<B>, actix_web::Error>,
    ) {
        if let Ok(response) = outcome.as_ref() {
            let elapsed = response
                .request()
                .extensions()
                .get::<Received>()
                .map(|received| received.0.elapsed());
            if let Some(elapsed) = elapsed {
                span.record("duration_ms", elapsed.as_millis());
                if elapsed > SLOW_REQUEST {
                    tracing::warn!(duration_ms = elapsed.as_millis(), "Slow HTTP request");
                }
            }
            let status = response.status();
            if status.is_client_error() {
                // `ApiError` rejections arrive as handled responses.
                tracing::debug!(status = status.as_u16(), "Request rejected");
            }
        }
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}
