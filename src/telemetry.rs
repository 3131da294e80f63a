//! Structured logging and per-request correlation ids.

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info_span, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Correlation id attached to each request; echoed back in every response
/// and stamped onto every span, so a submission can be traced without ever
/// logging its payload.
#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

/// Install the JSON tracing subscriber. `RUST_LOG` controls the filter,
/// defaulting to `info`. Safe to call more than once (later calls no-op).
pub fn init() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();

    Ok(())
}

pub fn correlation_header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).expect("correlation id header")
}

/// Middleware that adopts the caller's correlation id (or mints one) and
/// echoes it back on the response.
pub async fn correlation_layer(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(CorrelationId(id.clone()));
    req.headers_mut()
        .insert(CORRELATION_ID_HEADER, correlation_header_value(&id));

    let span = info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        correlation_id = %id
    );
    let _enter = span.enter();

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(CORRELATION_ID_HEADER, correlation_header_value(&id));
    response
}

pub fn request_span(operation: &str, correlation_id: &str) -> Span {
    info_span!(
        "gateway.op",
        operation,
        correlation_id = %correlation_id
    )
}
