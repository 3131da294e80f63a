use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, routing::post, Extension, Json, Router};
use tracing::Instrument;

use crate::error::{attach_correlation, AppError, AppErrorKind};
use crate::models::{StoredResponse, SubmitRequest};
use crate::state::AppState;
use crate::telemetry::{correlation_layer, request_span, CorrelationId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(login_form))
        .route("/submit", post(submit))
        .route("/healthz", get(health_check))
        .layer(middleware::from_fn(correlation_layer))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn login_form() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn submit(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, AppError> {
    let span = request_span("http.submit", &correlation.0);
    async move {
        let request = SubmitRequest::from_body(&headers, &body)
            .map_err(|err| AppError::new(AppErrorKind::BadRequest(err)))?;
        let receipt = state
            .pipeline
            .submit(&request.username, &request.password)
            .await
            .map_err(AppError::from)?;

        let response = if request.respond_json {
            (
                StatusCode::CREATED,
                Json(StoredResponse {
                    path: receipt.path.to_string(),
                }),
            )
                .into_response()
        } else {
            (
                StatusCode::CREATED,
                Html(stored_page(receipt.path.as_str())),
            )
                .into_response()
        };
        Ok(response)
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Secure Login Demo</title>
  </head>
  <body style="max-width:480px;margin:40px auto;font-family:system-ui;">
    <h1>Secure Login Demo</h1>
    <form method="POST" action="/submit">
      <label>Username<br><input name="username" required></label><br><br>
      <label>Password<br><input name="password" type="password" required></label><br><br>
      <button type="submit">Save to Vault</button>
    </form>
    <p style="color:#666">Credentials are not logged or stored locally &mdash; they are securely sent to Vault (KV v2).</p>
  </body>
</html>
"#;

fn stored_page(path: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <body style="font-family:system-ui;">
    <h2>Stored Securely</h2>
    <p>Your credentials have been securely stored in Vault.</p>
    <p style="color:#666">Reference: {path}</p>
    <a href="/">Return to form</a>
  </body>
</html>
"#
    )
}
