use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::SubmissionError;
use crate::telemetry::{correlation_header_value, CorrelationId, CORRELATION_ID_HEADER};

#[derive(Debug, Error)]
pub enum AppErrorKind {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("secret store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("unexpected error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
#[error("{kind}")]
pub struct AppError {
    kind: AppErrorKind,
    correlation_id: Option<String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            correlation_id: None,
        }
    }

    pub fn with_correlation(mut self, id: String) -> Self {
        self.correlation_id = Some(id);
        self
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            AppErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppErrorKind::Conflict(_) => StatusCode::CONFLICT,
            AppErrorKind::StoreUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    correlation_id: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation = self.correlation_id.clone();
        let body = Json(ErrorBody {
            error: match &self.kind {
                AppErrorKind::BadRequest(_) => "bad_request",
                AppErrorKind::Conflict(_) => "conflict",
                AppErrorKind::StoreUnavailable(_) => "store_unavailable",
                AppErrorKind::Internal(_) => "internal",
            },
            message: self.kind.to_string(),
            correlation_id: correlation.as_deref(),
        });

        let mut response = (status, body).into_response();
        if let Some(id) = correlation {
            response
                .headers_mut()
                .insert(CORRELATION_ID_HEADER, correlation_header_value(&id));
        }
        response
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        let kind = match value {
            err @ SubmissionError::InvalidInput => AppErrorKind::BadRequest(err.to_string()),
            err @ SubmissionError::StoreConflictExhausted { .. } => {
                AppErrorKind::Conflict(err.to_string())
            }
            SubmissionError::StoreUnavailable { detail } => {
                AppErrorKind::StoreUnavailable(detail)
            }
        };
        AppError::new(kind)
    }
}

pub fn attach_correlation(err: AppError, correlation: &CorrelationId) -> AppError {
    err.with_correlation(correlation.0.clone())
}
