//! Outcome-to-HTTP translation: the single terminal sink for every request.
//!
//! Successful outcomes become `200` with a JSON body (or no body at all).
//! Errors resolve to their embedded status when it is a recognized HTTP
//! status and to `500` otherwise, and are written as plain text.

use std::time::Instant;

use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use opserve_core::OperationError;
use tracing::{error, info};

/// Resolves the HTTP status for an error.
///
/// An embedded code is used only if it is a status with a canonical reason
/// phrase; anything else (unset, out of range, unassigned) becomes `500`.
#[must_use]
pub fn resolve_status(err: &OperationError) -> StatusCode {
    err.status()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|status| status.canonical_reason().is_some())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Converts a dispatch outcome into the HTTP response, logging errors and
/// recording request metrics.
pub fn respond(
    method: &Method,
    path: &str,
    outcome: Result<Option<Vec<u8>>, OperationError>,
    started: Instant,
) -> Response {
    let response = match outcome {
        Ok(Some(body)) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        // No response value: empty 200.
        Ok(None) => StatusCode::OK.into_response(),
        Err(err) => error_response(method, path, &err),
    };
    record_request(response.status(), started);
    response
}

fn error_response(method: &Method, path: &str, err: &OperationError) -> Response {
    let status = resolve_status(err);
    if status.is_server_error() {
        error!(
            method = %method,
            path = path,
            status = status.as_u16(),
            kind = err.kind().as_str(),
            error = ?err,
            "HTTP {method} {path} -> {status}: {err}"
        );
    } else {
        info!(
            method = %method,
            path = path,
            status = status.as_u16(),
            kind = err.kind().as_str(),
            "HTTP {method} {path} -> {status}: {err}"
        );
    }

    let mut body = err.to_string();
    body.push('\n');
    (
        status,
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        body,
    )
        .into_response()
}

fn record_request(status: StatusCode, started: Instant) {
    let status = status.as_u16().to_string();
    metrics::counter!("opserve_requests_total", "status" => status).increment(1);
    metrics::histogram!("opserve_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use opserve_core::{ErrorKind, OperationError};

    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn recognized_status_is_used() {
        let err = OperationError::with_code(409, "conflict");
        assert_eq!(resolve_status(&err), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_status_defaults_to_500() {
        let err = OperationError::handler("boom");
        assert_eq!(resolve_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn out_of_range_status_defaults_to_500() {
        let err = OperationError::with_code(42, "weird");
        assert_eq!(resolve_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
        let err = OperationError::with_code(1000, "weird");
        assert_eq!(resolve_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unassigned_status_defaults_to_500() {
        let err = OperationError::with_code(599, "unassigned");
        assert_eq!(resolve_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn encoding_error_is_500() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = OperationError::encoding(json_err);
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert_eq!(resolve_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn json_body_gets_json_content_type() {
        let resp = respond(
            &Method::GET,
            "/ping",
            Ok(Some(br#"{"ok":true}"#.to_vec())),
            Instant::now(),
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_text(resp).await, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn absent_response_is_empty_200() {
        let resp = respond(&Method::POST, "/silent", Ok(None), Instant::now());
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_text(resp).await, "");
    }

    #[tokio::test]
    async fn error_is_written_as_plain_text() {
        let err = OperationError::with_code(409, "name taken").context("create handler failed");
        let resp = respond(&Method::POST, "/create", Err(err), Instant::now());
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(resp.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(body_text(resp).await, "create handler failed: name taken\n");
    }

    #[tokio::test]
    async fn server_error_message_is_the_only_detail_exposed() {
        let err = OperationError::handler("db down")
            .with_source(std::io::Error::other("connection refused on 10.0.0.7"))
            .context("list handler failed");
        let resp = respond(&Method::GET, "/list", Err(err), Instant::now());
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(resp).await;
        assert_eq!(body, "list handler failed: db down\n");
        assert!(!body.contains("10.0.0.7"));
    }
}
