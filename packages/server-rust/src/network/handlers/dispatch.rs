//! Catch-all handler that feeds every request into the dispatcher.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use percent_encoding::percent_decode_str;
use tracing::info;

use super::AppState;
use crate::network::middleware::REQUEST_ID_HEADER;
use crate::service::respond;

/// Handles any method on any path as an operation call.
///
/// The path is percent-decoded before it reaches the dispatcher, so `/a%20b`
/// addresses the operation `a b`. The request line is logged on entry;
/// everything after that, including error logging, happens in the dispatcher
/// and the translator.
pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let started = Instant::now();
    let path = percent_decode_str(uri.path()).decode_utf8_lossy();
    info!("HTTP {method} {path}");

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let outcome = state.dispatcher.dispatch(&path, request_id, body).await;

    respond(&method, &path, outcome, started)
}
