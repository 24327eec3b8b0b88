//! Canned responses used by the router and the server.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Plain-text `404`, the default for unmatched requests.
pub fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, "404 page not found\n")
}

/// Plain-text `500`, used by the default recovery hook.
pub fn internal_error() -> Response {
    text(StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n")
}

fn text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
