//! HTTP response building module
//!
//! Turns handler outcomes into hyper responses. Building a response can only
//! fail on invalid header values; those are logged and replaced by a bare
//! fallback response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, EXPIRES};
use hyper::{Response, StatusCode};
use tracing::error;

use crate::handler::ResponseOutcome;

/// Build the response for a served asset
///
/// HEAD requests keep every header, including `Content-Length`, but drop the
/// body.
pub fn build_asset_response(
    outcome: ResponseOutcome,
    body: Vec<u8>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match outcome {
        ResponseOutcome::NotModified { expires } => build_304_response(&expires),
        ResponseOutcome::Content {
            content_type,
            headers,
            bytes_sent,
        } => {
            let mut builder = Response::builder().status(StatusCode::OK);
            if let Some(content_type) = content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            for (name, value) in headers {
                builder = builder.header(name, value);
            }
            let body = if is_head { Bytes::new() } else { Bytes::from(body) };

            builder
                .header(CONTENT_LENGTH, bytes_sent)
                .body(Full::new(body))
                .unwrap_or_else(|e| {
                    log_build_error("200", &e);
                    Response::new(Full::new(Bytes::new()))
                })
        }
    }
}

/// Build 304 Not Modified response
pub fn build_304_response(expires: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(EXPIRES, expires)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(text)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    error!(status, error = %error, "failed to build response");
}
