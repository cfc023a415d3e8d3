//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform the upstream response for the client
//! - Strip hop-by-hop headers, add `Control-Allow-Origin: *`
//! - Map upstream failures to 502 Bad Gateway
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Only responses that came from upstream get the cross-origin header;
//!   locally generated errors do not

use axum::body::Body;
use axum::http::{HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;

use crate::http::headers::{strip_hop_by_hop, CONTROL_ALLOW_ORIGIN};

/// Rewrite an upstream response before it goes back to the client.
pub fn relay<B>(response: Response<B>) -> Response<Body>
where
    B: axum::body::HttpBody<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = response.into_parts();

    strip_hop_by_hop(&mut parts.headers);
    parts
        .headers
        .insert(CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    Response::from_parts(parts, Body::new(body))
}

/// The response sent when the upstream could not be reached.
pub fn bad_gateway() -> Response<Body> {
    StatusCode::BAD_GATEWAY.into_response()
}
