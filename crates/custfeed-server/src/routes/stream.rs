//! Live customer update stream endpoint (Server-Sent Events).

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::StreamExt;

use crate::error::AppError;
use crate::AppState;

/// Stream routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/customers/stream", get(stream_customers))
}

/// Hold the connection open and push one SSE frame per customer change.
///
/// The response body never completes; the registration is torn down when
/// the client disconnects and the body stream is dropped.
async fn stream_customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let client = state.hub.register()?;
    tracing::debug!(client_id = client.id(), "stream client connected");

    let stream = client.map(|event| Event::default().json_data(&event));

    Ok((
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (header::CONNECTION, HeaderValue::from_static("keep-alive")),
        ],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    ))
}
