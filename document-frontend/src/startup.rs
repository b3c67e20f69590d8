use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    app::health_check,
    assistant::{ask, search},
    documents::{
        clear_summary, delete_document, list_documents, processing_status, refresh_documents,
        stored_summary, summarize_document, upload_documents,
    },
    metrics::metrics,
    notifications::{dismiss_notification, list_notifications},
};
use crate::AppState;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Allow bodies somewhat above the file limit so oversized files reach
    // validation and get a proper message instead of a bare 413.
    let max_file = usize::try_from(state.workspace.validator().max_bytes()).unwrap_or(usize::MAX);
    let body_limit = max_file
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/documents", get(list_documents).post(upload_documents))
        .route("/api/documents/refresh", post(refresh_documents))
        .route("/api/documents/processing", get(processing_status))
        .route("/api/documents/:id", delete(delete_document))
        .route(
            "/api/documents/:id/summary",
            get(stored_summary)
                .post(summarize_document)
                .delete(clear_summary),
        )
        .route("/api/search", post(search))
        .route("/api/ask", post(ask))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/:id", delete(dismiss_notification))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
