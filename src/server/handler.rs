use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, Instrument};

use super::pages;
use crate::device::ClientHints;
use crate::observability::relay_metrics;
use crate::telemetry::{create_request_span, generate_correlation_id};
use crate::trigger::TriggerService;

/// The one request handler. Every method and path lands here; the relay
/// behaves identically regardless of how it was called.
pub async fn handle(
    State(service): State<Arc<TriggerService>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let correlation_id = generate_correlation_id();
    let span = create_request_span(method.as_str(), uri.path(), &correlation_id);

    async move {
        relay_metrics().record_request();
        let hints = ClientHints::from_headers(&headers);

        match service.run(hints).await {
            Ok(outcome) => {
                info!(outcome = ?outcome, "Trigger request handled");
                html_response(StatusCode::OK, pages::SUCCESS_PAGE.to_string())
            }
            Err(error) => {
                relay_metrics().record_failure();
                error!(error = %error, "Error handling trigger request");
                html_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    pages::error_page(&error.to_string()),
                )
            }
        }
    }
    .instrument(span)
    .await
}

fn html_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/html;charset=UTF-8"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate",
            ),
            (header::PRAGMA, "no-cache"),
        ],
        body,
    )
        .into_response()
}
