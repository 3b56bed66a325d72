//! HTTP routes.
//!
//! ```text
//! /                       liveness text
//! /health                 store + migration status
//! /classes                class catalogue
//! /students               enrolment
//! /fees                   fee definitions
//! /payments               payments, balances, paired receipt PDFs
//! /receipts               single receipt PDFs
//! /dashboard              collections and pending amounts
//! /notifications          pending-fee reminders
//! ```

pub mod classes;
pub mod dashboard;
pub mod fees;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod receipts;
pub mod students;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::AppState;

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Builds the application router with all middleware attached.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .nest("/classes", classes::router())
        .nest("/students", students::router())
        .nest("/fees", fees::router())
        .nest("/payments", payments::router())
        .nest("/receipts", receipts::router())
        .nest("/dashboard", dashboard::router())
        .nest("/notifications", notifications::router())
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn root() -> &'static str {
    "Fee Management Backend is Running!"
}

/// Wraps rendered PDF bytes in an inline download response.
pub(crate) fn pdf_response(filename: &str, bytes: Vec<u8>) -> Response {
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}
