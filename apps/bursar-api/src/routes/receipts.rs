//! Single-copy receipts by payment id.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::routes::pdf_response;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{payment_id}", get(receipt_for_payment))
}

async fn receipt_for_payment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(payment_id) = path?;

    let receipt = state
        .db
        .payments()
        .receipt_by_payment_id(payment_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Payment not found: {payment_id}")))?;

    debug!(payment_id, receipt = %receipt.receipt_number, "Rendering receipt");
    let bytes = state.receipts.render_single(&receipt)?;

    Ok(pdf_response(
        &format!("receipt_{}.pdf", receipt.receipt_number),
        bytes,
    ))
}
