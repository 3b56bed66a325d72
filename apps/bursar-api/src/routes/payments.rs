//! Payments, balances and paired receipts.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bursar_core::validation::{self, PaymentFields};
use bursar_core::{AnnualBalance, MonthlyBreakdown, PaymentRecord, ReceiptNumber, StudentPayment};

use crate::error::{ApiError, ApiResult};
use crate::routes::pdf_response;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/today", get(todays_payments))
        .route("/student-payments/{id}", get(student_payments))
        .route("/annual-balance/{id}", get(annual_balance))
        .route("/monthly-breakdown/{id}", get(monthly_breakdown))
        .route("/receipt/{receipt_number}", get(paired_receipt))
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequest {
    pub fee_id: Option<i64>,
    pub student_id: Option<i64>,
    pub payment_date: Option<String>,
    pub payment_mode: Option<String>,
    pub amount_paid_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRecorded {
    message: &'static str,
    payment_id: i64,
    receipt_number: ReceiptNumber,
}

async fn list_payments(State(state): State<AppState>) -> ApiResult<Json<Vec<PaymentRecord>>> {
    Ok(Json(state.db.payments().list_all().await?))
}

/// Payments dated today in the server's local time zone.
async fn todays_payments(State(state): State<AppState>) -> ApiResult<Json<Vec<PaymentRecord>>> {
    let today = Local::now().date_naive();
    Ok(Json(state.db.payments().list_for_date(today).await?))
}

async fn record_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PaymentRecorded>)> {
    let Json(request) = payload?;
    let payment = validation::new_payment(PaymentFields {
        fee_id: request.fee_id,
        student_id: request.student_id,
        payment_date: request.payment_date.as_deref(),
        payment_mode: request.payment_mode.as_deref(),
        amount_paid_cents: request.amount_paid_cents,
    })?;

    let created = state.db.payments().create(&payment).await?;
    info!(
        payment_id = created.payment_id,
        receipt = %created.receipt_number,
        "Payment recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(PaymentRecorded {
            message: "Payment recorded successfully",
            payment_id: created.payment_id,
            receipt_number: created.receipt_number,
        }),
    ))
}

/// Every payment of one student with its fee category. 404 when there are none.
async fn student_payments(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<StudentPayment>>> {
    let Path(student_id) = path?;

    let payments = state.db.payments().list_for_student(student_id).await?;
    if payments.is_empty() {
        return Err(ApiError::not_found(format!(
            "No payments found for student {student_id}"
        )));
    }

    Ok(Json(payments))
}

async fn annual_balance(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<AnnualBalance>> {
    let Path(student_id) = path?;
    Ok(Json(state.db.ledger().annual_balance(student_id).await?))
}

async fn monthly_breakdown(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MonthlyBreakdown>> {
    let Path(student_id) = path?;

    let breakdown = state
        .db
        .ledger()
        .monthly_breakdown(student_id, state.config.monthly_overflow)
        .await?;

    Ok(Json(breakdown))
}

/// Office and student copies side by side.
async fn paired_receipt(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(raw) = path?;
    let receipt_number = ReceiptNumber::parse(&raw)?;

    let receipt = state
        .db
        .payments()
        .receipt_by_number(&receipt_number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Receipt not found: {receipt_number}")))?;

    debug!(receipt = %receipt_number, "Rendering paired receipt");
    let bytes = state.receipts.render_pair(&receipt)?;

    Ok(pdf_response(&format!("receipt_{receipt_number}.pdf"), bytes))
}
