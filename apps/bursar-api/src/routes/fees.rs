//! Fee definitions, keyed by class and fee type.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use bursar_core::validation;
use bursar_core::Fee;

use crate::error::{ApiError, ApiResult};
use crate::routes::MessageResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_fees)
                .post(create_fee)
                .put(update_fee)
                .delete(delete_fee),
        )
        .route("/details", get(fee_details))
        .route("/types", get(fee_types))
        .route("/resolve", get(resolve_fee))
}

/// Class and fee type, from a query string or a body.
#[derive(Debug, Default, Deserialize)]
pub struct FeeKey {
    pub class_description: Option<String>,
    pub fee_type: Option<String>,
}

impl FeeKey {
    fn validated(&self) -> ApiResult<(String, String)> {
        Ok((
            validation::required_text("class_description", self.class_description.as_deref())?,
            validation::required_text("fee_type", self.fee_type.as_deref())?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeeRequest {
    pub class_description: Option<String>,
    pub fee_type: Option<String>,
    pub total_amount_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeeCreated {
    message: &'static str,
    fee_id: i64,
}

#[derive(Debug, Serialize)]
struct ResolvedFee {
    fee_id: i64,
}

async fn list_fees(State(state): State<AppState>) -> ApiResult<Json<Vec<Fee>>> {
    Ok(Json(state.db.fees().list().await?))
}

async fn create_fee(
    State(state): State<AppState>,
    payload: Result<Json<FeeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FeeCreated>)> {
    let Json(request) = payload?;
    let fee = validation::new_fee(
        request.class_description.as_deref(),
        request.fee_type.as_deref(),
        request.total_amount_cents,
    )?;

    let fee_id = state.db.fees().insert(&fee).await?;

    Ok((
        StatusCode::CREATED,
        Json(FeeCreated {
            message: "Fee added successfully",
            fee_id,
        }),
    ))
}

async fn fee_details(
    State(state): State<AppState>,
    query: Result<Query<FeeKey>, QueryRejection>,
) -> ApiResult<Json<Fee>> {
    let Query(key) = query?;
    let (class, fee_type) = key.validated()?;

    state
        .db
        .fees()
        .find(&class, &fee_type)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Fee not found: {class} / {fee_type}")))
}

async fn update_fee(
    State(state): State<AppState>,
    payload: Result<Json<FeeRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = payload?;
    let fee = validation::new_fee(
        request.class_description.as_deref(),
        request.fee_type.as_deref(),
        request.total_amount_cents,
    )?;

    state
        .db
        .fees()
        .update_amount(&fee.class_description, &fee.fee_type, fee.total_amount)
        .await?;

    Ok(Json(MessageResponse::new("Fee updated successfully")))
}

async fn delete_fee(
    State(state): State<AppState>,
    payload: Result<Json<FeeKey>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(key) = payload?;
    let (class, fee_type) = key.validated()?;

    state.db.fees().delete(&class, &fee_type).await?;
    info!(class = %class, fee_type = %fee_type, "Fee removed");

    Ok(Json(MessageResponse::new("Fee deleted successfully")))
}

async fn fee_types(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db.fees().distinct_types().await?))
}

async fn resolve_fee(
    State(state): State<AppState>,
    query: Result<Query<FeeKey>, QueryRejection>,
) -> ApiResult<Json<ResolvedFee>> {
    let Query(key) = query?;
    let (class, fee_type) = key.validated()?;

    let fee_id = state
        .db
        .fees()
        .resolve_id(&class, &fee_type)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Fee not found: {class} / {fee_type}")))?;

    Ok(Json(ResolvedFee { fee_id }))
}
