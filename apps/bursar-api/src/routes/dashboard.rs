//! School-wide totals.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use bursar_core::{ClassBreakdown, PendingFee};

use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/total-collections", get(total_collections))
        .route("/pending-fees", get(pending_fees))
        .route("/class-wise-breakdown", get(class_breakdown))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalCollections {
    /// Cents.
    total_collections: i64,
}

async fn total_collections(State(state): State<AppState>) -> ApiResult<Json<TotalCollections>> {
    let total = state.db.dashboard().total_collections().await?;
    Ok(Json(TotalCollections {
        total_collections: total.cents(),
    }))
}

async fn pending_fees(State(state): State<AppState>) -> ApiResult<Json<Vec<PendingFee>>> {
    Ok(Json(state.db.dashboard().pending_fees().await?))
}

async fn class_breakdown(State(state): State<AppState>) -> ApiResult<Json<Vec<ClassBreakdown>>> {
    Ok(Json(state.db.dashboard().class_breakdown().await?))
}
