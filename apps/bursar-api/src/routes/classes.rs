//! Class catalogue.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use bursar_core::Class;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes))
        .route("/{id}", get(get_class))
}

async fn list_classes(State(state): State<AppState>) -> ApiResult<Json<Vec<Class>>> {
    Ok(Json(state.db.classes().list().await?))
}

async fn get_class(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Class>> {
    let Path(class_id) = path?;

    state
        .db
        .classes()
        .get_by_id(class_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Class not found: {class_id}")))
}
