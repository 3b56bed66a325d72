//! Pending-fee reminders.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::reminders::{self, ReminderReport};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/send-reminders", post(send_reminders))
}

/// `POST /notifications/send-reminders`
///
/// 200 when every reminder went out, 207 when some failed.
async fn send_reminders(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<ReminderReport>)> {
    let targets = state.db.dashboard().reminder_targets().await?;

    let report = reminders::dispatch(
        state.mailer.as_ref(),
        targets,
        &state.config.school_name,
        state.config.reminder_concurrency,
    )
    .await;

    let status = if report.all_sent() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok((status, Json(report)))
}
