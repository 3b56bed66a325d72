//! Student enrolment.
//!
//! Request bodies use the snake_case column names; every field arrives as
//! optional and is checked by `bursar_core::validation` before the store
//! is touched.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use bursar_core::validation::{self, StudentFields};
use bursar_core::Student;
use bursar_db::StudentFilter;

use crate::error::{ApiError, ApiResult};
use crate::routes::MessageResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/student-details", get(student_details))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentQuery {
    pub name: Option<String>,
    pub class_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentRequest {
    pub name: Option<String>,
    pub class_description: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub village: Option<String>,
    pub contact_info: Option<String>,
    pub email: Option<String>,
}

impl StudentRequest {
    fn fields(&self) -> StudentFields<'_> {
        StudentFields {
            name: self.name.as_deref(),
            class_description: self.class_description.as_deref(),
            father_name: self.father_name.as_deref(),
            mother_name: self.mother_name.as_deref(),
            village: self.village.as_deref(),
            contact_info: self.contact_info.as_deref(),
            email: self.email.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentCreated {
    message: &'static str,
    student_id: i64,
}

async fn list_students(
    State(state): State<AppState>,
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Student>>> {
    let Query(query) = query?;
    let filter = StudentFilter {
        class_description: query.class_description,
    };

    Ok(Json(state.db.students().list(&filter).await?))
}

/// `GET /students/student-details?name=&class_description=`
async fn student_details(
    State(state): State<AppState>,
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> ApiResult<Json<Student>> {
    let Query(query) = query?;

    let name = validation::required_text("name", query.name.as_deref())?;
    let class = validation::required_text("class_description", query.class_description.as_deref())?;

    state
        .db
        .students()
        .find_by_name_and_class(&name, &class)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Student not found: {name} in {class}")))
}

async fn get_student(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Student>> {
    let Path(student_id) = path?;

    state
        .db
        .students()
        .get_by_id(student_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Student not found: {student_id}")))
}

async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StudentCreated>)> {
    let Json(request) = payload?;
    let student = validation::new_student(request.fields())?;

    let student_id = state.db.students().insert(&student).await?;
    info!(student_id, "Student enrolled");

    Ok((
        StatusCode::CREATED,
        Json(StudentCreated {
            message: "Student added successfully",
            student_id,
        }),
    ))
}

async fn update_student(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(student_id) = path?;
    let Json(request) = payload?;
    let student = validation::new_student(request.fields())?;

    state.db.students().update(student_id, &student).await?;

    Ok(Json(MessageResponse::new("Student updated successfully")))
}

async fn delete_student(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(student_id) = path?;

    state.db.students().delete(student_id).await?;

    Ok(Json(MessageResponse::new("Student deleted successfully")))
}
