use crate::{AppState, error::AppError, response::ApiResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
};
use axum_extra::extract::WithRejection;
use core_types::{Student, StudentPayload, UpdateMode};
use serde::Deserialize;
use std::sync::Arc;

/// A JSON body whose decoding failures are reported through `AppError`.
type JsonBody<T> = WithRejection<Json<T>, AppError>;
/// A path segment whose decoding failures are reported through `AppError`.
type PathParam<T> = WithRejection<Path<T>, AppError>;

type StudentResult = Result<ApiResponse<Student>, AppError>;
type StudentListResult = Result<ApiResponse<Vec<Student>>, AppError>;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// # POST /api/students
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): JsonBody<StudentPayload>,
) -> Result<(StatusCode, ApiResponse<Student>), AppError> {
    let student = state.service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Student added successfully.", student),
    ))
}

/// # GET /api/students
pub async fn list_students(State(state): State<Arc<AppState>>) -> StudentListResult {
    let students = state.service.list_all().await?;
    Ok(ApiResponse::ok("Students retrieved successfully.", students))
}

/// # GET /api/students/sid/:student_id
pub async fn get_student_by_sid(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): PathParam<String>,
) -> StudentResult {
    let student = state.service.get_by_student_id(&student_id).await?;
    Ok(ApiResponse::ok(
        "Student retrieved successfully by Student ID.",
        student,
    ))
}

/// # GET /api/students/course/:course_name
pub async fn get_students_by_course(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(course_name), _): PathParam<String>,
) -> StudentListResult {
    let students = state.service.get_by_course(&course_name).await?;
    let message = format!("Found {} students enrolled.", students.len());
    Ok(ApiResponse::ok(message, students))
}

/// # GET /api/students/level/:year_level
pub async fn get_students_by_year_level(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(year_level), _): PathParam<String>,
) -> StudentListResult {
    let students = state.service.get_by_year_level(&year_level).await?;
    let message = format!("Found {} students in Year {}.", students.len(), year_level);
    Ok(ApiResponse::ok(message, students))
}

/// # GET /api/students/section/:section_name
pub async fn get_students_by_section(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(section_name), _): PathParam<String>,
) -> StudentListResult {
    let students = state.service.get_by_section(&section_name).await?;
    let message = format!(
        "Found {} students in section {}.",
        students.len(),
        section_name
    );
    Ok(ApiResponse::ok(message, students))
}

/// # GET /api/students/search?q=
pub async fn search_students(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> StudentListResult {
    let students = state.service.search(params.q.as_deref()).await?;
    let message = format!("Found {} matching students.", students.len());
    Ok(ApiResponse::ok(message, students))
}

/// # PUT /api/students/:id
/// Replaces every mutable field of the record.
pub async fn replace_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): PathParam<String>,
    WithRejection(Json(payload), _): JsonBody<StudentPayload>,
) -> StudentResult {
    update(&state, &id, payload, UpdateMode::Replace).await
}

/// # PATCH /api/students/:id
/// Writes only the fields present in the body.
pub async fn patch_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): PathParam<String>,
    WithRejection(Json(payload), _): JsonBody<StudentPayload>,
) -> StudentResult {
    update(&state, &id, payload, UpdateMode::Merge).await
}

async fn update(state: &AppState, id: &str, payload: StudentPayload, mode: UpdateMode) -> StudentResult {
    let student = state.service.update_by_id(id, payload, mode).await?;
    Ok(ApiResponse::ok(
        "Student information updated successfully.",
        student,
    ))
}

/// # DELETE /api/students/:id
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): PathParam<String>,
) -> StudentResult {
    let student = state.service.delete_by_id(&id).await?;
    Ok(ApiResponse::ok(
        "Student successfully removed by internal ID.",
        student,
    ))
}

/// # DELETE /api/students/sid/:student_id
pub async fn delete_student_by_sid(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): PathParam<String>,
) -> StudentResult {
    let student = state.service.delete_by_student_id(&student_id).await?;
    let message = format!("Student with ID {student_id} successfully removed.");
    Ok(ApiResponse::ok(message, student))
}

/// Fallback for any path outside the route table.
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

/// Answers a known path requested with a method it does not serve.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
