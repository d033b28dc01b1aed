//! HTTP query surface of a fragment site
//!
//! The four endpoints and their response shapes are the contract the
//! coordinator's router depends on.

use crate::common::model::{EnrollmentCount, EnrollmentDetail, Faculty, Student};
use crate::common::tracing_middleware::request_tracing_middleware;
use crate::site::store::FragmentStore;
use crate::{Error, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct SiteState {
    pub store: Arc<FragmentStore>,
    pub site_name: String,
}

#[derive(Debug, Deserialize)]
struct CourseParams {
    #[serde(rename = "courseId")]
    course_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacultyParams {
    #[serde(rename = "facultyId")]
    faculty_id: Option<String>,
}

pub fn create_router(state: SiteState) -> Router {
    Router::new()
        .route("/course_enrollments", get(course_enrollments))
        .route("/course_enrollment_details", get(course_enrollment_details))
        .route("/cs_faculty", get(cs_faculty))
        .route("/faculty_students", get(faculty_students))
        .route("/health/live", get(health_live))
        .fallback(not_found)
        .layer(middleware::from_fn(request_tracing_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_id(value: Option<String>, name: &'static str) -> Result<i64> {
    let raw = value.ok_or(Error::MissingParameter(name))?;
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidParameter { name, value: raw })
}

async fn course_enrollments(
    State(state): State<SiteState>,
    Query(params): Query<CourseParams>,
) -> Result<Json<EnrollmentCount>> {
    let course_id = parse_id(params.course_id, "courseId")?;
    Ok(Json(state.store.course_enrollments(course_id)))
}

async fn course_enrollment_details(
    State(state): State<SiteState>,
    Query(params): Query<CourseParams>,
) -> Result<Json<Vec<EnrollmentDetail>>> {
    let course_id = parse_id(params.course_id, "courseId")?;
    Ok(Json(state.store.course_enrollment_details(course_id)))
}

async fn cs_faculty(State(state): State<SiteState>) -> Json<Vec<Faculty>> {
    Json(state.store.cs_faculty())
}

async fn faculty_students(
    State(state): State<SiteState>,
    Query(params): Query<FacultyParams>,
) -> Result<Json<Vec<Student>>> {
    let faculty_id = parse_id(params.faculty_id, "facultyId")?;
    Ok(Json(state.store.faculty_students(faculty_id)))
}

async fn health_live(State(state): State<SiteState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "role": "site",
            "site": state.site_name,
            "partition": state.store.partition(),
            "students": state.store.student_count(),
            "faculty": state.store.faculty_count(),
            "courses": state.store.course_count(),
            "enrollments": state.store.enrollment_count(),
            "timestamp": chrono::Utc::now().timestamp(),
        })),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some(" 10 ".into()), "courseId").unwrap(), 10);
        assert!(matches!(
            parse_id(None, "courseId"),
            Err(Error::MissingParameter("courseId"))
        ));
        assert!(matches!(
            parse_id(Some("ten".into()), "courseId"),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
