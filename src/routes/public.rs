use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        candidate_dto::{ApplicationStatusResponse, ApplyPayload, ApplyResponse, SubmitTaskPayload},
        job_dto::{PublicJobListResponse, PublicJobSummary},
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/public/jobs",
    responses(
        (status = 200, description = "Open job postings", body = Json<PublicJobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state
        .job_service
        .list_active_jobs()
        .await?
        .into_iter()
        .map(PublicJobSummary::from)
        .collect();
    Ok(Json(PublicJobListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/api/public/experiences",
    responses(
        (status = 200, description = "Core experience tags applicants can pick")
    )
)]
#[axum::debug_handler]
pub async fn list_experiences(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.job_service.list_experiences().await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/public/jobs/{job_id}/apply",
    params(
        ("job_id" = String, Path, description = "Public job ID")
    ),
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application received", body = Json<ApplyResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found or closed"),
        (status = 409, description = "Already applied to this job")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (applicant, cv_ref) = payload.into_parts();
    let candidate = state
        .pipeline
        .intake(&job_id, applicant, Some(cv_ref))
        .await?;
    Ok((StatusCode::CREATED, Json(ApplyResponse::from(candidate))))
}

#[utoipa::path(
    post,
    path = "/api/public/applications/{application_id}/task",
    params(
        ("application_id" = String, Path, description = "Application ID")
    ),
    request_body = SubmitTaskPayload,
    responses(
        (status = 200, description = "Task submitted", body = Json<ApplicationStatusResponse>),
        (status = 400, description = "Invalid links"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Task submission is closed")
    )
)]
#[axum::debug_handler]
pub async fn submit_task(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Json(payload): Json<SubmitTaskPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state
        .pipeline
        .submit_task(&application_id, payload.links)
        .await?;
    Ok(Json(ApplicationStatusResponse::from(candidate)))
}

#[utoipa::path(
    get,
    path = "/api/public/applications/{application_id}",
    params(
        ("application_id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application status", body = Json<ApplicationStatusResponse>),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn application_status(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<impl IntoResponse> {
    let candidate = state.pipeline.get_by_application_id(&application_id).await?;
    Ok(Json(ApplicationStatusResponse::from(candidate)))
}
