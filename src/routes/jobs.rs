use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::job_dto::{CreateExperiencePayload, CreateJobPayload},
    error::Result,
    middleware::auth::{Actor, Operation},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created"),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Role may not manage jobs")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::ManageJobs)?;
    payload.validate()?;
    let job = state.job_service.create_job(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "Active jobs")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::View)?;
    Ok(Json(state.job_service.list_active_jobs().await?))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{job_id}",
    params(
        ("job_id" = String, Path, description = "Public job ID")
    ),
    responses(
        (status = 200, description = "Job found"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::View)?;
    Ok(Json(state.job_service.get_job(&job_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/experiences",
    request_body = CreateExperiencePayload,
    responses(
        (status = 201, description = "Experience tag created"),
        (status = 409, description = "Tag already exists")
    )
)]
#[axum::debug_handler]
pub async fn create_experience(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateExperiencePayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::ManageJobs)?;
    payload.validate()?;
    let experience = state.job_service.create_experience(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(experience)))
}
