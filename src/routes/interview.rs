use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::{CancelPayload, CompletePayload, ReschedulePayload, SchedulePayload},
    error::Result,
    middleware::auth::{Actor, Operation},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/interviews",
    request_body = SchedulePayload,
    responses(
        (status = 201, description = "Interview scheduled"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate or interviewer not found"),
        (status = 409, description = "Candidate not eligible or already has an open interview")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<SchedulePayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::Schedule)?;
    payload.validate()?;
    let interview = state
        .pipeline
        .schedule_interview(payload.into(), actor.id)
        .await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview found"),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::View)?;
    Ok(Json(state.pipeline.get_interview(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/reschedule",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = ReschedulePayload,
    responses(
        (status = 200, description = "Interview moved"),
        (status = 409, description = "Interview is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::Schedule)?;
    payload.validate()?;
    let interview = state
        .pipeline
        .reschedule_interview(id, payload.scheduled_at, payload.notes, actor.id)
        .await?;
    Ok(Json(interview))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = CancelPayload,
    responses(
        (status = 200, description = "Interview cancelled"),
        (status = 409, description = "Interview is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::Schedule)?;
    payload.validate()?;
    let interview = state
        .pipeline
        .cancel_interview(id, payload.reason, actor.id)
        .await?;
    Ok(Json(interview))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = CompletePayload,
    responses(
        (status = 200, description = "Outcome recorded"),
        (status = 400, description = "Unknown result or score out of range"),
        (status = 409, description = "Interview is not open")
    )
)]
#[axum::debug_handler]
pub async fn complete_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompletePayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::RecordResult)?;
    payload.validate()?;
    let interview = state
        .pipeline
        .complete_interview(
            id,
            &payload.result,
            payload.feedback,
            payload.score,
            actor.id,
        )
        .await?;
    Ok(Json(interview))
}
