use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        candidate_dto::{
            CandidateListQuery, CandidateListResponse, EvaluatePayload, SelectionPayload,
            StatusPayload,
        },
        interview_dto::InterviewListResponse,
    },
    error::Result,
    middleware::auth::{Actor, Operation},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/candidates",
    params(
        ("job_id" = String, Query, description = "Public job ID")
    ),
    responses(
        (status = 200, description = "Candidates for the job", body = Json<CandidateListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::View)?;
    let items = state.pipeline.list_by_job(&query.job_id).await?;
    Ok(Json(CandidateListResponse::from(items)))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate found"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::View)?;
    Ok(Json(state.pipeline.get_candidate(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/evaluation",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = EvaluatePayload,
    responses(
        (status = 200, description = "Evaluation recorded"),
        (status = 400, description = "Score out of range"),
        (status = 409, description = "Candidate has no submitted task")
    )
)]
#[axum::debug_handler]
pub async fn evaluate_candidate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EvaluatePayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::Evaluate)?;
    payload.validate()?;
    let candidate = state
        .pipeline
        .evaluate(id, payload.score, payload.comments, actor.id)
        .await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    put,
    path = "/api/candidates/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = StatusPayload,
    responses(
        (status = 200, description = "Status overridden"),
        (status = 400, description = "Unknown status")
    )
)]
#[axum::debug_handler]
pub async fn set_candidate_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::SetStatus)?;
    payload.validate()?;
    let candidate = state
        .pipeline
        .set_status(id, &payload.status, actor.id)
        .await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/selection",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = SelectionPayload,
    responses(
        (status = 200, description = "Final decision recorded"),
        (status = 409, description = "Candidate already decided")
    )
)]
#[axum::debug_handler]
pub async fn finalize_selection(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectionPayload>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::Finalize)?;
    payload.validate()?;
    let candidate = state
        .pipeline
        .finalize_selection(id, payload.selected, payload.offer_letter, actor.id)
        .await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 204, description = "Candidate deleted"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::Delete)?;
    state.pipeline.delete_candidate(id, actor.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}/interviews",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Interview history", body = Json<InterviewListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_candidate_interviews(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    actor.authorize(Operation::View)?;
    let items = state.pipeline.list_interviews(id).await?;
    Ok(Json(InterviewListResponse::from(items)))
}
