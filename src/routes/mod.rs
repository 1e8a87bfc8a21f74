pub mod candidate_routes;
pub mod health;
pub mod interview;
pub mod jobs;
pub mod public;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    auth::require_staff,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub api_rps: u32,
    pub public_rps: u32,
}

pub fn build_router(state: AppState, limits: RateLimits) -> Router {
    let public_api = Router::new()
        .route("/api/public/jobs", get(public::list_jobs))
        .route("/api/public/experiences", get(public::list_experiences))
        .route("/api/public/jobs/:job_id/apply", post(public::apply))
        .route(
            "/api/public/applications/:application_id",
            get(public::application_status),
        )
        .route(
            "/api/public/applications/:application_id/task",
            post(public::submit_task),
        )
        .route_layer(from_fn_with_state(
            RateLimiter::new(limits.public_rps),
            rps_middleware,
        ));

    let staff_api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/jobs/:job_id", get(jobs::get_job))
        .route("/api/experiences", post(jobs::create_experience))
        .route("/api/candidates", get(candidate_routes::list_candidates))
        .route(
            "/api/candidates/:id",
            get(candidate_routes::get_candidate).delete(candidate_routes::delete_candidate),
        )
        .route(
            "/api/candidates/:id/evaluation",
            post(candidate_routes::evaluate_candidate),
        )
        .route(
            "/api/candidates/:id/status",
            put(candidate_routes::set_candidate_status),
        )
        .route(
            "/api/candidates/:id/selection",
            post(candidate_routes::finalize_selection),
        )
        .route(
            "/api/candidates/:id/interviews",
            get(candidate_routes::list_candidate_interviews),
        )
        .route("/api/interviews", post(interview::schedule_interview))
        .route("/api/interviews/:id", get(interview::get_interview))
        .route(
            "/api/interviews/:id/reschedule",
            post(interview::reschedule_interview),
        )
        .route("/api/interviews/:id/cancel", post(interview::cancel_interview))
        .route(
            "/api/interviews/:id/complete",
            post(interview::complete_interview),
        )
        .route_layer(from_fn_with_state(state.clone(), require_staff))
        .route_layer(from_fn_with_state(
            RateLimiter::new(limits.api_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(staff_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}
