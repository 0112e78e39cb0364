pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile
        .route(
            "/api/v1/profile",
            get(handlers::handle_get_profile).put(handlers::handle_save_profile),
        )
        // Application history
        .route(
            "/api/v1/applications",
            get(handlers::handle_list_applications),
        )
        .route(
            "/api/v1/applications/stats",
            get(handlers::handle_application_stats),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(handlers::handle_update_status),
        )
        // Generation
        .route("/api/v1/resumes", post(handlers::handle_generate_resume))
        .route(
            "/api/v1/cover-letters",
            post(handlers::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/interview-questions",
            post(handlers::handle_interview_questions),
        )
        // Downloads
        .route(
            "/api/v1/documents/:file_name",
            get(handlers::handle_download),
        )
        .with_state(state)
}
