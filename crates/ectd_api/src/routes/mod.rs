use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health_check, sequence};
use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ind/last-sequence", get(sequence::last_sequence))
        .route("/ind/sequence/create", post(sequence::create_sequence))
        .route("/ind/sequence/validate", post(sequence::validate_plan))
        .route("/ind/sequence/:sequence/audit", get(sequence::audit_trail))
        .with_state(state)
}
