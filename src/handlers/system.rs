use axum::{extract::State, response::IntoResponse};

use crate::handlers::helpers::redirect_to;
use crate::models::AppState;

pub async fn root_get(State(state): State<AppState>) -> impl IntoResponse {
    redirect_to(&state, "/create")
}

pub async fn health_get() -> impl IntoResponse {
    "ok"
}
