use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

// Embedded so the binary works without a static/ directory next to it.
const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

pub fn build_router(state: AppState) -> Router {
    let wizard_routes = Router::new()
        .route("/create", get(handlers::wizard::create_get))
        .route("/create/step", post(handlers::wizard::create_step_post))
        .route("/create/go/:step", get(handlers::wizard::create_go))
        .route("/create/resources/retry", post(handlers::wizard::create_retry_resources))
        .route("/create/review/back", post(handlers::wizard::create_review_back))
        .route("/create/confirm", post(handlers::wizard::create_confirm))
        .route("/create/cancel", post(handlers::wizard::create_cancel));

    Router::new()
        .route("/", get(handlers::system::root_get))
        .route("/healthz", get(handlers::system::health_get))
        .route("/session/project", post(handlers::session::switch_project_post))
        .route("/session/logout", post(handlers::session::logout_post))
        .route(
            "/static/styles.css",
            get(|| async { ([(CONTENT_TYPE, "text/css")], DEFAULT_STYLESHEET) }),
        )
        .merge(wizard_routes)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=3600"),
                ))
                .service(ServeDir::new("static")),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
