use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::config::SESSION_COOKIE;
use crate::handlers::helpers::{ensure_session, redirect_to, session_id_from_jar};
use crate::models::AppState;

#[derive(Deserialize)]
pub struct ProjectForm {
    pub project_id: String,
}

/// Re-scope the session to another project. The wizard starts over and the
/// catalog is fetched again for the new project on the next page load.
pub async fn switch_project_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ProjectForm>,
) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    let project = form.project_id.trim();
    if project.is_empty() {
        state.sessions.with(&sid, |ctx| ctx.flash("Project id cannot be empty"));
    } else if state.sessions.switch_project(&sid, project) {
        state
            .sessions
            .with(&sid, |ctx| ctx.flash(format!("Switched to project {}", project)));
    }
    (jar, redirect_to(&state, "/create")).into_response()
}

pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(sid) = session_id_from_jar(&jar) {
        state.sessions.remove(&sid);
    }
    let cleared = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (cleared, redirect_to(&state, "/create")).into_response()
}
