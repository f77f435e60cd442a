use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::{SESSION_COOKIE, SESSION_TTL_HOURS};
use crate::models::AppState;
use crate::session::SessionContext;
use crate::templates::BaseTemplate;
use crate::wizard::ResourceState;

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .build()
}

/// Resolve the caller's session, creating one scoped to the default project
/// when the cookie is missing or stale. The returned jar carries the cookie.
pub fn ensure_session(state: &AppState, jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = session_id_from_jar(&jar) {
        if state.sessions.contains(&id) {
            return (jar, id);
        }
    }
    let id = state.sessions.create(&state.default_project_id);
    let jar = jar.add(session_cookie(id.clone()));
    (jar, id)
}

#[derive(Default)]
pub struct TemplateGlobals {
    pub project_id: String,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
}

/// Layout values for a page; drains the session's flash messages.
pub fn build_template_globals(state: &AppState, ctx: &mut SessionContext) -> TemplateGlobals {
    let flash_messages = ctx.take_flash();
    let has_flash_messages = !flash_messages.is_empty();
    TemplateGlobals {
        project_id: ctx.scope.project_id.clone(),
        api_hostname: crate::utils::hostname_from_url(&state.api_base_url),
        base_url: state.public_base_url.clone(),
        flash_messages,
        has_flash_messages,
    }
}

pub fn inject_context<T: BaseTemplate>(page: &T, html: String) -> Response {
    // Expose a small context object for page scripts.
    let context = serde_json::json!({
        "projectId": page.project_id(),
        "baseUrl": page.base_url(),
    });
    let inject = format!(r#"<script>window.__APP_CONTEXT__ = {};</script></body>"#, context);
    Html(html.replace("</body>", &inject)).into_response()
}

pub fn render_template<T: askama::Template + BaseTemplate>(page: T) -> Response {
    match page.render() {
        Ok(body) => inject_context(&page, body),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub fn absolute_url_from_state(state: &AppState, path: &str) -> String {
    crate::utils::absolute_url(&state.public_base_url, path)
}

pub fn redirect_to(state: &AppState, path: &str) -> Redirect {
    Redirect::to(&absolute_url_from_state(state, path))
}

/// Fetch the resource catalog for the session if it has never been loaded.
/// The fetch runs without holding the session lock.
pub async fn ensure_resources(state: &AppState, session_id: &str) {
    let scope = state.sessions.with(session_id, |ctx| {
        matches!(ctx.wizard.resources(), ResourceState::NotLoaded).then(|| ctx.scope.clone())
    });
    if let Some(Some(scope)) = scope {
        reload_resources(state, session_id, scope).await;
    }
}

pub async fn reload_resources(state: &AppState, session_id: &str, scope: crate::models::ProjectScope) {
    let result = state.provider.list_resources(&scope).await;
    state.sessions.with(session_id, |ctx| {
        // A project switch while the fetch was in flight makes the result stale.
        if ctx.scope == scope {
            ctx.wizard.apply_resources(result);
        }
    });
}
