use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::handlers::helpers::{
    absolute_url_from_state, build_template_globals, ensure_resources, ensure_session,
    redirect_to, reload_resources, render_template, TemplateGlobals,
};
use crate::models::{AppState, CreateServerRequest, ProjectScope, ResourceCatalog};
use crate::session::SessionContext;
use crate::templates::*;
use crate::wizard::{
    DetailsForm, FlavorForm, ImageForm, NetworkForm, ResourceState, Step, StepData,
    WizardController, WizardError,
};

/// Body of the step form post. Only the fields of the posted step are present.
#[derive(Deserialize, Debug, Default)]
pub struct StepPost {
    pub step: Option<String>,
    pub action: Option<String>,
    pub flavor_id: Option<String>,
    pub image_id: Option<String>,
    pub network_id: Option<String>,
    pub key_name: Option<String>,
    pub security_group: Option<String>,
    pub name: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl StepPost {
    fn into_step_data(self, step: Step) -> Option<StepData> {
        let v = |o: Option<String>| o.unwrap_or_default();
        match step {
            Step::Flavor => Some(StepData::Flavor(FlavorForm { flavor_id: v(self.flavor_id) })),
            Step::Image => Some(StepData::Image(ImageForm { image_id: v(self.image_id) })),
            Step::Network => Some(StepData::Network(NetworkForm {
                network_id: v(self.network_id),
                key_name: v(self.key_name),
                security_group: v(self.security_group),
            })),
            Step::Details => Some(StepData::Details(DetailsForm {
                name: v(self.name),
                admin_username: v(self.admin_username),
                admin_password: v(self.admin_password),
            })),
            Step::Summary => None,
        }
    }
}

/// The password input is rendered blank; an empty post keeps what is stored.
fn keep_stored_password(wizard: &WizardController, data: StepData) -> StepData {
    match data {
        StepData::Details(mut form) if form.admin_password.is_empty() => {
            if let Some(StepData::Details(stored)) = wizard.form(Step::Details).map(|f| f.values()) {
                form.admin_password = stored.admin_password.clone();
            }
            StepData::Details(form)
        }
        other => other,
    }
}

fn resource_error(ctx: &SessionContext) -> String {
    match ctx.wizard.resources() {
        ResourceState::Failed(msg) => msg.clone(),
        _ => String::new(),
    }
}

fn field_error(ctx: &SessionContext, step: Step, field: &str) -> String {
    ctx.wizard
        .form(step)
        .and_then(|f| f.error(field))
        .unwrap_or_default()
        .to_string()
}

/// Render whatever step the session's wizard is on.
fn render_current_step(state: &AppState, ctx: &mut SessionContext) -> Response {
    let TemplateGlobals {
        project_id,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(state, ctx);
    let steps = step_links(&ctx.wizard, &base_url);
    let submit_url = absolute_url_from_state(state, "/create/step");
    let retry_url = absolute_url_from_state(state, "/create/resources/retry");
    let empty = ResourceCatalog::default();
    let catalog = ctx.wizard.catalog().unwrap_or(&empty);
    let values = ctx.wizard.form(ctx.wizard.current_step()).map(|f| f.values().clone());

    match (ctx.wizard.current_step(), values) {
        (Step::Flavor, Some(StepData::Flavor(form))) => render_template(FlavorStepTemplate {
            project_id,
            api_hostname,
            base_url,
            flash_messages,
            has_flash_messages,
            steps,
            resource_error: resource_error(ctx),
            flavors: catalog
                .flavors
                .iter()
                .map(|f| SelectOption::new(f.id.clone(), f.describe(), &form.flavor_id))
                .collect(),
            flavor_error: field_error(ctx, Step::Flavor, "flavor_id"),
            submit_url,
            retry_url,
        }),
        (Step::Image, Some(StepData::Image(form))) => render_template(ImageStepTemplate {
            project_id,
            api_hostname,
            base_url,
            flash_messages,
            has_flash_messages,
            steps,
            resource_error: resource_error(ctx),
            images: catalog
                .images
                .iter()
                .map(|i| SelectOption::new(i.id.clone(), i.name.clone(), &form.image_id))
                .collect(),
            image_error: field_error(ctx, Step::Image, "image_id"),
            submit_url,
            retry_url,
        }),
        (Step::Network, Some(StepData::Network(form))) => render_template(NetworkStepTemplate {
            project_id,
            api_hostname,
            base_url,
            flash_messages,
            has_flash_messages,
            steps,
            resource_error: resource_error(ctx),
            networks: catalog
                .networks
                .iter()
                .map(|n| {
                    let label = if n.external { format!("{} (external)", n.name) } else { n.name.clone() };
                    SelectOption::new(n.id.clone(), label, &form.network_id)
                })
                .collect(),
            keypairs: catalog
                .keypairs
                .iter()
                .map(|k| SelectOption::new(k.name.clone(), k.name.clone(), &form.key_name))
                .collect(),
            security_groups: catalog
                .security_groups
                .iter()
                .map(|g| SelectOption::new(g.id.clone(), g.name.clone(), &form.security_group))
                .collect(),
            network_error: field_error(ctx, Step::Network, "network_id"),
            key_name_error: field_error(ctx, Step::Network, "key_name"),
            security_group_error: field_error(ctx, Step::Network, "security_group"),
            submit_url,
            retry_url,
        }),
        (Step::Details, Some(StepData::Details(form))) => render_template(DetailsStepTemplate {
            project_id,
            api_hostname,
            base_url,
            flash_messages,
            has_flash_messages,
            steps,
            name: form.name,
            admin_username: form.admin_username,
            has_password: !form.admin_password.is_empty(),
            name_error: field_error(ctx, Step::Details, "name"),
            admin_username_error: field_error(ctx, Step::Details, "admin_username"),
            admin_password_error: field_error(ctx, Step::Details, "admin_password"),
            submit_url,
        }),
        _ => {
            let confirm_url = absolute_url_from_state(state, "/create/confirm");
            let back_url = absolute_url_from_state(state, "/create/review/back");
            let cancel_url = absolute_url_from_state(state, "/create/cancel");
            // The summary is the only remaining step.
            let view = match ctx.wizard.review() {
                Some(review) => review.view(),
                None => return redirect_to(state, "/create").into_response(),
            };
            let has_errors = !view.errors.is_empty();
            let can_submit = !view.submitting && view.attempts_left > 0;
            render_template(SummaryStepTemplate {
                project_id,
                api_hostname,
                base_url,
                flash_messages,
                has_flash_messages,
                steps,
                rows: view.rows,
                errors: view.errors,
                has_errors,
                attempts_left: view.attempts_left,
                can_submit,
                confirm_url,
                back_url,
                cancel_url,
            })
        }
    }
}

pub async fn create_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    ensure_resources(&state, &sid).await;
    let page = state
        .sessions
        .with(&sid, |ctx| render_current_step(&state, ctx))
        .unwrap_or_else(|| redirect_to(&state, "/create").into_response());
    (jar, page).into_response()
}

/// Apply the posted values to the current step, then move forward or back.
pub async fn create_step_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(post): Form<StepPost>,
) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    state.sessions.with(&sid, |ctx| {
        let current = ctx.wizard.current_step();
        let posted = post.step.as_deref().and_then(Step::from_slug);
        if posted.is_some() && posted != Some(current) {
            ctx.flash("That page was out of date; showing your current step.");
            return;
        }
        let back = post.action.as_deref() == Some("back");
        if let Some(data) = post.into_step_data(current) {
            ctx.wizard.edit(keep_stored_password(&ctx.wizard, data));
        }
        if back {
            ctx.wizard.retreat();
            return;
        }
        match ctx.wizard.advance() {
            Ok(_) | Err(WizardError::Validation(_)) => {}
            Err(e) => ctx.flash(e.to_string()),
        }
    });
    (jar, redirect_to(&state, "/create")).into_response()
}

pub async fn create_go(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(step): Path<String>,
) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    state.sessions.with(&sid, |ctx| match Step::from_slug(&step) {
        Some(target) => {
            if let Err(e) = ctx.wizard.go_to(target) {
                ctx.flash(e.to_string());
            }
        }
        None => ctx.flash(format!("Unknown step '{}'", step)),
    });
    (jar, redirect_to(&state, "/create")).into_response()
}

pub async fn create_retry_resources(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    if let Some(scope) = state.sessions.with(&sid, |ctx| ctx.scope.clone()) {
        reload_resources(&state, &sid, scope).await;
    }
    (jar, redirect_to(&state, "/create")).into_response()
}

/// Review page "Back" button.
pub async fn create_review_back(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    state.sessions.with(&sid, |ctx| {
        if let Some(review) = ctx.wizard.review() {
            review.cancel();
        }
    });
    (jar, redirect_to(&state, "/create")).into_response()
}

/// Submit the reviewed request. The gateway call happens outside the
/// session lock; the wizard's in-flight flag rejects a concurrent confirm.
/// The call runs on its own task so the outcome is recorded even if the
/// browser goes away mid-request.
pub async fn create_confirm(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    let started = state
        .sessions
        .with(&sid, |ctx| match ctx.wizard.begin_submit() {
            Ok(request) => Some((ctx.scope.clone(), request)),
            Err(e) => {
                ctx.flash(e.to_string());
                None
            }
        })
        .flatten();
    if let Some((scope, request)) = started {
        let task = tokio::spawn(submit_and_record(state.clone(), sid, scope, request));
        if let Err(e) = task.await {
            tracing::error!(%e, "Submission task failed");
        }
    }
    (jar, redirect_to(&state, "/create")).into_response()
}

async fn submit_and_record(state: AppState, sid: String, scope: ProjectScope, request: CreateServerRequest) {
    tracing::info!(project = %scope.project_id, name = %request.name, "Submitting instance request");
    let outcome = state.gateway.create_server(&scope, &request).await;
    state.sessions.with(&sid, |ctx| {
        if ctx.scope != scope {
            return;
        }
        match ctx.wizard.finish_submit(outcome) {
            Ok(server) => {
                ctx.flash(format!(
                    "Instance {} ({}) created with status {}",
                    server.name, server.id, server.status
                ));
                ctx.wizard.invalidate_resources();
            }
            Err(e) => tracing::warn!(error = %e, "Instance creation failed"),
        }
    });
}

pub async fn create_cancel(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(&state, jar);
    state.sessions.with(&sid, |ctx| {
        ctx.wizard.reset();
        ctx.flash("Instance creation cancelled");
        if ctx.wizard.is_submitting() {
            ctx.flash("A submission is still in progress; its result will be shown when it finishes");
        }
    });
    (jar, redirect_to(&state, "/create")).into_response()
}
