//! The provisioning wizard state machine.
//!
//! One controller is owned by one session. Steps are visited in the fixed
//! order of [`Step::ALL`]; `advance` is gated on the active step's validation
//! and merges its values into the aggregate, `retreat` never validates and
//! never discards input. Editing an earlier step leaves later steps (and
//! their completed marks) untouched.

use crate::api::{ApiError, ResourceProvider, SubmissionGateway};
use crate::config::DEFAULT_MAX_SUBMIT_ATTEMPTS;
use crate::models::{CreateServerRequest, CreatedServer, ProjectScope, ResourceCatalog};
use crate::wizard::{
    AggregatedRequest, DetailsForm, FlavorForm, ImageForm, NetworkForm, Review, Step, StepData,
    StepForm, WizardError,
};

/// Availability of the selectable options the forms need.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState {
    NotLoaded,
    Loaded(ResourceCatalog),
    /// Last fetch failed; the message is shown with a retry button.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct WizardController {
    current: Step,
    forms: [StepForm; 4],
    completed: [bool; 4],
    aggregate: AggregatedRequest,
    resources: ResourceState,
    submitting: bool,
    /// Bumped by every reset; a submission started under an older
    /// generation no longer owns the wizard's state.
    generation: u64,
    submit_generation: u64,
    submit_errors: Vec<String>,
    failed_attempts: u32,
    max_submit_attempts: u32,
}

fn blank_forms() -> [StepForm; 4] {
    [
        StepForm::new(StepData::Flavor(FlavorForm::default())),
        StepForm::new(StepData::Image(ImageForm::default())),
        StepForm::new(StepData::Network(NetworkForm::default())),
        StepForm::new(StepData::Details(DetailsForm::default())),
    ]
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUBMIT_ATTEMPTS)
    }
}

impl WizardController {
    pub fn new(max_submit_attempts: u32) -> Self {
        Self {
            current: Step::first(),
            forms: blank_forms(),
            completed: [false; 4],
            aggregate: AggregatedRequest::default(),
            resources: ResourceState::NotLoaded,
            submitting: false,
            generation: 0,
            submit_generation: 0,
            submit_errors: Vec::new(),
            failed_attempts: 0,
            max_submit_attempts: max_submit_attempts.max(1),
        }
    }

    pub fn current_step(&self) -> Step {
        self.current
    }

    pub fn aggregate(&self) -> &AggregatedRequest {
        &self.aggregate
    }

    /// The form owned by `step`; `None` for the summary.
    pub fn form(&self, step: Step) -> Option<&StepForm> {
        self.forms.get(step.index())
    }

    pub fn is_completed(&self, step: Step) -> bool {
        self.completed.get(step.index()).copied().unwrap_or(false)
    }

    pub fn resources(&self) -> &ResourceState {
        &self.resources
    }

    pub fn catalog(&self) -> Option<&ResourceCatalog> {
        match &self.resources {
            ResourceState::Loaded(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Messages from the last failed submission, cleared by any later action.
    pub fn submit_errors(&self) -> &[String] {
        &self.submit_errors
    }

    pub fn attempts_left(&self) -> u32 {
        self.max_submit_attempts.saturating_sub(self.failed_attempts)
    }

    /// Replace one step's input. The step loses its completed mark until it
    /// validates again; the aggregate and other steps are not touched.
    /// Re-posting the values the step already holds changes nothing.
    pub fn edit(&mut self, data: StepData) {
        let data = data.normalized();
        let idx = data.step().index();
        if self.forms[idx].values() == &data {
            return;
        }
        self.forms[idx].set_values(data);
        self.completed[idx] = false;
        self.failed_attempts = 0;
        self.submit_errors.clear();
    }

    /// Validate the active step, merge it, and move forward.
    /// On the summary this is a no-op.
    pub fn advance(&mut self) -> Result<Step, WizardError> {
        let step = self.current;
        if !step.has_form() {
            return Ok(step);
        }
        let empty = ResourceCatalog::default();
        let catalog = match &self.resources {
            ResourceState::Loaded(c) => c,
            _ if step.needs_resources() => return Err(WizardError::ResourcesUnavailable(step)),
            _ => &empty,
        };
        let idx = step.index();
        if !self.forms[idx].validate(catalog) {
            tracing::debug!(%step, errors = ?self.forms[idx].errors(), "Step validation failed");
            return Err(WizardError::Validation(step));
        }
        self.aggregate.merge(self.forms[idx].values());
        self.completed[idx] = true;
        if let Some(next) = step.next() {
            self.current = next;
        }
        tracing::info!(from = %step, to = %self.current, "Wizard advanced");
        Ok(self.current)
    }

    /// Move back one step without validating. Nothing is discarded.
    pub fn retreat(&mut self) -> Step {
        if let Some(prev) = self.current.previous() {
            tracing::info!(from = %self.current, to = %prev, "Wizard retreated");
            self.current = prev;
            self.failed_attempts = 0;
            self.submit_errors.clear();
        }
        self.current
    }

    /// Jump to `target`. Going back is always allowed; going forward requires
    /// every step before `target` to be completed.
    pub fn go_to(&mut self, target: Step) -> Result<Step, WizardError> {
        if target > self.current {
            let blocked = Step::FORM_STEPS
                .iter()
                .take(target.index())
                .any(|s| !self.is_completed(*s));
            if blocked {
                return Err(WizardError::NavigationBlocked(target));
            }
        }
        if target != self.current {
            tracing::info!(from = %self.current, to = %target, "Wizard navigated");
            self.current = target;
            self.submit_errors.clear();
        }
        Ok(self.current)
    }

    /// Back to the first step with every form and the aggregate cleared.
    /// The fetched resource catalog is kept.
    pub fn reset(&mut self) {
        self.current = Step::first();
        self.forms = blank_forms();
        self.completed = [false; 4];
        self.aggregate = AggregatedRequest::default();
        // A pending submission stays pending; its outcome is dropped.
        self.generation += 1;
        self.submit_errors.clear();
        self.failed_attempts = 0;
    }

    /// Record the outcome of a resource fetch made outside the controller.
    pub fn apply_resources(&mut self, result: Result<ResourceCatalog, ApiError>) {
        self.resources = match result {
            Ok(catalog) => ResourceState::Loaded(catalog),
            Err(e) => {
                tracing::warn!(error = %e, "Resource fetch failed");
                ResourceState::Failed(e.to_string())
            }
        };
    }

    /// Forget the catalog so the next page load fetches it again.
    pub fn invalidate_resources(&mut self) {
        self.resources = ResourceState::NotLoaded;
    }

    pub async fn load_resources<P>(&mut self, provider: &P, scope: &ProjectScope)
    where
        P: ResourceProvider + ?Sized,
    {
        let result = provider.list_resources(scope).await;
        self.apply_resources(result);
    }

    /// First half of a submission: checks the preconditions, marks the wizard
    /// as submitting and hands out the request to send.
    pub fn begin_submit(&mut self) -> Result<CreateServerRequest, WizardError> {
        if self.current != Step::Summary {
            return Err(WizardError::NotOnSummary(self.current));
        }
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if self.failed_attempts >= self.max_submit_attempts {
            return Err(WizardError::RetryLimitReached);
        }
        if let Some(step) = Step::FORM_STEPS.into_iter().find(|s| !self.is_completed(*s)) {
            return Err(WizardError::Unvalidated(step));
        }
        let request = self.aggregate.to_request().map_err(WizardError::Incomplete)?;
        self.submitting = true;
        self.submit_generation = self.generation;
        self.submit_errors.clear();
        Ok(request)
    }

    /// Second half of a submission. Success resets the wizard; failure keeps
    /// everything and records the messages for the summary page. If the
    /// wizard was reset while the call was out, the outcome is returned but
    /// leaves the current input alone.
    pub fn finish_submit(
        &mut self,
        outcome: Result<CreatedServer, ApiError>,
    ) -> Result<CreatedServer, WizardError> {
        let stale = !self.submitting || self.submit_generation != self.generation;
        self.submitting = false;
        if stale {
            tracing::info!(ok = outcome.is_ok(), "Submission finished after the wizard was reset");
            return outcome.map_err(WizardError::Submission);
        }
        match outcome {
            Ok(server) => {
                self.reset();
                Ok(server)
            }
            Err(e) => {
                self.failed_attempts += 1;
                self.submit_errors = e.messages();
                tracing::warn!(error = %e, attempts_left = self.attempts_left(), "Submission failed");
                Err(WizardError::Submission(e))
            }
        }
    }

    /// Send the aggregate through `gateway` exactly once.
    pub async fn submit<G>(
        &mut self,
        gateway: &G,
        scope: &ProjectScope,
    ) -> Result<CreatedServer, WizardError>
    where
        G: SubmissionGateway + ?Sized,
    {
        let request = self.begin_submit()?;
        let outcome = gateway.create_server(scope, &request).await;
        self.finish_submit(outcome)
    }

    /// The review page, available only on the summary step.
    pub fn review(&mut self) -> Option<Review<'_>> {
        if self.current == Step::Summary {
            Some(Review::new(self))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flavor, Image, Keypair, Network, SecurityGroup};
    use crate::wizard::REQUIRED_MESSAGE;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn catalog() -> ResourceCatalog {
        ResourceCatalog {
            flavors: vec![
                Flavor { id: "f1".into(), name: "small".into(), vcpus: 1, ram_mb: 2048, disk_gb: 20 },
                Flavor { id: "f2".into(), name: "large".into(), vcpus: 4, ram_mb: 8192, disk_gb: 80 },
            ],
            images: vec![Image { id: "i1".into(), name: "ubuntu".into(), min_disk_gb: 10, status: "active".into() }],
            networks: vec![Network { id: "n1".into(), name: "private".into(), external: false }],
            keypairs: vec![Keypair { name: "k1".into(), fingerprint: String::new() }],
            security_groups: vec![SecurityGroup { id: "s1".into(), name: "default".into(), description: String::new() }],
        }
    }

    struct FakeGateway {
        fail: bool,
        calls: Mutex<Vec<CreateServerRequest>>,
    }

    #[async_trait]
    impl SubmissionGateway for FakeGateway {
        async fn create_server(
            &self,
            _scope: &ProjectScope,
            request: &CreateServerRequest,
        ) -> Result<CreatedServer, ApiError> {
            self.calls.lock().unwrap().push(request.clone());
            if self.fail {
                Err(ApiError::Rejected { code: "QUOTA".into(), detail: Some("Quota exceeded".into()), errors: vec![] })
            } else {
                Ok(CreatedServer { id: "srv-1".into(), name: request.name.clone(), status: "BUILD".into() })
            }
        }
    }

    fn gateway(fail: bool) -> FakeGateway {
        FakeGateway { fail, calls: Mutex::new(Vec::new()) }
    }

    fn loaded() -> WizardController {
        let mut w = WizardController::new(3);
        w.apply_resources(Ok(catalog()));
        w
    }

    fn flavor(id: &str) -> StepData {
        StepData::Flavor(FlavorForm { flavor_id: id.into() })
    }

    fn image(id: &str) -> StepData {
        StepData::Image(ImageForm { image_id: id.into() })
    }

    fn network() -> StepData {
        StepData::Network(NetworkForm { network_id: "n1".into(), key_name: "k1".into(), security_group: "s1".into() })
    }

    fn details(name: &str) -> StepData {
        StepData::Details(DetailsForm {
            name: name.into(),
            admin_username: "admin".into(),
            admin_password: "Secret123".into(),
        })
    }

    fn at_summary() -> WizardController {
        let mut w = loaded();
        for data in [flavor("f1"), image("i1"), network(), details("vm-01")] {
            w.edit(data);
            w.advance().unwrap();
        }
        assert_eq!(w.current_step(), Step::Summary);
        w
    }

    #[test]
    fn starts_on_first_step_with_empty_aggregate() {
        let w = WizardController::default();
        assert_eq!(w.current_step(), Step::Flavor);
        assert!(w.aggregate().is_empty());
        assert_eq!(w.resources(), &ResourceState::NotLoaded);
    }

    #[test]
    fn aggregate_grows_monotonically() {
        let mut w = loaded();
        let mut seen = 0;
        for data in [flavor("f1"), image("i1"), network(), details("vm-01")] {
            w.edit(data);
            w.advance().unwrap();
            let filled = 8 - w.aggregate().missing_fields().len();
            assert!(filled > seen);
            seen = filled;
        }
        assert!(w.aggregate().missing_fields().is_empty());
    }

    #[test]
    fn retreat_then_advance_reproduces_aggregate() {
        let mut w = loaded();
        w.edit(flavor("f1"));
        w.advance().unwrap();
        w.edit(image("i1"));
        w.advance().unwrap();
        let before = w.aggregate().clone();

        assert_eq!(w.retreat(), Step::Image);
        assert_eq!(w.form(Step::Image).unwrap().values(), &image("i1"));
        w.advance().unwrap();
        assert_eq!(w.aggregate(), &before);
        assert_eq!(w.current_step(), Step::Network);
    }

    #[test]
    fn retreat_on_first_step_stays() {
        let mut w = loaded();
        assert_eq!(w.retreat(), Step::Flavor);
    }

    #[test]
    fn failed_validation_blocks_advance() {
        let mut w = loaded();
        let err = w.advance().unwrap_err();
        assert_eq!(err, WizardError::Validation(Step::Flavor));
        assert_eq!(w.current_step(), Step::Flavor);
        assert_eq!(w.form(Step::Flavor).unwrap().error("flavor_id"), Some(REQUIRED_MESSAGE));
        assert!(w.aggregate().is_empty());
    }

    #[test]
    fn empty_name_blocks_details() {
        let mut w = loaded();
        for data in [flavor("f1"), image("i1"), network()] {
            w.edit(data);
            w.advance().unwrap();
        }
        let before = w.aggregate().clone();
        w.edit(details(""));
        assert_eq!(w.advance(), Err(WizardError::Validation(Step::Details)));
        assert_eq!(w.current_step(), Step::Details);
        assert_eq!(w.form(Step::Details).unwrap().error("name"), Some(REQUIRED_MESSAGE));
        assert_eq!(w.aggregate(), &before);
    }

    #[test]
    fn resource_steps_need_a_catalog() {
        let mut w = WizardController::default();
        w.edit(flavor("f1"));
        assert_eq!(w.advance(), Err(WizardError::ResourcesUnavailable(Step::Flavor)));
        w.apply_resources(Err(ApiError::Transport("connection refused".into())));
        assert!(matches!(w.resources(), ResourceState::Failed(msg) if msg.contains("connection refused")));
        assert_eq!(w.advance(), Err(WizardError::ResourcesUnavailable(Step::Flavor)));
        w.apply_resources(Ok(catalog()));
        assert_eq!(w.advance(), Ok(Step::Image));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut w = at_summary();
        w.reset();
        let once = (w.current_step(), w.aggregate().clone(), w.form(Step::Flavor).cloned(), w.attempts_left());
        w.reset();
        let twice = (w.current_step(), w.aggregate().clone(), w.form(Step::Flavor).cloned(), w.attempts_left());
        assert_eq!(once, twice);
        assert!(Step::FORM_STEPS.iter().all(|s| !w.is_completed(*s)));
        assert_eq!(w.current_step(), Step::Flavor);
        assert!(w.aggregate().is_empty());
        assert_eq!(w.form(Step::Details).unwrap().values(), &StepData::empty(Step::Details).unwrap());
        assert!(w.catalog().is_some());
    }

    #[test]
    fn editing_earlier_step_keeps_later_steps() {
        let mut w = at_summary();
        w.go_to(Step::Flavor).unwrap();
        w.edit(flavor("f2"));
        assert!(!w.is_completed(Step::Flavor));
        assert!(w.is_completed(Step::Details));
        assert_eq!(w.form(Step::Details).unwrap().values(), &details("vm-01"));
        w.advance().unwrap();
        assert_eq!(w.aggregate().flavor_id.as_deref(), Some("f2"));
        assert_eq!(w.go_to(Step::Summary), Ok(Step::Summary));
    }

    #[test]
    fn forward_navigation_requires_completed_steps() {
        let mut w = loaded();
        assert_eq!(w.go_to(Step::Network), Err(WizardError::NavigationBlocked(Step::Network)));
        w.edit(flavor("f1"));
        w.advance().unwrap();
        assert_eq!(w.go_to(Step::Flavor), Ok(Step::Flavor));
        assert_eq!(w.go_to(Step::Image), Ok(Step::Image));
    }

    #[test]
    fn advancing_on_summary_is_noop() {
        let mut w = at_summary();
        let before = w.aggregate().clone();
        assert_eq!(w.advance(), Ok(Step::Summary));
        assert_eq!(w.aggregate(), &before);
    }

    #[tokio::test]
    async fn submit_outside_summary_is_refused() {
        let mut w = loaded();
        w.edit(flavor("f1"));
        w.advance().unwrap();
        let gw = gateway(false);
        let before = format!("{:?}", w);
        let err = w.submit(&gw, &ProjectScope::new("p1")).await.unwrap_err();
        assert_eq!(err, WizardError::NotOnSummary(Step::Image));
        assert!(gw.calls.lock().unwrap().is_empty());
        assert_eq!(format!("{:?}", w), before);
    }

    #[tokio::test]
    async fn successful_submit_resets() {
        let mut w = at_summary();
        let gw = gateway(false);
        let server = w.submit(&gw, &ProjectScope::new("p1")).await.unwrap();
        assert_eq!(server.name, "vm-01");
        assert_eq!(gw.calls.lock().unwrap().len(), 1);
        assert_eq!(w.current_step(), Step::Flavor);
        assert!(w.aggregate().is_empty());
    }

    #[tokio::test]
    async fn failed_submit_preserves_state() {
        let mut w = at_summary();
        let before = w.aggregate().clone();
        let gw = gateway(true);
        let err = w.submit(&gw, &ProjectScope::new("p1")).await.unwrap_err();
        assert!(matches!(err, WizardError::Submission(_)));
        assert_eq!(w.current_step(), Step::Summary);
        assert_eq!(w.aggregate(), &before);
        assert_eq!(w.submit_errors(), &["Quota exceeded".to_string()]);
        assert!(!w.is_submitting());
    }

    #[tokio::test]
    async fn manual_retries_are_bounded() {
        let mut w = at_summary();
        let gw = gateway(true);
        let scope = ProjectScope::new("p1");
        for _ in 0..3 {
            assert!(matches!(w.submit(&gw, &scope).await, Err(WizardError::Submission(_))));
        }
        assert_eq!(w.attempts_left(), 0);
        assert_eq!(w.submit(&gw, &scope).await, Err(WizardError::RetryLimitReached));
        assert_eq!(gw.calls.lock().unwrap().len(), 3);

        w.retreat();
        w.advance().unwrap();
        assert_eq!(w.attempts_left(), 3);
    }

    #[test]
    fn only_one_submission_in_flight() {
        let mut w = at_summary();
        w.begin_submit().unwrap();
        assert!(w.is_submitting());
        assert_eq!(w.begin_submit(), Err(WizardError::SubmissionInFlight));
        w.finish_submit(Err(ApiError::Transport("timeout".into()))).unwrap_err();
        assert!(w.begin_submit().is_ok());
    }

    #[test]
    fn edited_step_must_revalidate_before_submit() {
        let mut w = at_summary();
        w.edit(image("i9"));
        assert_eq!(w.begin_submit(), Err(WizardError::Unvalidated(Step::Image)));
    }

    #[test]
    fn reposting_unchanged_values_keeps_progress() {
        let mut w = at_summary();
        w.retreat();
        w.edit(details("vm-01"));
        assert!(w.is_completed(Step::Details));
        w.retreat();
        assert_eq!(w.go_to(Step::Summary), Ok(Step::Summary));
    }

    #[test]
    fn unchanged_values_do_not_refill_retry_budget() {
        let mut w = at_summary();
        w.begin_submit().unwrap();
        w.finish_submit(Err(ApiError::Transport("timeout".into()))).unwrap_err();
        assert_eq!(w.attempts_left(), 2);
        w.edit(network());
        assert_eq!(w.attempts_left(), 2);
        assert_eq!(w.submit_errors(), &["Request failed: timeout".to_string()]);
    }

    #[test]
    fn cancel_while_submitting_keeps_guard() {
        let mut w = at_summary();
        w.begin_submit().unwrap();
        w.reset();
        assert!(w.is_submitting());

        for data in [flavor("f1"), image("i1"), network(), details("vm-02")] {
            w.edit(data);
            w.advance().unwrap();
        }
        assert_eq!(w.begin_submit(), Err(WizardError::SubmissionInFlight));

        // The first call's late outcome does not touch the new input.
        let late = w.finish_submit(Err(ApiError::Transport("timeout".into())));
        assert!(matches!(late, Err(WizardError::Submission(_))));
        assert!(!w.is_submitting());
        assert_eq!(w.attempts_left(), 3);
        assert!(w.submit_errors().is_empty());
        assert_eq!(w.current_step(), Step::Summary);
        assert_eq!(w.begin_submit().map(|r| r.name), Ok("vm-02".to_string()));
    }

    #[test]
    fn late_success_after_cancel_keeps_new_input() {
        let mut w = at_summary();
        w.begin_submit().unwrap();
        w.reset();
        w.edit(flavor("f2"));
        let created = CreatedServer { id: "srv-1".into(), name: "vm-01".into(), status: "BUILD".into() };
        assert_eq!(w.finish_submit(Ok(created.clone())), Ok(created));
        assert_eq!(w.form(Step::Flavor).unwrap().values(), &flavor("f2"));
    }
}
